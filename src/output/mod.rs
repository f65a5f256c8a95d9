mod json;
mod markdown;

pub use json::JsonOutput;
pub use markdown::MarkdownOutput;

use crate::api::DiscoveryResult;
use std::io::Write;
use std::path::Path;

pub trait OutputFormatter {
    fn format<W: Write>(&self, result: &DiscoveryResult, writer: &mut W) -> std::io::Result<()>;
}

/// Display `path` relative to the project root when it lies inside it.
pub fn relative_path(path: &Path, project_root: &Path) -> String {
    path.strip_prefix(project_root)
        .unwrap_or(path)
        .display()
        .to_string()
}
