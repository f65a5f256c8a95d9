mod discover;
mod init;

pub use discover::cmd_discover;
pub use init::cmd_init;

use crate::config::Config;
use crate::parser::ParserRegistry;
use crate::style;
use std::path::{Path, PathBuf};

/// Resolved path, configuration and parsers shared by the commands.
pub struct CommandContext {
    pub path: PathBuf,
    pub config: Config,
    pub registry: ParserRegistry,
}

impl CommandContext {
    /// Returns Err(exit_code) after reporting the problem.
    pub fn new(path: &Path, lang: Option<&[String]>) -> Result<Self, i32> {
        let resolved_path = match path.canonicalize() {
            Ok(p) => p,
            Err(_) => {
                style::error(&format!("Could not resolve path: {}", style::path(path)));
                return Err(1);
            }
        };

        let config = match Config::load(&resolved_path) {
            Ok(config) => config,
            Err(e) => {
                style::error(&e.to_string());
                style::hint("Run `componentfinder init` to see the expected format");
                return Err(1);
            }
        };

        let registry = match lang {
            Some(langs) => ParserRegistry::with_languages(langs),
            None => ParserRegistry::new(),
        };

        Ok(Self {
            path: resolved_path,
            config,
            registry,
        })
    }
}
