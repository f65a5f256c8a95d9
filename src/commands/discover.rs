use crate::api::{DiscoveryResult, discover_in};
use crate::cli::{DiscoverArgs, OutputFormat};
use crate::fs::{FileSystem, default_fs};
use crate::output::{JsonOutput, MarkdownOutput, OutputFormatter, relative_path};
use crate::style;
use std::io::{self, Write};

use super::CommandContext;

pub fn cmd_discover(args: DiscoverArgs) -> i32 {
    let ctx = match CommandContext::new(&args.path, args.lang.as_deref()) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    let finders = ctx.config.effective_finders();
    let result = match discover_in(&ctx.path, &ctx.config, &ctx.registry, &finders) {
        Ok(result) => result,
        Err(e) => {
            style::error(&e.to_string());
            return 1;
        }
    };

    for failure in &result.failures {
        style::warning(&format!(
            "Skipped {}: {}",
            relative_path(&failure.path, &result.root),
            failure.error
        ));
    }

    write_report(&result, &args, default_fs())
}

fn write_report(result: &DiscoveryResult, args: &DiscoverArgs, fs: &dyn FileSystem) -> i32 {
    let mut buffer = Vec::new();
    let format_result = match args.format {
        OutputFormat::Markdown => MarkdownOutput::new(args.show_skipped).format(result, &mut buffer),
        OutputFormat::Json => JsonOutput::new().format(result, &mut buffer),
    };

    if let Err(e) = format_result {
        style::error(&format!("Failed to format output: {}", e));
        return 1;
    }

    let report = String::from_utf8_lossy(&buffer);

    match &args.output {
        Some(output_path) => {
            if let Err(e) = fs.write(output_path, &report) {
                style::error(&format!("Could not write {}: {}", style::path(output_path), e));
                return 1;
            }
            style::success(&format!("Wrote report to {}", style::path(output_path)));
            style::section("Summary");
            eprintln!("{}", style::metric("files", result.files));
            eprintln!("{}", style::metric("types", result.types));
            eprintln!("{}", style::metric("components", result.container.components().len()));
            eprintln!(
                "{}",
                style::metric("relationships", result.container.relationship_count())
            );
        }
        None => {
            let mut stdout = io::stdout();
            let write_result = if args.format == OutputFormat::Markdown {
                style::render_markdown(&report, &mut stdout)
            } else {
                write!(stdout, "{}", report)
            };
            if let Err(e) = write_result {
                style::error(&format!("Failed to write output: {}", e));
                return 1;
            }
        }
    }

    0
}
