use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "componentfinder")]
#[command(about = "Discover the components of a Java codebase and how they depend on each other")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to scan when no subcommand is given
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Log engine decisions (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Find components and their relationships (default behavior)
    Discover(DiscoverArgs),

    /// Generate a starter .componentfinder.toml configuration file
    Init(InitArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DiscoverArgs {
    /// Root of the source tree (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "markdown")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Languages to load (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub lang: Option<Vec<String>>,

    /// List types that were skipped and why
    #[arg(long)]
    pub show_skipped: bool,
}

impl Default for DiscoverArgs {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            format: OutputFormat::Markdown,
            output: None,
            lang: None,
            show_skipped: false,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Directory to create the config in
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Markdown,
    Json,
}
