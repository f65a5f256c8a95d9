pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod finder;
pub mod fs;
pub mod loader;
pub mod model;
pub mod output;
pub mod parser;
pub mod repository;
pub mod style;

pub use api::{ComponentFinderError, DiscoveryOptions, DiscoveryResult, discover};
pub use cli::Cli;
pub use commands::{cmd_discover, cmd_init};
pub use config::Config;
pub use finder::{ComponentFinder, DiscoveryReport, FinderError};
pub use model::Container;
