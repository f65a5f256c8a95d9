//! Library entry point for running discovery over a source tree.
//!
//! The CLI commands print and return exit codes; these functions return
//! `Result`s for callers embedding the engine.
//!
//! # Example
//!
//! ```no_run
//! use componentfinder::{DiscoveryOptions, discover};
//! use std::path::Path;
//!
//! let result = discover(Path::new("."), DiscoveryOptions::default())?;
//! for component in result.container.components() {
//!     println!("{} ({} code elements)", component.name, component.code().len());
//! }
//! # Ok::<(), componentfinder::ComponentFinderError>(())
//! ```

use crate::config::{Config, ConfigError, FinderConfig};
use crate::finder::{ComponentFinder, DiscoveryReport, FinderError};
use crate::loader::{LoadFailure, load_tree};
use crate::model::Container;
use crate::parser::ParserRegistry;
use crate::repository::TypeRepository;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComponentFinderError {
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Finder error: {0}")]
    Finder(#[from] FinderError),
}

#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Languages to load (empty means all supported languages).
    pub languages: Vec<String>,

    /// Finder runs to use instead of the ones in `.componentfinder.toml`.
    pub finders: Option<Vec<FinderConfig>>,
}

#[derive(Debug)]
pub struct DiscoveryResult {
    pub root: PathBuf,
    pub container: Container,
    /// One report per finder run, in run order.
    pub reports: Vec<DiscoveryReport>,
    pub files: usize,
    pub types: usize,
    pub failures: Vec<LoadFailure>,
}

/// Load the sources under `path`, run the configured finders in order against
/// one container, and return the populated container.
pub fn discover(
    path: &Path,
    options: DiscoveryOptions,
) -> Result<DiscoveryResult, ComponentFinderError> {
    let root = path
        .canonicalize()
        .map_err(|_| ComponentFinderError::PathNotFound(path.to_path_buf()))?;

    let config = Config::load(&root)?;

    let registry = if options.languages.is_empty() {
        ParserRegistry::new()
    } else {
        ParserRegistry::with_languages(&options.languages)
    };

    let finders = options
        .finders
        .unwrap_or_else(|| config.effective_finders());

    discover_in(&root, &config, &registry, &finders)
}

/// Discovery over an already resolved root with explicit configuration.
pub fn discover_in(
    root: &Path,
    config: &Config,
    registry: &ParserRegistry,
    finders: &[FinderConfig],
) -> Result<DiscoveryResult, ComponentFinderError> {
    let loaded = load_tree(root, registry);

    let name = config.container.name.clone().unwrap_or_else(|| {
        root.file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("application")
            .to_string()
    });
    let mut container = Container::new(
        name,
        config.container.description.as_str(),
        config.container.technology.as_str(),
    );

    let reports = run_finders(&loaded.repository, &mut container, finders)?;

    Ok(DiscoveryResult {
        root: root.to_path_buf(),
        container,
        reports,
        files: loaded.files,
        types: loaded.repository.len(),
        failures: loaded.failures,
    })
}

/// Run finder configurations in order against `container`.
///
/// Every strategy is built and validated before any of them runs, so a
/// misconfigured entry leaves the container untouched.
pub fn run_finders(
    repository: &dyn TypeRepository,
    container: &mut Container,
    finders: &[FinderConfig],
) -> Result<Vec<DiscoveryReport>, ComponentFinderError> {
    let mut bound = Vec::with_capacity(finders.len());
    for finder in finders {
        let strategy = finder.build_strategy()?;
        bound.push(ComponentFinder::from_boxed(
            repository,
            finder.scope.as_str(),
            strategy,
        )?);
    }

    Ok(bound
        .iter()
        .map(|finder| finder.find_components(container))
        .collect())
}
