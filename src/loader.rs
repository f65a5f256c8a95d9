//! Loading a source tree into a type repository.
//!
//! Files are discovered with `.gitignore` rules applied, parsed in parallel,
//! and resolved together so that names can refer across files.

use crate::fs::{FileSystem, default_fs};
use crate::parser::{ParseError, ParserRegistry, SourceFile, build_repository};
use crate::repository::InMemoryTypeRepository;
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A file that could not be read or parsed.
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: ParseError,
}

#[derive(Debug)]
pub struct LoadedSources {
    pub repository: InMemoryTypeRepository,
    /// Number of files parsed successfully.
    pub files: usize,
    pub failures: Vec<LoadFailure>,
}

/// Source files under `path` that some registered parser understands, in
/// path order.
pub fn collect_source_files(path: &Path, registry: &ParserRegistry) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(path).hidden(true).git_ignore(true).build();

    let mut files: Vec<PathBuf> = walker
        .flatten()
        .map(|entry| entry.into_path())
        .filter(|p| p.is_file() && registry.find_parser(p).is_some())
        .collect();
    files.sort();
    files
}

pub fn load_sources(
    paths: &[PathBuf],
    registry: &ParserRegistry,
    fs: &dyn FileSystem,
) -> LoadedSources {
    let results: Vec<Result<SourceFile, LoadFailure>> = paths
        .par_iter()
        .map(|path| parse_one(path, registry, fs))
        .collect();

    let mut parsed = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(file) => parsed.push(file),
            Err(failure) => {
                warn!("Skipping {}: {}", failure.path.display(), failure.error);
                failures.push(failure);
            }
        }
    }

    let repository = build_repository(&parsed);
    debug!(
        "loaded {} types from {} files ({} failed)",
        repository.len(),
        parsed.len(),
        failures.len()
    );

    LoadedSources {
        repository,
        files: parsed.len(),
        failures,
    }
}

/// Discover and load every supported file under `path`.
pub fn load_tree(path: &Path, registry: &ParserRegistry) -> LoadedSources {
    let paths = collect_source_files(path, registry);
    load_sources(&paths, registry, default_fs())
}

fn parse_one(
    path: &Path,
    registry: &ParserRegistry,
    fs: &dyn FileSystem,
) -> Result<SourceFile, LoadFailure> {
    let fail = |error: ParseError| LoadFailure {
        path: path.to_path_buf(),
        error,
    };

    let parser = registry
        .find_parser(path)
        .ok_or_else(|| fail(ParseError::UnsupportedLanguage(path.display().to_string())))?;
    let source = fs.read_to_string(path).map_err(|e| fail(e.into()))?;
    parser.parse_file(path, &source).map_err(fail)
}
