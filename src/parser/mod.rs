mod common;
mod java;
mod resolve;

use crate::repository::{Annotation, TypeKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use common::{child_of_kind, node_text};
pub use java::JavaParser;
pub use resolve::{NameResolver, build_repository};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse: {0}")]
    Parse(String),
    #[error("Unsupported language for file: {0}")]
    UnsupportedLanguage(String),
}

/// A single-type or on-demand import, as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub name: String,
    pub wildcard: bool,
    pub is_static: bool,
}

/// A type declaration with names exactly as they appear in source.
#[derive(Debug, Clone)]
pub struct DeclaredType {
    /// Qualified name; nested types are `package.Outer.Inner`.
    pub name: String,
    pub kind: TypeKind,
    pub line: usize,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub references: Vec<String>,
    pub annotations: Vec<Annotation>,
}

/// Everything extracted from one source file, before name resolution.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub package: String,
    pub imports: Vec<Import>,
    pub types: Vec<DeclaredType>,
}

pub trait LanguageParser: Send + Sync {
    fn extensions(&self) -> &[&str];
    fn parse_file(&self, path: &Path, source: &str) -> Result<SourceFile, ParseError>;
}

pub struct ParserRegistry {
    parsers: Vec<Box<dyn LanguageParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self {
            parsers: vec![Box::new(JavaParser::new())],
        }
    }

    pub fn with_languages(languages: &[String]) -> Self {
        let mut parsers: Vec<Box<dyn LanguageParser>> = Vec::new();

        for lang in languages {
            match lang.to_lowercase().as_str() {
                "java" => parsers.push(Box::new(JavaParser::new())),
                _ => {}
            }
        }

        if parsers.is_empty() {
            return Self::new();
        }

        Self { parsers }
    }

    pub fn find_parser(&self, path: &Path) -> Option<&dyn LanguageParser> {
        let ext = path.extension()?.to_str()?;
        self.parsers
            .iter()
            .find(|p| p.extensions().contains(&ext))
            .map(|p| p.as_ref())
    }

    pub fn supported_extensions(&self) -> Vec<&str> {
        self.parsers
            .iter()
            .flat_map(|p| p.extensions().iter().copied())
            .collect()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
