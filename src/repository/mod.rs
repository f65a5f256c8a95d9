//! The type introspection boundary the finder engine consumes.
//!
//! A [`TypeRepository`] answers structural questions about the types of a
//! codebase: which types live in a scope, what they extend, what they
//! reference and which annotations they carry. The engine never inspects
//! source code itself.

mod memory;
mod types;

pub use memory::{InMemoryTypeRepository, InMemoryTypeRepositoryBuilder};
pub use types::{Annotation, TypeInfo, TypeKind};

use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("type not found: {0}")]
    TypeNotFound(String),
    #[error("failed to introspect {type_name}: {reason}")]
    Introspection { type_name: String, reason: String },
}

/// Optional questions a repository may be unable to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Reading annotations/markers from types.
    Markers,
    /// Listing the types a type refers to through its members.
    References,
    /// Deciding whether one type is assignable to another.
    Assignability,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Markers => write!(f, "markers"),
            Capability::References => write!(f, "type references"),
            Capability::Assignability => write!(f, "assignability"),
        }
    }
}

/// A discovery marker consulted through [`TypeRepository::has_marker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// The `@Component` annotation.
    Component,
    /// Any other annotation, simple or fully-qualified.
    Annotation(String),
}

pub const COMPONENT_ANNOTATION: &str = "com.structurizr.annotation.Component";

impl Marker {
    pub fn annotation_name(&self) -> &str {
        match self {
            Marker::Component => COMPONENT_ANNOTATION,
            Marker::Annotation(name) => name,
        }
    }

    /// Whether an annotation as recorded on a type is this marker.
    ///
    /// Unresolved annotations are recorded by simple name, so they match on
    /// the last segment of a qualified marker.
    pub fn matches(&self, annotation: &str) -> bool {
        let wanted = self.annotation_name();
        if annotation == wanted {
            return true;
        }
        let simple = crate::model::simple_name(wanted);
        if wanted.contains('.') {
            !annotation.contains('.') && annotation == simple
        } else {
            crate::model::simple_name(annotation) == wanted
        }
    }
}

/// Whether a type in `package` falls inside `scope`.
///
/// A scope is a package prefix; the empty scope contains everything.
pub fn in_scope(scope: &str, package: &str) -> bool {
    scope.is_empty()
        || package == scope
        || (package.starts_with(scope) && package[scope.len()..].starts_with('.'))
}

pub trait TypeRepository {
    /// Types within `scope`, in a stable enumeration order.
    fn list_types(&self, scope: &str) -> Vec<String>;

    fn type_info(&self, name: &str) -> Result<&TypeInfo, RepositoryError>;

    fn supports(&self, _capability: Capability) -> bool {
        true
    }

    fn contains(&self, name: &str) -> bool {
        self.type_info(name).is_ok()
    }

    /// Directly extended class and implemented interfaces.
    fn supertypes(&self, name: &str) -> Result<BTreeSet<String>, RepositoryError> {
        Ok(self.type_info(name)?.supertypes().map(str::to_string).collect())
    }

    /// Types named by fields, constructor/method parameters and return types.
    fn direct_referenced_types(&self, name: &str) -> Result<BTreeSet<String>, RepositoryError> {
        Ok(self.type_info(name)?.references.iter().cloned().collect())
    }

    fn has_marker(&self, name: &str, marker: &Marker) -> Result<bool, RepositoryError> {
        Ok(self.type_info(name)?.annotation(marker).is_some())
    }

    fn is_interface_or_abstract(&self, name: &str) -> Result<bool, RepositoryError> {
        Ok(self.type_info(name)?.kind.is_abstract())
    }

    /// Whether `name` is `target` or has it among its transitive supertypes.
    fn is_assignable_to(&self, name: &str, target: &str) -> Result<bool, RepositoryError> {
        if name == target {
            return Ok(true);
        }

        let mut visited = HashSet::new();
        let mut stack: Vec<String> = self.supertypes(name)?.into_iter().collect();
        while let Some(current) = stack.pop() {
            if current == target {
                return Ok(true);
            }
            if !visited.insert(current.clone()) {
                continue;
            }
            // Supertypes outside the repository end the walk on that branch.
            if let Ok(parents) = self.supertypes(&current) {
                stack.extend(parents);
            }
        }

        Ok(false)
    }
}
