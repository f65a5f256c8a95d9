//! Component discovery and relationship inference.
//!
//! A [`ComponentFinder`] binds a scope and a [`ComponentFinderStrategy`] to a
//! [`TypeRepository`]. Running it against a [`Container`] registers the
//! components found in the scope, attributes their supporting types and then
//! resolves relationships across every component the container knows about.
//! Several finders may run against the same container in any order.
//!
//! ```
//! use componentfinder::finder::{ComponentFinder, NameSuffixTypeMatcher, TypeBasedComponentFinderStrategy};
//! use componentfinder::model::Container;
//! use componentfinder::repository::{InMemoryTypeRepository, TypeInfo};
//!
//! let repository = InMemoryTypeRepository::builder()
//!     .with_type(TypeInfo::class("app.AComponent").references("app.BComponent"))
//!     .with_type(TypeInfo::class("app.BComponent"))
//!     .build();
//! let mut container = Container::new("App", "", "Java");
//!
//! let finder = ComponentFinder::new(
//!     &repository,
//!     "app",
//!     TypeBasedComponentFinderStrategy::new(NameSuffixTypeMatcher::new("Component")),
//! )?;
//! let report = finder.find_components(&mut container);
//!
//! assert_eq!(report.components.len(), 2);
//! assert_eq!(container.relationship_count(), 1);
//! # Ok::<(), componentfinder::finder::FinderError>(())
//! ```

mod matcher;
mod resolver;
mod strategy;
mod supporting;

pub use matcher::{
    AnnotationTypeMatcher, ExtendsClassTypeMatcher, FnTypeMatcher, ImplementsInterfaceTypeMatcher,
    NameSuffixTypeMatcher, RegexTypeMatcher, TypeMatcher,
};
pub use resolver::{Dependencies, RelationshipResolver, Resolution, dependencies_of};
pub use strategy::{
    AnnotationComponentFinderStrategy, ComponentFinderStrategy, TypeBasedComponentFinderStrategy,
};
pub use supporting::{
    ComponentPackage, FirstImplementationOfInterface, ReferencedTypes, SupportingTypesContext,
    SupportingTypesStrategy,
};

use crate::model::{ComponentId, Container, ModelError};
use crate::repository::{Capability, RepositoryError, TypeRepository};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FinderError {
    #[error("the {strategy} strategy needs {capability}, which the type repository cannot provide")]
    Misconfigured {
        strategy: &'static str,
        capability: Capability,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Unresolvable(RepositoryError),
    Model(ModelError),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Unresolvable(e) => write!(f, "{}", e),
            SkipReason::Model(e) => write!(f, "{}", e),
        }
    }
}

/// A type that was left out of a run, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedType {
    pub type_name: String,
    pub reason: SkipReason,
}

/// What a single finder run did to the container.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryReport {
    pub scope: String,
    pub strategy: &'static str,
    /// Components matched in this run, including ones registered earlier.
    pub components: Vec<ComponentId>,
    /// Components that did not exist before this run.
    pub created: usize,
    pub code_elements_added: usize,
    pub relationships_added: usize,
    /// Relationships dropped after a supporting type became a component.
    pub relationships_removed: usize,
    pub skipped: Vec<SkippedType>,
}

impl DiscoveryReport {
    pub fn new(scope: &str, strategy: &'static str) -> Self {
        Self {
            scope: scope.to_string(),
            strategy,
            ..Default::default()
        }
    }

    pub(crate) fn skip(&mut self, type_name: String, reason: SkipReason) {
        self.skipped.push(SkippedType { type_name, reason });
    }
}

pub struct ComponentFinder<'a> {
    repository: &'a dyn TypeRepository,
    scope: String,
    strategy: Box<dyn ComponentFinderStrategy>,
}

impl<'a> ComponentFinder<'a> {
    /// Bind a strategy to a scope of `repository`.
    ///
    /// Fails if the repository lacks a capability the strategy, or relationship
    /// resolution, depends on.
    pub fn new(
        repository: &'a dyn TypeRepository,
        scope: impl Into<String>,
        strategy: impl ComponentFinderStrategy + 'static,
    ) -> Result<Self, FinderError> {
        Self::from_boxed(repository, scope, Box::new(strategy))
    }

    pub fn from_boxed(
        repository: &'a dyn TypeRepository,
        scope: impl Into<String>,
        strategy: Box<dyn ComponentFinderStrategy>,
    ) -> Result<Self, FinderError> {
        let mut required = strategy.required_capabilities();
        required.push(Capability::References);

        if let Some(capability) = required.into_iter().find(|c| !repository.supports(*c)) {
            return Err(FinderError::Misconfigured {
                strategy: strategy.name(),
                capability,
            });
        }

        Ok(Self {
            repository,
            scope: scope.into(),
            strategy,
        })
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Discover components in the scope, then resolve relationships between
    /// all components in `container`.
    pub fn find_components(&self, container: &mut Container) -> DiscoveryReport {
        let mut report = DiscoveryReport::new(&self.scope, self.strategy.name());

        self.strategy
            .find_components(container, self.repository, &self.scope, &mut report);
        self.strategy
            .find_dependencies(container, self.repository, &mut report);

        debug!(
            "{} finder over '{}': {} components ({} new), {} relationships added, {} skipped",
            report.strategy,
            report.scope,
            report.components.len(),
            report.created,
            report.relationships_added,
            report.skipped.len()
        );

        report
    }
}
