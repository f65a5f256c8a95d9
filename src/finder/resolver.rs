use super::{SkipReason, SkippedType};
use crate::model::{ComponentId, Container, DEFAULT_RELATIONSHIP_DESCRIPTION};
use crate::repository::{RepositoryError, TypeRepository};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Outcome of one resolution pass.
#[derive(Debug, Default, Clone)]
pub struct Resolution {
    pub added: usize,
    /// Relationships dropped because the code element behind them moved to
    /// another component.
    pub removed: usize,
    pub skipped: Vec<SkippedType>,
}

/// Turns type references between code elements into relationships between
/// the components that own them.
///
/// A pass always considers every component in the container, not only the
/// ones found by the finder that triggered it. Components discovered by
/// separate finders are therefore connected as soon as both exist, whichever
/// finder ran first.
///
/// A referenced type links to whichever component owns it. A supertype only
/// links to a component it is the primary type of: two components sharing an
/// interface that one of them claimed as supporting code are not connected.
#[derive(Debug, Clone)]
pub struct RelationshipResolver {
    description: String,
}

impl Default for RelationshipResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationshipResolver {
    pub fn new() -> Self {
        Self {
            description: DEFAULT_RELATIONSHIP_DESCRIPTION.to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn resolve(&self, container: &mut Container, repository: &dyn TypeRepository) -> Resolution {
        let mut resolution = Resolution::default();
        let mut edges: BTreeSet<(ComponentId, ComponentId)> = BTreeSet::new();

        for component in container.components() {
            for element in component.code() {
                let dependencies = match dependencies_of(repository, &element.type_name) {
                    Ok(deps) => deps,
                    Err(e) => {
                        debug!("no dependencies for {}: {}", element.type_name, e);
                        resolution.skipped.push(SkippedType {
                            type_name: element.type_name.clone(),
                            reason: SkipReason::Unresolvable(e),
                        });
                        continue;
                    }
                };

                let referenced = dependencies
                    .references
                    .iter()
                    .filter_map(|t| container.component_owning(t));
                let inherited = dependencies
                    .supertypes
                    .iter()
                    .filter_map(|t| container.get_component_of_type(t).map(|d| d.id));

                for destination in referenced.chain(inherited) {
                    if destination != component.id {
                        edges.insert((component.id, destination));
                    }
                }
            }
        }

        // A promoted type moves both the edges out of its old owner and the
        // edges other components had into it.
        if !container.take_detached().is_empty() {
            let sources: Vec<ComponentId> = container.components().iter().map(|c| c.id).collect();
            for source in sources {
                let removed = container
                    .retain_relationships(source, |destination| edges.contains(&(source, destination)));
                if removed > 0 {
                    debug!("dropped {} stale relationships of {}", removed, container[source].name);
                    resolution.removed += removed;
                }
            }
        }

        for (source, destination) in edges {
            if container.add_relationship(source, destination, &self.description) {
                debug!(
                    "{} -> {}",
                    container[source].name, container[destination].name
                );
                resolution.added += 1;
            }
        }

        resolution
    }
}

/// What a type depends on, directly or through its ancestors.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Dependencies {
    /// Field, parameter and return types of the type and of every ancestor.
    pub references: BTreeSet<String>,
    /// Every ancestor, direct or transitive.
    pub supertypes: BTreeSet<String>,
}

/// Collects the dependencies of `type_name`.
///
/// Fails only when `type_name` itself cannot be introspected; ancestors that
/// cannot be loaded end the walk on that branch.
pub fn dependencies_of(
    repository: &dyn TypeRepository,
    type_name: &str,
) -> Result<Dependencies, RepositoryError> {
    let mut dependencies = Dependencies {
        references: repository.direct_referenced_types(type_name)?,
        supertypes: BTreeSet::new(),
    };
    let mut stack: Vec<String> = repository.supertypes(type_name)?.into_iter().collect();
    let mut visited: HashSet<String> = HashSet::from([type_name.to_string()]);

    while let Some(ancestor) = stack.pop() {
        if !visited.insert(ancestor.clone()) {
            continue;
        }
        dependencies.supertypes.insert(ancestor.clone());

        match repository.direct_referenced_types(&ancestor) {
            Ok(refs) => dependencies.references.extend(refs),
            Err(_) => continue,
        }
        if let Ok(parents) = repository.supertypes(&ancestor) {
            stack.extend(parents);
        }
    }

    Ok(dependencies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CodeElementRole;
    use crate::repository::{InMemoryTypeRepository, TypeInfo};

    #[test]
    fn test_dependencies_include_inherited_references() {
        let repo = InMemoryTypeRepository::builder()
            .with_type(TypeInfo::abstract_class("p.Base").references("p.Logger").implements("p.Feature"))
            .with_type(TypeInfo::class("p.Child").extends("p.Base"))
            .with_type(TypeInfo::interface("p.Feature").references("p.Event"))
            .build();

        let deps = dependencies_of(&repo, "p.Child").unwrap();
        assert_eq!(
            deps.references.into_iter().collect::<Vec<_>>(),
            vec!["p.Event", "p.Logger"]
        );
        assert_eq!(
            deps.supertypes.into_iter().collect::<Vec<_>>(),
            vec!["p.Base", "p.Feature"]
        );
    }

    #[test]
    fn test_dependencies_survive_missing_and_cyclic_ancestors() {
        let repo = InMemoryTypeRepository::builder()
            .with_type(TypeInfo::class("p.A").extends("p.B").implements("ext.Missing"))
            .with_type(TypeInfo::class("p.B").extends("p.A").references("p.C"))
            .build();

        let deps = dependencies_of(&repo, "p.A").unwrap();
        assert!(deps.references.contains("p.C"));
        assert!(deps.supertypes.contains("ext.Missing"));
        assert!(!deps.supertypes.contains("p.A"));
        assert!(dependencies_of(&repo, "p.Nope").is_err());
    }

    #[test]
    fn test_resolve_collapses_edges_and_skips_unresolvable_elements() {
        let repo = InMemoryTypeRepository::builder()
            .with_type(TypeInfo::class("p.AComponent").references("p.BComponent"))
            .with_type(TypeInfo::class("p.AHelper").references("p.BComponent").references("p.BHelper"))
            .with_type(TypeInfo::class("p.BComponent").references("p.AComponent"))
            .with_type(TypeInfo::class("p.BHelper"))
            .build();
        let mut container = Container::new("App", "", "");
        let a = container.add_component("AComponent", "p.AComponent", "", "").unwrap();
        let b = container.add_component("BComponent", "p.BComponent", "", "").unwrap();
        container.add_code_element(a, "p.AHelper", CodeElementRole::Supporting);
        container.add_code_element(b, "p.BHelper", CodeElementRole::Supporting);
        container.add_code_element(b, "p.Ghost", CodeElementRole::Supporting);

        let resolver = RelationshipResolver::new();
        let first = resolver.resolve(&mut container, &repo);
        assert_eq!(first.added, 2);
        assert_eq!(first.skipped.len(), 1);
        assert_eq!(first.skipped[0].type_name, "p.Ghost");

        let second = resolver.resolve(&mut container, &repo);
        assert_eq!(second.added, 0);
        assert_eq!(container[a].relationships().len(), 1);
        assert_eq!(container[b].relationships().len(), 1);
        assert_eq!(container[a].relationships()[0].description, "Uses");
    }

    #[test]
    fn test_promotion_moves_edges_on_both_sides() {
        let repo = InMemoryTypeRepository::builder()
            .with_type(TypeInfo::class("p.Orders"))
            .with_type(TypeInfo::class("p.Ledger").references("p.Audit"))
            .with_type(TypeInfo::class("p.Audit"))
            .with_type(TypeInfo::class("p.Reports").references("p.Ledger"))
            .build();
        let mut container = Container::new("App", "", "");
        let orders = container.add_component("Orders", "p.Orders", "", "").unwrap();
        let audit = container.add_component("Audit", "p.Audit", "", "").unwrap();
        let reports = container.add_component("Reports", "p.Reports", "", "").unwrap();
        container.add_code_element(orders, "p.Ledger", CodeElementRole::Supporting);

        let resolver = RelationshipResolver::new();
        resolver.resolve(&mut container, &repo);
        assert!(container[orders].uses(audit));
        assert!(container[reports].uses(orders));

        let ledger = container.add_component("Ledger", "p.Ledger", "", "").unwrap();
        let resolution = resolver.resolve(&mut container, &repo);

        assert_eq!(resolution.removed, 2);
        assert_eq!(resolution.added, 2);
        assert!(container[orders].relationships().is_empty());
        assert!(container[ledger].uses(audit));
        assert!(container[reports].uses(ledger));
        assert!(!container[reports].uses(orders));
    }
}
