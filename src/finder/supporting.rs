use crate::model::{CodeElementRole, Component, ComponentId, Container};
use crate::repository::{Capability, TypeRepository, in_scope};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, trace};

/// What a supporting-types strategy may consult while resolving one component.
pub struct SupportingTypesContext<'a> {
    pub repository: &'a dyn TypeRepository,
    pub container: &'a Container,
    pub scope: &'a str,
}

/// Attributes auxiliary implementation types to a discovered component.
pub trait SupportingTypesStrategy {
    fn name(&self) -> &'static str;

    /// Repository capabilities this strategy cannot work without.
    fn required_capabilities(&self) -> &'static [Capability] {
        &[]
    }

    /// Candidate supporting types, in a deterministic order. Types already
    /// attributed to the component may be returned again; they are ignored.
    fn find_supporting_types(
        &self,
        component: &Component,
        ctx: &SupportingTypesContext<'_>,
    ) -> Vec<String>;
}

/// If the primary type is an interface or abstract class, the first concrete
/// type in scope assignable to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstImplementationOfInterface;

impl SupportingTypesStrategy for FirstImplementationOfInterface {
    fn name(&self) -> &'static str {
        "first-implementation"
    }

    fn required_capabilities(&self) -> &'static [Capability] {
        &[Capability::Assignability]
    }

    fn find_supporting_types(
        &self,
        component: &Component,
        ctx: &SupportingTypesContext<'_>,
    ) -> Vec<String> {
        let primary = component.type_name.as_str();
        match ctx.repository.is_interface_or_abstract(primary) {
            Ok(true) => {}
            Ok(false) => return Vec::new(),
            Err(e) => {
                debug!("skipping implementation lookup for {}: {}", primary, e);
                return Vec::new();
            }
        }

        for candidate in ctx.repository.list_types(ctx.scope) {
            if candidate == primary {
                continue;
            }
            let concrete = ctx
                .repository
                .is_interface_or_abstract(&candidate)
                .map(|is_abstract| !is_abstract)
                .unwrap_or(false);
            if concrete
                && ctx
                    .repository
                    .is_assignable_to(&candidate, primary)
                    .unwrap_or(false)
            {
                return vec![candidate];
            }
        }

        Vec::new()
    }
}

/// Every other type in the primary type's package.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentPackage;

impl SupportingTypesStrategy for ComponentPackage {
    fn name(&self) -> &'static str {
        "component-package"
    }

    fn find_supporting_types(
        &self,
        component: &Component,
        ctx: &SupportingTypesContext<'_>,
    ) -> Vec<String> {
        let package = match ctx.repository.type_info(&component.type_name) {
            Ok(info) => info.package.clone(),
            Err(e) => {
                debug!("skipping package lookup for {}: {}", component.type_name, e);
                return Vec::new();
            }
        };

        ctx.repository
            .list_types(&package)
            .into_iter()
            .filter(|name| name != &component.type_name)
            .filter(|name| {
                ctx.repository
                    .type_info(name)
                    .map(|info| info.package == package)
                    .unwrap_or(false)
            })
            .filter(|name| !owned_by_other(ctx.container, name, component.id))
            .collect()
    }
}

/// Transitive closure of the types referenced from the component's code
/// elements, bounded by the scope and by other components.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferencedTypes;

impl SupportingTypesStrategy for ReferencedTypes {
    fn name(&self) -> &'static str {
        "referenced-types"
    }

    fn required_capabilities(&self) -> &'static [Capability] {
        &[Capability::References]
    }

    fn find_supporting_types(
        &self,
        component: &Component,
        ctx: &SupportingTypesContext<'_>,
    ) -> Vec<String> {
        let mut visited: HashSet<String> =
            component.code().iter().map(|c| c.type_name.clone()).collect();
        let mut queue: VecDeque<String> =
            component.code().iter().map(|c| c.type_name.clone()).collect();
        let mut found = Vec::new();

        while let Some(current) = queue.pop_front() {
            let Ok(info) = ctx.repository.type_info(&current) else {
                continue;
            };

            let neighbours: Vec<String> = info
                .supertypes()
                .map(str::to_string)
                .chain(info.references.iter().cloned())
                .collect();

            for next in neighbours {
                if !visited.insert(next.clone()) {
                    continue;
                }
                let Ok(next_info) = ctx.repository.type_info(&next) else {
                    continue;
                };
                if !in_scope(ctx.scope, &next_info.package) {
                    continue;
                }
                if owned_by_other(ctx.container, &next, component.id) {
                    trace!("{} belongs to another component", next);
                    continue;
                }
                found.push(next.clone());
                queue.push_back(next);
            }
        }

        found
    }
}

fn owned_by_other(container: &Container, type_name: &str, component: ComponentId) -> bool {
    container
        .component_owning(type_name)
        .is_some_and(|owner| owner != component)
}

/// Apply `strategies` in order to every component in `components`.
///
/// Each strategy runs over all components before the next one starts, so a
/// later strategy sees every type claimed by an earlier one. Returns the
/// number of code elements added.
pub(crate) fn apply_strategies(
    strategies: &[Box<dyn SupportingTypesStrategy>],
    components: &[ComponentId],
    container: &mut Container,
    repository: &dyn TypeRepository,
    scope: &str,
) -> usize {
    let mut added = 0;

    for strategy in strategies {
        for &id in components {
            let candidates = {
                let ctx = SupportingTypesContext {
                    repository,
                    container: &*container,
                    scope,
                };
                strategy.find_supporting_types(&container[id], &ctx)
            };

            for type_name in candidates {
                if container.add_code_element(id, &type_name, CodeElementRole::Supporting) {
                    debug!(
                        "{} attributed {} to {}",
                        strategy.name(),
                        type_name,
                        container[id].name
                    );
                    added += 1;
                }
            }
        }
    }

    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryTypeRepository, TypeInfo};

    fn repo() -> InMemoryTypeRepository {
        InMemoryTypeRepository::builder()
            .with_type(TypeInfo::class("app.web.MyController").references("app.data.MyRepository"))
            .with_type(TypeInfo::abstract_class("app.data.AbstractRepository").references("app.data.Jdbc"))
            .with_type(TypeInfo::interface("app.data.MyRepository"))
            .with_type(
                TypeInfo::class("app.data.MyRepositoryImpl")
                    .extends("app.data.AbstractRepository")
                    .implements("app.data.MyRepository")
                    .references("app.data.MyRowMapper")
                    .references("java.util.List"),
            )
            .with_type(TypeInfo::class("app.data.MyRowMapper").references("app.data.MyRepositoryImpl"))
            .with_type(TypeInfo::class("app.data.Jdbc"))
            .with_type(TypeInfo::class("app.data.Unrelated"))
            .with_type(TypeInfo::class("lib.Outside"))
            .build()
    }

    fn setup() -> (Container, ComponentId, ComponentId) {
        let mut container = Container::new("App", "", "");
        let controller = container
            .add_component("MyController", "app.web.MyController", "", "")
            .unwrap();
        let repository = container
            .add_component("MyRepository", "app.data.MyRepository", "", "")
            .unwrap();
        (container, controller, repository)
    }

    fn find(
        strategy: &dyn SupportingTypesStrategy,
        repo: &InMemoryTypeRepository,
        container: &Container,
        id: ComponentId,
    ) -> Vec<String> {
        let ctx = SupportingTypesContext {
            repository: repo,
            container,
            scope: "app",
        };
        strategy.find_supporting_types(&container[id], &ctx)
    }

    #[test]
    fn test_first_implementation_of_interface() {
        let repo = repo();
        let (container, controller, repository) = setup();

        assert_eq!(
            find(&FirstImplementationOfInterface, &repo, &container, repository),
            vec!["app.data.MyRepositoryImpl"]
        );
        assert!(find(&FirstImplementationOfInterface, &repo, &container, controller).is_empty());
    }

    #[test]
    fn test_component_package_excludes_primary_and_other_packages() {
        let repo = repo();
        let (container, _, repository) = setup();

        let found = find(&ComponentPackage, &repo, &container, repository);
        assert_eq!(
            found,
            vec![
                "app.data.AbstractRepository",
                "app.data.MyRepositoryImpl",
                "app.data.MyRowMapper",
                "app.data.Jdbc",
                "app.data.Unrelated",
            ]
        );
    }

    #[test]
    fn test_referenced_types_stops_at_other_components() {
        let repo = repo();
        let (container, controller, _) = setup();

        assert!(find(&ReferencedTypes, &repo, &container, controller).is_empty());
    }

    #[test]
    fn test_first_implementation_then_referenced_types_terminates_on_cycles() {
        let repo = repo();
        let (mut container, controller, repository) = setup();
        let strategies: Vec<Box<dyn SupportingTypesStrategy>> =
            vec![Box::new(FirstImplementationOfInterface), Box::new(ReferencedTypes)];

        let added = apply_strategies(
            &strategies,
            &[controller, repository],
            &mut container,
            &repo,
            "app",
        );

        let types: Vec<_> = container[repository].supporting_types().collect();
        assert_eq!(
            types,
            vec![
                "app.data.MyRepositoryImpl",
                "app.data.AbstractRepository",
                "app.data.MyRowMapper",
                "app.data.Jdbc",
            ]
        );
        assert_eq!(added, 4);
        assert_eq!(container[controller].code().len(), 1);
    }

    #[test]
    fn test_union_collapses_types_found_by_several_strategies() {
        let repo = repo();
        let (mut container, _, repository) = setup();
        let strategies: Vec<Box<dyn SupportingTypesStrategy>> = vec![
            Box::new(FirstImplementationOfInterface),
            Box::new(ComponentPackage),
            Box::new(ReferencedTypes),
        ];

        apply_strategies(&strategies, &[repository], &mut container, &repo, "app");

        let code = container[repository].code();
        assert_eq!(code.len(), 6);
        let impls = code
            .iter()
            .filter(|c| c.type_name == "app.data.MyRepositoryImpl")
            .count();
        assert_eq!(impls, 1);
    }
}
