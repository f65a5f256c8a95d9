use super::matcher::TypeMatcher;
use super::resolver::RelationshipResolver;
use super::supporting::{FirstImplementationOfInterface, SupportingTypesStrategy, apply_strategies};
use super::{DiscoveryReport, SkipReason, SkippedType};
use crate::model::{ComponentId, Container};
use crate::repository::{Capability, Marker, TypeRepository};
use tracing::debug;

/// One way of deciding which types in a scope are components.
pub trait ComponentFinderStrategy {
    fn name(&self) -> &'static str;

    /// Repository capabilities needed by this strategy and its supporting-types
    /// strategies.
    fn required_capabilities(&self) -> Vec<Capability>;

    /// Register the components found in `scope` and their code elements.
    fn find_components(
        &self,
        container: &mut Container,
        repository: &dyn TypeRepository,
        scope: &str,
        report: &mut DiscoveryReport,
    );

    /// Add relationships between every component now known to the container.
    fn find_dependencies(
        &self,
        container: &mut Container,
        repository: &dyn TypeRepository,
        report: &mut DiscoveryReport,
    ) {
        let resolution = RelationshipResolver::new().resolve(container, repository);
        report.relationships_added += resolution.added;
        report.relationships_removed += resolution.removed;
        report.skipped.extend(resolution.skipped);
    }
}

/// Components are the types accepted by any of a list of matchers.
///
/// No supporting types are attributed unless strategies are added.
pub struct TypeBasedComponentFinderStrategy {
    matchers: Vec<Box<dyn TypeMatcher>>,
    supporting: Vec<Box<dyn SupportingTypesStrategy>>,
}

impl TypeBasedComponentFinderStrategy {
    pub fn new(matcher: impl TypeMatcher + 'static) -> Self {
        Self {
            matchers: vec![Box::new(matcher)],
            supporting: Vec::new(),
        }
    }

    pub fn from_matchers(matchers: Vec<Box<dyn TypeMatcher>>) -> Self {
        Self {
            matchers,
            supporting: Vec::new(),
        }
    }

    pub fn with_matcher(mut self, matcher: impl TypeMatcher + 'static) -> Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    pub fn with_supporting_types(mut self, strategy: impl SupportingTypesStrategy + 'static) -> Self {
        self.supporting.push(Box::new(strategy));
        self
    }

    pub fn with_supporting_strategies(mut self, strategies: Vec<Box<dyn SupportingTypesStrategy>>) -> Self {
        self.supporting.extend(strategies);
        self
    }
}

impl ComponentFinderStrategy for TypeBasedComponentFinderStrategy {
    fn name(&self) -> &'static str {
        "type"
    }

    fn required_capabilities(&self) -> Vec<Capability> {
        capabilities_of(&self.supporting)
    }

    fn find_components(
        &self,
        container: &mut Container,
        repository: &dyn TypeRepository,
        scope: &str,
        report: &mut DiscoveryReport,
    ) {
        let mut found = Vec::new();

        for type_name in repository.list_types(scope) {
            let info = match repository.type_info(&type_name) {
                Ok(info) => info,
                Err(e) => {
                    report.skip(type_name, SkipReason::Unresolvable(e));
                    continue;
                }
            };

            let Some(matcher) = self.matchers.iter().find(|m| m.matches(info, repository)) else {
                continue;
            };

            let registered = register(
                container,
                report,
                info.simple_name(),
                &type_name,
                matcher.description(),
                matcher.technology(),
            );
            found.extend(registered);
        }

        report.code_elements_added +=
            apply_strategies(&self.supporting, &found, container, repository, scope);
        report.components.extend(found);
    }
}

/// Components are the types carrying a marker annotation, `@Component` by
/// default. The marker's `description` and `technology` attributes are copied
/// onto the component.
///
/// Without explicitly configured strategies, supporting types are found with
/// [`FirstImplementationOfInterface`].
pub struct AnnotationComponentFinderStrategy {
    marker: Marker,
    supporting: Vec<Box<dyn SupportingTypesStrategy>>,
    default_supporting: Vec<Box<dyn SupportingTypesStrategy>>,
}

impl Default for AnnotationComponentFinderStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationComponentFinderStrategy {
    pub fn new() -> Self {
        Self::with_marker(Marker::Component)
    }

    pub fn with_marker(marker: Marker) -> Self {
        Self {
            marker,
            supporting: Vec::new(),
            default_supporting: vec![Box::new(FirstImplementationOfInterface)],
        }
    }

    pub fn with_supporting_types(mut self, strategy: impl SupportingTypesStrategy + 'static) -> Self {
        self.supporting.push(Box::new(strategy));
        self
    }

    pub fn with_supporting_strategies(mut self, strategies: Vec<Box<dyn SupportingTypesStrategy>>) -> Self {
        self.supporting.extend(strategies);
        self
    }

    fn supporting(&self) -> &[Box<dyn SupportingTypesStrategy>] {
        if self.supporting.is_empty() {
            &self.default_supporting
        } else {
            &self.supporting
        }
    }
}

impl ComponentFinderStrategy for AnnotationComponentFinderStrategy {
    fn name(&self) -> &'static str {
        "annotation"
    }

    fn required_capabilities(&self) -> Vec<Capability> {
        let mut capabilities = vec![Capability::Markers];
        for capability in capabilities_of(self.supporting()) {
            if !capabilities.contains(&capability) {
                capabilities.push(capability);
            }
        }
        capabilities
    }

    fn find_components(
        &self,
        container: &mut Container,
        repository: &dyn TypeRepository,
        scope: &str,
        report: &mut DiscoveryReport,
    ) {
        let mut found = Vec::new();

        for type_name in repository.list_types(scope) {
            match repository.has_marker(&type_name, &self.marker) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    report.skip(type_name, SkipReason::Unresolvable(e));
                    continue;
                }
            }

            let info = match repository.type_info(&type_name) {
                Ok(info) => info,
                Err(e) => {
                    report.skip(type_name, SkipReason::Unresolvable(e));
                    continue;
                }
            };
            let (description, technology) = info
                .annotation(&self.marker)
                .map(|a| {
                    (
                        a.attribute("description").unwrap_or_default(),
                        a.attribute("technology").unwrap_or_default(),
                    )
                })
                .unwrap_or_default();

            let registered = register(
                container,
                report,
                info.simple_name(),
                &type_name,
                description,
                technology,
            );
            found.extend(registered);
        }

        report.code_elements_added +=
            apply_strategies(self.supporting(), &found, container, repository, scope);
        report.components.extend(found);
    }
}

fn capabilities_of(strategies: &[Box<dyn SupportingTypesStrategy>]) -> Vec<Capability> {
    let mut capabilities = Vec::new();
    for strategy in strategies {
        for &capability in strategy.required_capabilities() {
            if !capabilities.contains(&capability) {
                capabilities.push(capability);
            }
        }
    }
    capabilities
}

fn register(
    container: &mut Container,
    report: &mut DiscoveryReport,
    name: &str,
    type_name: &str,
    description: &str,
    technology: &str,
) -> Option<ComponentId> {
    let existed = container.get_component_of_type(type_name).is_some();
    match container.add_component(name, type_name, description, technology) {
        Ok(id) => {
            if !existed {
                debug!("found component {} ({})", name, type_name);
                report.created += 1;
            }
            Some(id)
        }
        Err(e) => {
            report.skipped.push(SkippedType {
                type_name: type_name.to_string(),
                reason: SkipReason::Model(e),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finder::matcher::NameSuffixTypeMatcher;
    use crate::finder::supporting::{ComponentPackage, ReferencedTypes};
    use crate::repository::{Annotation, InMemoryTypeRepository, RepositoryError, TypeInfo};

    fn repo() -> InMemoryTypeRepository {
        InMemoryTypeRepository::builder()
            .with_type(
                TypeInfo::class("app.web.OrderController")
                    .annotated(
                        Annotation::new("Component")
                            .with_attribute("description", "Serves orders")
                            .with_attribute("technology", "Spring MVC"),
                    )
                    .references("app.data.OrderRepository"),
            )
            .with_type(TypeInfo::interface("app.data.OrderRepository").annotated(Annotation::new("Component")))
            .with_type(TypeInfo::class("app.data.JdbcOrderRepository").implements("app.data.OrderRepository"))
            .build()
    }

    #[test]
    fn test_type_based_creates_primary_elements_only() {
        let repo = repo();
        let mut container = Container::new("App", "", "");
        let mut report = DiscoveryReport::new("app", "type");
        let strategy = TypeBasedComponentFinderStrategy::new(
            NameSuffixTypeMatcher::new("Repository").with_technology("JDBC"),
        );

        strategy.find_components(&mut container, &repo, "app", &mut report);

        assert_eq!(report.created, 2);
        assert_eq!(container.components().len(), 2);
        for component in container.components() {
            assert_eq!(component.code().len(), 1);
            assert_eq!(component.technology, "JDBC");
        }
    }

    #[test]
    fn test_annotation_strategy_uses_marker_attributes_and_default_supporting_types() {
        let repo = repo();
        let mut container = Container::new("App", "", "");
        let mut report = DiscoveryReport::new("app", "annotation");

        AnnotationComponentFinderStrategy::new().find_components(
            &mut container,
            &repo,
            "app",
            &mut report,
        );

        let controller = container.get_component_with_name("OrderController").unwrap();
        assert_eq!(controller.description, "Serves orders");
        assert_eq!(controller.technology, "Spring MVC");
        assert_eq!(controller.code().len(), 1);

        let repository = container.get_component_with_name("OrderRepository").unwrap();
        assert_eq!(
            repository.supporting_types().collect::<Vec<_>>(),
            vec!["app.data.JdbcOrderRepository"]
        );
        assert_eq!(report.code_elements_added, 1);
    }

    #[test]
    fn test_required_capabilities() {
        let default = AnnotationComponentFinderStrategy::new();
        assert_eq!(
            default.required_capabilities(),
            vec![Capability::Markers, Capability::Assignability]
        );

        let package_only = AnnotationComponentFinderStrategy::new().with_supporting_types(ComponentPackage);
        assert_eq!(package_only.required_capabilities(), vec![Capability::Markers]);

        let typed = TypeBasedComponentFinderStrategy::new(NameSuffixTypeMatcher::new("X"))
            .with_supporting_types(ReferencedTypes);
        assert_eq!(typed.required_capabilities(), vec![Capability::References]);
    }

    /// Answers marker queries from an index but cannot load the types.
    struct MarkerIndexOnly;

    impl TypeRepository for MarkerIndexOnly {
        fn list_types(&self, _scope: &str) -> Vec<String> {
            vec!["app.LostComponent".to_string()]
        }

        fn type_info(&self, name: &str) -> Result<&TypeInfo, RepositoryError> {
            Err(RepositoryError::Introspection {
                type_name: name.to_string(),
                reason: "class file is missing".to_string(),
            })
        }

        fn has_marker(&self, _name: &str, _marker: &Marker) -> Result<bool, RepositoryError> {
            Ok(true)
        }
    }

    #[test]
    fn test_annotation_strategy_reports_marked_type_it_cannot_load() {
        let mut container = Container::new("App", "", "");
        let mut report = DiscoveryReport::new("app", "annotation");

        AnnotationComponentFinderStrategy::new().find_components(
            &mut container,
            &MarkerIndexOnly,
            "app",
            &mut report,
        );

        assert!(container.components().is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].type_name, "app.LostComponent");
        assert!(matches!(
            report.skipped[0].reason,
            SkipReason::Unresolvable(RepositoryError::Introspection { .. })
        ));
    }
}
