use crate::repository::{Marker, TypeInfo, TypeRepository};
use regex::Regex;

/// Decides whether a scanned type is the primary type of a component.
pub trait TypeMatcher {
    fn matches(&self, info: &TypeInfo, repository: &dyn TypeRepository) -> bool;

    /// Description given to components found by this matcher.
    fn description(&self) -> &str {
        ""
    }

    /// Technology given to components found by this matcher.
    fn technology(&self) -> &str {
        ""
    }
}

/// Matches types whose simple name ends with a suffix, e.g. `Controller`.
#[derive(Debug, Clone, Default)]
pub struct NameSuffixTypeMatcher {
    suffix: String,
    include_prefix: String,
    exclude_prefix: String,
    description: String,
    technology: String,
}

impl NameSuffixTypeMatcher {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            ..Default::default()
        }
    }

    /// Only match types whose qualified name starts with `prefix`.
    pub fn including(mut self, prefix: impl Into<String>) -> Self {
        self.include_prefix = prefix.into();
        self
    }

    /// Never match types whose qualified name starts with `prefix`.
    pub fn excluding(mut self, prefix: impl Into<String>) -> Self {
        self.exclude_prefix = prefix.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_technology(mut self, technology: impl Into<String>) -> Self {
        self.technology = technology.into();
        self
    }
}

impl TypeMatcher for NameSuffixTypeMatcher {
    fn matches(&self, info: &TypeInfo, _repository: &dyn TypeRepository) -> bool {
        info.simple_name().ends_with(&self.suffix)
            && (self.include_prefix.is_empty() || info.name.starts_with(&self.include_prefix))
            && (self.exclude_prefix.is_empty() || !info.name.starts_with(&self.exclude_prefix))
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn technology(&self) -> &str {
        &self.technology
    }
}

/// Matches types carrying a marker annotation.
#[derive(Debug, Clone)]
pub struct AnnotationTypeMatcher {
    marker: Marker,
    description: String,
    technology: String,
}

impl AnnotationTypeMatcher {
    pub fn new(marker: Marker) -> Self {
        Self {
            marker,
            description: String::new(),
            technology: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_technology(mut self, technology: impl Into<String>) -> Self {
        self.technology = technology.into();
        self
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }
}

impl TypeMatcher for AnnotationTypeMatcher {
    fn matches(&self, info: &TypeInfo, _repository: &dyn TypeRepository) -> bool {
        info.annotation(&self.marker).is_some()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn technology(&self) -> &str {
        &self.technology
    }
}

/// Matches concrete types implementing an interface, directly or through
/// their ancestors.
#[derive(Debug, Clone)]
pub struct ImplementsInterfaceTypeMatcher {
    interface: String,
    description: String,
    technology: String,
}

impl ImplementsInterfaceTypeMatcher {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            description: String::new(),
            technology: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_technology(mut self, technology: impl Into<String>) -> Self {
        self.technology = technology.into();
        self
    }
}

impl TypeMatcher for ImplementsInterfaceTypeMatcher {
    fn matches(&self, info: &TypeInfo, repository: &dyn TypeRepository) -> bool {
        info.name != self.interface
            && !info.kind.is_abstract()
            && repository
                .is_assignable_to(&info.name, &self.interface)
                .unwrap_or(false)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn technology(&self) -> &str {
        &self.technology
    }
}

/// Matches types extending a class, directly or through their ancestors.
#[derive(Debug, Clone)]
pub struct ExtendsClassTypeMatcher {
    class: String,
    description: String,
    technology: String,
}

impl ExtendsClassTypeMatcher {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            description: String::new(),
            technology: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_technology(mut self, technology: impl Into<String>) -> Self {
        self.technology = technology.into();
        self
    }
}

impl TypeMatcher for ExtendsClassTypeMatcher {
    fn matches(&self, info: &TypeInfo, repository: &dyn TypeRepository) -> bool {
        let mut current = info.superclass.clone();
        let mut hops = 0;
        while let Some(parent) = current {
            if parent == self.class {
                return true;
            }
            // Guards against a superclass cycle in malformed input.
            hops += 1;
            if hops > 64 {
                return false;
            }
            current = repository
                .type_info(&parent)
                .ok()
                .and_then(|p| p.superclass.clone());
        }
        false
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn technology(&self) -> &str {
        &self.technology
    }
}

/// Matches qualified type names against a regular expression.
#[derive(Debug, Clone)]
pub struct RegexTypeMatcher {
    pattern: Regex,
    description: String,
    technology: String,
}

impl RegexTypeMatcher {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            description: String::new(),
            technology: String::new(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_technology(mut self, technology: impl Into<String>) -> Self {
        self.technology = technology.into();
        self
    }
}

impl TypeMatcher for RegexTypeMatcher {
    fn matches(&self, info: &TypeInfo, _repository: &dyn TypeRepository) -> bool {
        self.pattern.is_match(&info.name)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn technology(&self) -> &str {
        &self.technology
    }
}

/// Wraps a closure as a matcher.
pub struct FnTypeMatcher<F> {
    predicate: F,
}

impl<F> FnTypeMatcher<F>
where
    F: Fn(&TypeInfo) -> bool,
{
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> TypeMatcher for FnTypeMatcher<F>
where
    F: Fn(&TypeInfo) -> bool,
{
    fn matches(&self, info: &TypeInfo, _repository: &dyn TypeRepository) -> bool {
        (self.predicate)(info)
    }
}
