use crate::finder::{
    AnnotationComponentFinderStrategy, AnnotationTypeMatcher, ComponentFinderStrategy,
    ComponentPackage, ExtendsClassTypeMatcher, FirstImplementationOfInterface,
    ImplementsInterfaceTypeMatcher, NameSuffixTypeMatcher, ReferencedTypes, RegexTypeMatcher,
    SupportingTypesStrategy, TypeBasedComponentFinderStrategy, TypeMatcher,
};
use crate::fs::{FileSystem, default_fs};
use crate::repository::{COMPONENT_ANNOTATION, Marker};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = ".componentfinder.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Unknown finder strategy '{0}' (expected 'type' or 'annotation')")]
    UnknownStrategy(String),
    #[error("Unknown supporting types strategy '{0}'")]
    UnknownSupportingStrategy(String),
    #[error("Unknown matcher kind '{0}'")]
    UnknownMatcher(String),
    #[error("Matcher '{kind}' is missing '{field}'")]
    MissingField { kind: String, field: &'static str },
    #[error("Type finder for scope '{0}' has no matchers")]
    NoMatchers(String),
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub container: ContainerConfig,
    /// Finder runs, applied in order. Empty means [`FinderConfig::default`].
    pub finders: Vec<FinderConfig>,
}

#[derive(Debug, Clone, Default)]
pub struct ContainerConfig {
    /// Falls back to the project directory name.
    pub name: Option<String>,
    pub description: String,
    pub technology: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Type,
    Annotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportingKind {
    FirstImplementation,
    ComponentPackage,
    ReferencedTypes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatcherRule {
    NameSuffix {
        suffix: String,
        include: Option<String>,
        exclude: Option<String>,
    },
    Annotation(String),
    Implements(String),
    Extends(String),
    Regex(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatcherConfig {
    pub rule: MatcherRule,
    pub description: String,
    pub technology: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderConfig {
    pub scope: String,
    pub strategy: StrategyKind,
    /// Marker for annotation finders; `None` is `@Component`.
    pub annotation: Option<String>,
    pub matchers: Vec<MatcherConfig>,
    pub supporting: Vec<SupportingKind>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    container: Option<RawContainer>,
    finders: Option<Vec<RawFinder>>,
}

#[derive(Debug, Deserialize)]
struct RawContainer {
    name: Option<String>,
    description: Option<String>,
    technology: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFinder {
    scope: Option<String>,
    strategy: Option<String>,
    annotation: Option<String>,
    matchers: Option<Vec<RawMatcher>>,
    supporting: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawMatcher {
    kind: String,
    suffix: Option<String>,
    include: Option<String>,
    exclude: Option<String>,
    name: Option<String>,
    interface: Option<String>,
    class: Option<String>,
    pattern: Option<String>,
    description: Option<String>,
    technology: Option<String>,
}

impl Default for FinderConfig {
    /// One annotation finder over the whole source tree.
    fn default() -> Self {
        Self {
            scope: String::new(),
            strategy: StrategyKind::Annotation,
            annotation: None,
            matchers: Vec::new(),
            supporting: Vec::new(),
        }
    }
}

impl Config {
    pub fn load(project_path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_fs(project_path, default_fs())
    }

    pub fn load_with_fs(project_path: &Path, fs: &dyn FileSystem) -> Result<Self, ConfigError> {
        let config_path = project_path.join(CONFIG_FILE);

        if !fs.exists(&config_path) {
            return Ok(Self::default());
        }

        let content = fs.read_to_string(&config_path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;

        let container = match raw.container {
            Some(c) => ContainerConfig {
                name: c.name,
                description: c.description.unwrap_or_default(),
                technology: c.technology.unwrap_or_default(),
            },
            None => ContainerConfig::default(),
        };

        let finders = raw
            .finders
            .unwrap_or_default()
            .into_iter()
            .map(FinderConfig::from_raw)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { container, finders })
    }

    /// The configured finders, or the default finder when none are configured.
    pub fn effective_finders(&self) -> Vec<FinderConfig> {
        if self.finders.is_empty() {
            vec![FinderConfig::default()]
        } else {
            self.finders.clone()
        }
    }
}

impl FinderConfig {
    fn from_raw(raw: RawFinder) -> Result<Self, ConfigError> {
        let scope = raw.scope.unwrap_or_default();

        let strategy = match raw.strategy.as_deref().unwrap_or("annotation") {
            "type" => StrategyKind::Type,
            "annotation" => StrategyKind::Annotation,
            other => return Err(ConfigError::UnknownStrategy(other.to_string())),
        };

        let matchers = raw
            .matchers
            .unwrap_or_default()
            .into_iter()
            .map(MatcherConfig::from_raw)
            .collect::<Result<Vec<_>, _>>()?;
        if strategy == StrategyKind::Type && matchers.is_empty() {
            return Err(ConfigError::NoMatchers(scope));
        }

        let supporting = raw
            .supporting
            .unwrap_or_default()
            .iter()
            .map(|name| match name.as_str() {
                "first-implementation" => Ok(SupportingKind::FirstImplementation),
                "component-package" => Ok(SupportingKind::ComponentPackage),
                "referenced-types" => Ok(SupportingKind::ReferencedTypes),
                other => Err(ConfigError::UnknownSupportingStrategy(other.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            scope,
            strategy,
            annotation: raw.annotation,
            matchers,
            supporting,
        })
    }

    /// Build the strategy this finder entry describes.
    pub fn build_strategy(&self) -> Result<Box<dyn ComponentFinderStrategy>, ConfigError> {
        let supporting: Vec<Box<dyn SupportingTypesStrategy>> = self
            .supporting
            .iter()
            .map(|kind| -> Box<dyn SupportingTypesStrategy> {
                match kind {
                    SupportingKind::FirstImplementation => Box::new(FirstImplementationOfInterface),
                    SupportingKind::ComponentPackage => Box::new(ComponentPackage),
                    SupportingKind::ReferencedTypes => Box::new(ReferencedTypes),
                }
            })
            .collect();

        match self.strategy {
            StrategyKind::Type => {
                let matchers = self
                    .matchers
                    .iter()
                    .map(MatcherConfig::build)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Box::new(
                    TypeBasedComponentFinderStrategy::from_matchers(matchers)
                        .with_supporting_strategies(supporting),
                ))
            }
            StrategyKind::Annotation => {
                let marker = self
                    .annotation
                    .as_deref()
                    .map(marker_for)
                    .unwrap_or(Marker::Component);
                Ok(Box::new(
                    AnnotationComponentFinderStrategy::with_marker(marker)
                        .with_supporting_strategies(supporting),
                ))
            }
        }
    }
}

impl MatcherConfig {
    fn from_raw(raw: RawMatcher) -> Result<Self, ConfigError> {
        let missing = |field: &'static str| ConfigError::MissingField {
            kind: raw.kind.clone(),
            field,
        };

        let rule = match raw.kind.as_str() {
            "name-suffix" => MatcherRule::NameSuffix {
                suffix: raw.suffix.clone().ok_or_else(|| missing("suffix"))?,
                include: raw.include.clone(),
                exclude: raw.exclude.clone(),
            },
            "annotation" => MatcherRule::Annotation(raw.name.clone().ok_or_else(|| missing("name"))?),
            "implements" => {
                MatcherRule::Implements(raw.interface.clone().ok_or_else(|| missing("interface"))?)
            }
            "extends" => MatcherRule::Extends(raw.class.clone().ok_or_else(|| missing("class"))?),
            "regex" => {
                let pattern = raw.pattern.clone().ok_or_else(|| missing("pattern"))?;
                compile(&pattern)?;
                MatcherRule::Regex(pattern)
            }
            other => return Err(ConfigError::UnknownMatcher(other.to_string())),
        };

        Ok(Self {
            rule,
            description: raw.description.unwrap_or_default(),
            technology: raw.technology.unwrap_or_default(),
        })
    }

    fn build(&self) -> Result<Box<dyn TypeMatcher>, ConfigError> {
        let description = self.description.as_str();
        let technology = self.technology.as_str();

        let matcher: Box<dyn TypeMatcher> = match &self.rule {
            MatcherRule::NameSuffix {
                suffix,
                include,
                exclude,
            } => {
                let mut matcher = NameSuffixTypeMatcher::new(suffix.as_str());
                if let Some(prefix) = include {
                    matcher = matcher.including(prefix.as_str());
                }
                if let Some(prefix) = exclude {
                    matcher = matcher.excluding(prefix.as_str());
                }
                Box::new(
                    matcher
                        .with_description(description)
                        .with_technology(technology),
                )
            }
            MatcherRule::Annotation(name) => Box::new(
                AnnotationTypeMatcher::new(marker_for(name))
                    .with_description(description)
                    .with_technology(technology),
            ),
            MatcherRule::Implements(interface) => Box::new(
                ImplementsInterfaceTypeMatcher::new(interface.as_str())
                    .with_description(description)
                    .with_technology(technology),
            ),
            MatcherRule::Extends(class) => Box::new(
                ExtendsClassTypeMatcher::new(class.as_str())
                    .with_description(description)
                    .with_technology(technology),
            ),
            MatcherRule::Regex(pattern) => Box::new(
                compile(pattern)?
                    .with_description(description)
                    .with_technology(technology),
            ),
        };

        Ok(matcher)
    }
}

fn compile(pattern: &str) -> Result<RegexTypeMatcher, ConfigError> {
    RegexTypeMatcher::new(pattern).map_err(|source| ConfigError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

fn marker_for(name: &str) -> Marker {
    if name == "Component" || name == COMPONENT_ANNOTATION {
        Marker::Component
    } else {
        Marker::Annotation(name.to_string())
    }
}

pub fn generate_config_template() -> String {
    r#"# componentfinder configuration

[container]
# name = "Web Application"
# description = ""
technology = "Java"

# Finder runs are applied in order against one container. Without any
# [[finders]] entries, types annotated with @Component anywhere in the source
# tree become components.
#
# [[finders]]
# scope = "com.example.web"
# strategy = "type"
# matchers = [
#     { kind = "name-suffix", suffix = "Controller", technology = "Spring MVC" },
#     { kind = "implements", interface = "com.example.web.Handler" },
# ]
# supporting = ["component-package"]
#
# [[finders]]
# scope = "com.example.data"
# strategy = "annotation"
# annotation = "Component"
# supporting = ["first-implementation", "referenced-types"]
#
# Matcher kinds: name-suffix (suffix, include, exclude), annotation (name),
# implements (interface), extends (class), regex (pattern).
# Supporting types: first-implementation, component-package, referenced-types.
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFs;

    #[test]
    fn test_missing_config_uses_defaults() {
        let fs = MockFs::new();
        let config = Config::load_with_fs(Path::new("/project"), &fs).unwrap();

        assert!(config.container.name.is_none());
        assert!(config.finders.is_empty());
        assert_eq!(config.effective_finders(), vec![FinderConfig::default()]);
    }

    #[test]
    fn test_parses_container_and_finders() {
        let config = Config::from_toml(
            r#"
[container]
name = "Web Application"
technology = "Java"

[[finders]]
scope = "com.example.web"
strategy = "type"
matchers = [
    { kind = "name-suffix", suffix = "Controller", exclude = "com.example.web.legacy", technology = "Spring MVC" },
    { kind = "regex", pattern = ".*Endpoint$" },
]
supporting = ["component-package", "referenced-types"]

[[finders]]
scope = "com.example.data"
annotation = "Repository"
"#,
        )
        .unwrap();

        assert_eq!(config.container.name.as_deref(), Some("Web Application"));
        assert_eq!(config.container.technology, "Java");
        assert_eq!(config.finders.len(), 2);

        let web = &config.finders[0];
        assert_eq!(web.strategy, StrategyKind::Type);
        assert_eq!(web.matchers.len(), 2);
        assert_eq!(web.matchers[0].technology, "Spring MVC");
        assert_eq!(
            web.matchers[0].rule,
            MatcherRule::NameSuffix {
                suffix: "Controller".to_string(),
                include: None,
                exclude: Some("com.example.web.legacy".to_string()),
            }
        );
        assert_eq!(
            web.supporting,
            vec![SupportingKind::ComponentPackage, SupportingKind::ReferencedTypes]
        );

        let data = &config.finders[1];
        assert_eq!(data.strategy, StrategyKind::Annotation);
        assert_eq!(data.annotation.as_deref(), Some("Repository"));

        assert_eq!(web.build_strategy().unwrap().name(), "type");
        assert_eq!(data.build_strategy().unwrap().name(), "annotation");
    }

    #[test]
    fn test_rejects_unknown_names() {
        let unknown_strategy = Config::from_toml("[[finders]]\nstrategy = \"magic\"\n");
        assert!(matches!(unknown_strategy, Err(ConfigError::UnknownStrategy(s)) if s == "magic"));

        let unknown_supporting = Config::from_toml("[[finders]]\nsupporting = [\"everything\"]\n");
        assert!(matches!(
            unknown_supporting,
            Err(ConfigError::UnknownSupportingStrategy(_))
        ));

        let unknown_matcher = Config::from_toml(
            "[[finders]]\nstrategy = \"type\"\nmatchers = [{ kind = \"vibes\" }]\n",
        );
        assert!(matches!(unknown_matcher, Err(ConfigError::UnknownMatcher(_))));
    }

    #[test]
    fn test_rejects_incomplete_matchers() {
        let no_matchers = Config::from_toml("[[finders]]\nscope = \"app\"\nstrategy = \"type\"\n");
        assert!(matches!(no_matchers, Err(ConfigError::NoMatchers(s)) if s == "app"));

        let missing = Config::from_toml(
            "[[finders]]\nstrategy = \"type\"\nmatchers = [{ kind = \"implements\" }]\n",
        );
        assert!(matches!(
            missing,
            Err(ConfigError::MissingField { field: "interface", .. })
        ));

        let bad_regex = Config::from_toml(
            "[[finders]]\nstrategy = \"type\"\nmatchers = [{ kind = \"regex\", pattern = \"(\" }]\n",
        );
        assert!(matches!(bad_regex, Err(ConfigError::InvalidRegex { .. })));
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let config = Config::from_toml(&generate_config_template()).unwrap();
        assert_eq!(config.container.technology, "Java");
        assert!(config.finders.is_empty());
    }

    #[test]
    fn test_component_marker_names() {
        assert_eq!(marker_for("Component"), Marker::Component);
        assert_eq!(marker_for(COMPONENT_ANNOTATION), Marker::Component);
        assert_eq!(
            marker_for("org.springframework.stereotype.Service"),
            Marker::Annotation("org.springframework.stereotype.Service".to_string())
        );
    }
}
