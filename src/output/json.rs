use crate::api::DiscoveryResult;
use crate::model::{CodeElementRole, Container};
use crate::output::{OutputFormatter, relative_path};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Default)]
pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Serialize)]
struct JsonResult<'a> {
    container: JsonContainer<'a>,
    components: Vec<JsonComponent<'a>>,
    cycles: Vec<Vec<&'a str>>,
    runs: Vec<JsonRun<'a>>,
    files: usize,
    types: usize,
    failures: Vec<JsonFailure>,
}

#[derive(Serialize)]
struct JsonContainer<'a> {
    name: &'a str,
    description: &'a str,
    technology: &'a str,
}

#[derive(Serialize)]
struct JsonComponent<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    type_name: &'a str,
    description: &'a str,
    technology: &'a str,
    code: Vec<JsonCodeElement<'a>>,
    uses: Vec<JsonRelationship<'a>>,
}

#[derive(Serialize)]
struct JsonCodeElement<'a> {
    #[serde(rename = "type")]
    type_name: &'a str,
    role: &'static str,
}

#[derive(Serialize)]
struct JsonRelationship<'a> {
    destination: &'a str,
    description: &'a str,
}

#[derive(Serialize)]
struct JsonRun<'a> {
    strategy: &'a str,
    scope: &'a str,
    components: Vec<&'a str>,
    created: usize,
    code_elements_added: usize,
    relationships_added: usize,
    relationships_removed: usize,
    skipped: Vec<JsonSkipped<'a>>,
}

#[derive(Serialize)]
struct JsonSkipped<'a> {
    #[serde(rename = "type")]
    type_name: &'a str,
    reason: String,
}

#[derive(Serialize)]
struct JsonFailure {
    path: String,
    error: String,
}

fn type_of(container: &Container, id: crate::model::ComponentId) -> &str {
    container[id].type_name.as_str()
}

impl OutputFormatter for JsonOutput {
    fn format<W: Write>(&self, result: &DiscoveryResult, writer: &mut W) -> std::io::Result<()> {
        let container = &result.container;

        let json_result = JsonResult {
            container: JsonContainer {
                name: &container.name,
                description: &container.description,
                technology: &container.technology,
            },
            components: container
                .components()
                .iter()
                .map(|c| JsonComponent {
                    name: &c.name,
                    type_name: &c.type_name,
                    description: &c.description,
                    technology: &c.technology,
                    code: c
                        .code()
                        .iter()
                        .map(|e| JsonCodeElement {
                            type_name: &e.type_name,
                            role: match e.role {
                                CodeElementRole::Primary => "primary",
                                CodeElementRole::Supporting => "supporting",
                            },
                        })
                        .collect(),
                    uses: c
                        .relationships()
                        .iter()
                        .map(|r| JsonRelationship {
                            destination: type_of(container, r.destination),
                            description: &r.description,
                        })
                        .collect(),
                })
                .collect(),
            cycles: container
                .cycles()
                .into_iter()
                .map(|cycle| cycle.into_iter().map(|id| type_of(container, id)).collect())
                .collect(),
            runs: result
                .reports
                .iter()
                .map(|r| JsonRun {
                    strategy: r.strategy,
                    scope: &r.scope,
                    components: r.components.iter().map(|id| type_of(container, *id)).collect(),
                    created: r.created,
                    code_elements_added: r.code_elements_added,
                    relationships_added: r.relationships_added,
                    relationships_removed: r.relationships_removed,
                    skipped: r
                        .skipped
                        .iter()
                        .map(|s| JsonSkipped {
                            type_name: &s.type_name,
                            reason: s.reason.to_string(),
                        })
                        .collect(),
                })
                .collect(),
            files: result.files,
            types: result.types,
            failures: result
                .failures
                .iter()
                .map(|f| JsonFailure {
                    path: relative_path(&f.path, &result.root),
                    error: f.error.to_string(),
                })
                .collect(),
        };

        let json = serde_json::to_string_pretty(&json_result).map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finder::{AnnotationComponentFinderStrategy, ComponentFinder};
    use crate::repository::{Annotation, InMemoryTypeRepository, TypeInfo};
    use std::path::PathBuf;

    #[test]
    fn test_json_output_structure() {
        let repo = InMemoryTypeRepository::builder()
            .with_type(
                TypeInfo::interface("app.web.OrderController")
                    .annotated(Annotation::new("Component").with_attribute("technology", "Spring MVC"))
                    .references("app.data.OrderRepository"),
            )
            .with_type(TypeInfo::class("app.web.OrderControllerImpl").implements("app.web.OrderController"))
            .with_type(TypeInfo::interface("app.data.OrderRepository").annotated(Annotation::new("Component")))
            .build();
        let mut container = Container::new("Shop", "", "Java");
        let report = ComponentFinder::new(&repo, "", AnnotationComponentFinderStrategy::new())
            .unwrap()
            .find_components(&mut container);

        let result = DiscoveryResult {
            root: PathBuf::from("/project"),
            container,
            reports: vec![report],
            files: 3,
            types: 3,
            failures: Vec::new(),
        };

        let mut buffer = Vec::new();
        JsonOutput::new().format(&result, &mut buffer).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(value["container"]["name"], "Shop");
        let components = value["components"].as_array().unwrap();
        assert_eq!(components.len(), 2);

        let controller = &components[0];
        assert_eq!(controller["type"], "app.web.OrderController");
        assert_eq!(controller["technology"], "Spring MVC");
        assert_eq!(controller["code"][1]["type"], "app.web.OrderControllerImpl");
        assert_eq!(controller["code"][1]["role"], "supporting");
        assert_eq!(controller["uses"][0]["destination"], "app.data.OrderRepository");
        assert_eq!(controller["uses"][0]["description"], "Uses");

        assert_eq!(value["runs"][0]["strategy"], "annotation");
        assert_eq!(value["runs"][0]["relationships_added"], 1);
        assert!(value["cycles"].as_array().unwrap().is_empty());
    }
}
