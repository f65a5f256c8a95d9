use crate::define_parser;
use crate::parser::common::{child_of_kind, node_text};
use crate::parser::{DeclaredType, Import, LanguageParser, ParseError, SourceFile};
use crate::repository::{Annotation, TypeKind};
use std::path::Path;
use tree_sitter::Node;

define_parser!(JAVA_PARSER, tree_sitter_java::LANGUAGE);

pub struct JavaParser;

impl JavaParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_package(node: &Node, source: &[u8]) -> Option<String> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))
            .map(|c| node_text(&c, source).to_string())
    }

    fn parse_import(node: &Node, source: &[u8]) -> Option<Import> {
        let mut name = None;
        let mut wildcard = false;
        let mut is_static = false;

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "static" => is_static = true,
                "asterisk" => wildcard = true,
                "scoped_identifier" | "identifier" => {
                    name = Some(node_text(&child, source).to_string());
                }
                _ => {}
            }
        }

        name.map(|name| Import {
            name,
            wildcard,
            is_static,
        })
    }

    fn has_modifier(node: &Node, keyword: &str) -> bool {
        let Some(modifiers) = child_of_kind(node, "modifiers") else {
            return false;
        };
        let mut cursor = modifiers.walk();
        let found = modifiers.children(&mut cursor).any(|c| c.kind() == keyword);
        found
    }

    fn declaration_kind(node: &Node) -> Option<TypeKind> {
        match node.kind() {
            "class_declaration" if Self::has_modifier(node, "abstract") => {
                Some(TypeKind::AbstractClass)
            }
            "class_declaration" => Some(TypeKind::Class),
            "interface_declaration" => Some(TypeKind::Interface),
            "enum_declaration" => Some(TypeKind::Enum),
            "record_declaration" => Some(TypeKind::Record),
            "annotation_type_declaration" => Some(TypeKind::Annotation),
            _ => None,
        }
    }

    /// Annotations from a declaration's modifiers, with string-ish arguments.
    fn parse_annotations(node: &Node, source: &[u8]) -> Vec<Annotation> {
        let mut annotations = Vec::new();
        let Some(modifiers) = child_of_kind(node, "modifiers") else {
            return annotations;
        };

        let mut cursor = modifiers.walk();
        for child in modifiers.named_children(&mut cursor) {
            if !matches!(child.kind(), "annotation" | "marker_annotation") {
                continue;
            }
            let Some(name) = child.child_by_field_name("name") else {
                continue;
            };
            let mut annotation = Annotation::new(node_text(&name, source));

            if let Some(arguments) = child.child_by_field_name("arguments") {
                let mut args_cursor = arguments.walk();
                for argument in arguments.named_children(&mut args_cursor) {
                    if argument.kind() == "element_value_pair" {
                        let key = argument.child_by_field_name("key");
                        let value = argument.child_by_field_name("value");
                        if let (Some(key), Some(value)) = (key, value) {
                            annotation = annotation.with_attribute(
                                node_text(&key, source),
                                literal_text(&value, source),
                            );
                        }
                    } else {
                        annotation =
                            annotation.with_attribute("value", literal_text(&argument, source));
                    }
                }
            }

            annotations.push(annotation);
        }

        annotations
    }

    fn parse_type(
        node: &Node,
        source: &[u8],
        prefix: &str,
        out: &mut Vec<DeclaredType>,
    ) {
        let Some(kind) = Self::declaration_kind(node) else {
            return;
        };
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let simple = node_text(&name_node, source);
        if simple.is_empty() {
            return;
        }
        let name = if prefix.is_empty() {
            simple.to_string()
        } else {
            format!("{}.{}", prefix, simple)
        };

        let superclass = node.child_by_field_name("superclass").and_then(|sc| {
            let mut names = Vec::new();
            collect_type_names(&sc, source, &mut names);
            names.into_iter().next()
        });

        let mut interfaces = Vec::new();
        if let Some(list) = node.child_by_field_name("interfaces") {
            collect_type_names(&list, source, &mut interfaces);
        }
        if let Some(list) = child_of_kind(node, "extends_interfaces") {
            collect_type_names(&list, source, &mut interfaces);
        }

        let mut references = Vec::new();
        if let Some(parameters) = node.child_by_field_name("parameters") {
            collect_parameter_types(&parameters, source, &mut references);
        }

        let mut nested = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            Self::parse_body(&body, source, &name, &mut references, &mut nested);
        }

        out.push(DeclaredType {
            name,
            kind,
            line: node.start_position().row + 1,
            superclass,
            interfaces,
            references,
            annotations: Self::parse_annotations(node, source),
        });
        out.extend(nested);
    }

    fn parse_body(
        body: &Node,
        source: &[u8],
        owner: &str,
        references: &mut Vec<String>,
        nested: &mut Vec<DeclaredType>,
    ) {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "field_declaration" | "constant_declaration" => {
                    if let Some(ty) = member.child_by_field_name("type") {
                        collect_type_names(&ty, source, references);
                    }
                }
                "method_declaration" | "annotation_type_element_declaration" => {
                    if let Some(ty) = member.child_by_field_name("type") {
                        collect_type_names(&ty, source, references);
                    }
                    if let Some(parameters) = member.child_by_field_name("parameters") {
                        collect_parameter_types(&parameters, source, references);
                    }
                }
                "constructor_declaration" => {
                    if let Some(parameters) = member.child_by_field_name("parameters") {
                        collect_parameter_types(&parameters, source, references);
                    }
                }
                "enum_body_declarations" => {
                    Self::parse_body(&member, source, owner, references, nested);
                }
                _ => Self::parse_type(&member, source, owner, nested),
            }
        }
    }
}

impl LanguageParser for JavaParser {
    fn extensions(&self) -> &[&str] {
        &["java"]
    }

    fn parse_file(&self, path: &Path, source: &str) -> Result<SourceFile, ParseError> {
        let tree = JAVA_PARSER
            .with(|parser| parser.borrow_mut().parse(source, None))
            .ok_or_else(|| ParseError::Parse("Failed to parse file".to_string()))?;

        let root = tree.root_node();
        let source_bytes = source.as_bytes();

        let mut file = SourceFile {
            path: path.to_path_buf(),
            package: String::new(),
            imports: Vec::new(),
            types: Vec::new(),
        };

        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "package_declaration" => {
                    if let Some(package) = Self::parse_package(&node, source_bytes) {
                        file.package = package;
                    }
                }
                "import_declaration" => {
                    if let Some(import) = Self::parse_import(&node, source_bytes) {
                        file.imports.push(import);
                    }
                }
                _ => {
                    let package = file.package.clone();
                    Self::parse_type(&node, source_bytes, &package, &mut file.types);
                }
            }
        }

        Ok(file)
    }
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Collect the type names written in a type expression, including type
/// arguments and array element types. Qualified names are kept whole.
fn collect_type_names(node: &Node, source: &[u8], out: &mut Vec<String>) {
    match node.kind() {
        "type_identifier" => push_unique(out, node_text(node, source).to_string()),
        "scoped_type_identifier" => {
            let name: String = node_text(node, source)
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            push_unique(out, name);
        }
        "annotation" | "marker_annotation" => {}
        _ => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                collect_type_names(&child, source, out);
            }
        }
    }
}

fn collect_parameter_types(parameters: &Node, source: &[u8], out: &mut Vec<String>) {
    let mut cursor = parameters.walk();
    for parameter in parameters.named_children(&mut cursor) {
        match parameter.kind() {
            "formal_parameter" => {
                if let Some(ty) = parameter.child_by_field_name("type") {
                    collect_type_names(&ty, source, out);
                }
            }
            "spread_parameter" => {
                let mut inner = parameter.walk();
                for child in parameter.named_children(&mut inner) {
                    if !matches!(child.kind(), "modifiers" | "variable_declarator") {
                        collect_type_names(&child, source, out);
                    }
                }
            }
            _ => {}
        }
    }
}

fn literal_text(node: &Node, source: &[u8]) -> String {
    let text = node_text(node, source).trim();
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
        .to_string()
}

fn push_unique(out: &mut Vec<String>, name: String) {
    if !name.is_empty() && !out.contains(&name) {
        out.push(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> SourceFile {
        JavaParser::new()
            .parse_file(Path::new("Test.java"), source)
            .unwrap()
    }

    #[test]
    fn test_parses_package_imports_and_declarations() {
        let file = parse(
            r#"
package com.example.web;

import com.example.data.CustomerRepository;
import java.util.*;
import static java.util.Objects.requireNonNull;

@Component(description = "Serves customer pages", technology = "Spring MVC")
public class CustomerController extends BaseController implements Handler, Auditable {
    private final CustomerRepository repository;
    private List<CustomerView> views;

    public CustomerController(CustomerRepository repository, Clock clock) {
        this.repository = requireNonNull(repository);
    }

    public CustomerView[] show(CustomerId id, String... tags) {
        return null;
    }
}
"#,
        );

        assert_eq!(file.package, "com.example.web");
        assert_eq!(file.imports.len(), 3);
        assert_eq!(file.imports[0].name, "com.example.data.CustomerRepository");
        assert!(file.imports[1].wildcard);
        assert_eq!(file.imports[1].name, "java.util");
        assert!(file.imports[2].is_static);

        assert_eq!(file.types.len(), 1);
        let controller = &file.types[0];
        assert_eq!(controller.name, "com.example.web.CustomerController");
        assert_eq!(controller.kind, TypeKind::Class);
        assert_eq!(controller.superclass.as_deref(), Some("BaseController"));
        assert_eq!(controller.interfaces, vec!["Handler", "Auditable"]);
        assert_eq!(
            controller.references,
            vec!["CustomerRepository", "List", "CustomerView", "Clock", "CustomerId", "String"]
        );

        let annotation = &controller.annotations[0];
        assert_eq!(annotation.name, "Component");
        assert_eq!(annotation.attribute("description"), Some("Serves customer pages"));
        assert_eq!(annotation.attribute("technology"), Some("Spring MVC"));
    }

    #[test]
    fn test_abstract_classes_interfaces_and_nested_types() {
        let file = parse(
            r#"
package app;

public abstract class AbstractService {
    protected LoggingComponent logging;

    public static class Settings {
        private Clock clock;
    }
}

@FunctionalInterface
interface Feature extends Named, java.io.Serializable {
    Result apply(Input input);
}

enum Mode implements Feature {
    ON, OFF;

    private Settings settings;
}

@Marker("payments")
record Payment(Money amount, Account from) {}
"#,
        );

        let names: Vec<_> = file.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "app.AbstractService",
                "app.AbstractService.Settings",
                "app.Feature",
                "app.Mode",
                "app.Payment"
            ]
        );

        assert_eq!(file.types[0].kind, TypeKind::AbstractClass);
        assert_eq!(file.types[0].references, vec!["LoggingComponent"]);
        assert_eq!(file.types[1].references, vec!["Clock"]);

        let feature = &file.types[2];
        assert_eq!(feature.kind, TypeKind::Interface);
        assert_eq!(feature.interfaces, vec!["Named", "java.io.Serializable"]);
        assert_eq!(feature.references, vec!["Result", "Input"]);
        assert_eq!(feature.annotations[0].name, "FunctionalInterface");

        let mode = &file.types[3];
        assert_eq!(mode.kind, TypeKind::Enum);
        assert_eq!(mode.interfaces, vec!["Feature"]);
        assert_eq!(mode.references, vec!["Settings"]);

        let payment = &file.types[4];
        assert_eq!(payment.kind, TypeKind::Record);
        assert_eq!(payment.references, vec!["Money", "Account"]);
        assert_eq!(payment.annotations[0].attribute("value"), Some("payments"));
    }

    #[test]
    fn test_qualified_annotation_names_are_kept() {
        let file = parse(
            r#"
package app;

@com.structurizr.annotation.Component
class Thing {}
"#,
        );

        assert_eq!(
            file.types[0].annotations[0].name,
            "com.structurizr.annotation.Component"
        );
    }
}
