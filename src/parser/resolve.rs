use crate::parser::{Import, SourceFile};
use crate::repository::{Annotation, InMemoryTypeRepository, TypeInfo, TypeRepository};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Resolves type names as written in one file to qualified names.
///
/// Lookup order: names that are already qualified, single-type imports,
/// types declared in the same file, the same package, then on-demand
/// imports. A simple name never short-circuits to a default-package type of
/// the same name. Names that resolve to nothing are returned unchanged.
pub struct NameResolver<'a> {
    known: &'a HashSet<String>,
    package: &'a str,
    imports: &'a [Import],
    local: HashMap<String, &'a str>,
}

impl<'a> NameResolver<'a> {
    pub fn new(file: &'a SourceFile, known: &'a HashSet<String>) -> Self {
        let mut local = HashMap::new();
        for declared in &file.types {
            let relative = declared
                .name
                .strip_prefix(&file.package)
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(&declared.name);
            local.insert(relative.to_string(), declared.name.as_str());
            if let Some((_, simple)) = relative.rsplit_once('.') {
                local.entry(simple.to_string()).or_insert(declared.name.as_str());
            }
        }

        Self {
            known,
            package: &file.package,
            imports: &file.imports,
            local,
        }
    }

    pub fn resolve(&self, raw: &str) -> String {
        match raw.split_once('.') {
            Some(_) if self.known.contains(raw) => raw.to_string(),
            // `Outer.Inner` where `Outer` itself needs resolving.
            Some((head, rest)) => match self.resolve_simple(head) {
                Some(outer) => {
                    let candidate = format!("{}.{}", outer, rest);
                    if self.known.contains(&candidate) {
                        candidate
                    } else {
                        raw.to_string()
                    }
                }
                None => raw.to_string(),
            },
            None => self.resolve_simple(raw).unwrap_or_else(|| raw.to_string()),
        }
    }

    fn resolve_simple(&self, name: &str) -> Option<String> {
        let single = self
            .imports
            .iter()
            .filter(|i| !i.wildcard && !i.is_static)
            .find(|i| i.name.rsplit('.').next() == Some(name));
        if let Some(import) = single {
            return Some(import.name.clone());
        }

        if let Some(declared) = self.local.get(name) {
            return Some((*declared).to_string());
        }

        let same_package = if self.package.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.package, name)
        };
        if self.known.contains(&same_package) {
            return Some(same_package);
        }

        self.imports
            .iter()
            .filter(|i| i.wildcard && !i.is_static)
            .map(|i| format!("{}.{}", i.name, name))
            .find(|candidate| self.known.contains(candidate))
    }
}

/// Resolve every parsed file against the full set of declared types and
/// collect the result into a repository, in file order.
pub fn build_repository(files: &[SourceFile]) -> InMemoryTypeRepository {
    let known: HashSet<String> = files
        .iter()
        .flat_map(|f| f.types.iter().map(|t| t.name.clone()))
        .collect();

    let mut repository = InMemoryTypeRepository::new();

    for file in files {
        let resolver = NameResolver::new(file, &known);

        for declared in &file.types {
            let mut info = TypeInfo::new(declared.name.clone(), declared.kind).in_package(&file.package);
            info.superclass = declared.superclass.as_deref().map(|s| resolver.resolve(s));
            info.interfaces = declared.interfaces.iter().map(|i| resolver.resolve(i)).collect();
            for reference in &declared.references {
                info = info.references(resolver.resolve(reference));
            }
            for annotation in &declared.annotations {
                info = info.annotated(Annotation {
                    name: resolver.resolve(&annotation.name),
                    attributes: annotation.attributes.clone(),
                });
            }

            if repository.contains(&info.name) {
                debug!("{} is declared more than once, keeping the last declaration", info.name);
            }
            repository.insert(info);
        }
    }

    repository
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::DeclaredType;
    use crate::repository::TypeKind;
    use std::path::PathBuf;

    fn declared(name: &str) -> DeclaredType {
        DeclaredType {
            name: name.to_string(),
            kind: TypeKind::Class,
            line: 1,
            superclass: None,
            interfaces: Vec::new(),
            references: Vec::new(),
            annotations: Vec::new(),
        }
    }

    fn file(package: &str, imports: Vec<Import>, types: Vec<DeclaredType>) -> SourceFile {
        SourceFile {
            path: PathBuf::from("Test.java"),
            package: package.to_string(),
            imports,
            types,
        }
    }

    fn import(name: &str, wildcard: bool) -> Import {
        Import {
            name: name.to_string(),
            wildcard,
            is_static: false,
        }
    }

    #[test]
    fn test_resolution_order() {
        let known: HashSet<String> = [
            "app.web.Handler",
            "app.web.Controller",
            "app.web.Controller.Request",
            "app.data.Handler",
            "app.data.Store",
            "app.util.Store",
            "app.util.Clock",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let source = file(
            "app.web",
            vec![
                import("app.data.Handler", false),
                import("app.util", true),
                import("org.lib.External", false),
            ],
            vec![declared("app.web.Controller"), declared("app.web.Controller.Request")],
        );
        let resolver = NameResolver::new(&source, &known);

        // single-type import beats the same package
        assert_eq!(resolver.resolve("Handler"), "app.data.Handler");
        // nested type declared in the file
        assert_eq!(resolver.resolve("Request"), "app.web.Controller.Request");
        assert_eq!(resolver.resolve("Controller.Request"), "app.web.Controller.Request");
        // on-demand import
        assert_eq!(resolver.resolve("Clock"), "app.util.Clock");
        assert_eq!(resolver.resolve("Store"), "app.util.Store");
        // imports resolve even when the type is not in the source tree
        assert_eq!(resolver.resolve("External"), "org.lib.External");
        // qualified names are kept
        assert_eq!(resolver.resolve("app.data.Store"), "app.data.Store");
        // unknown names are left alone
        assert_eq!(resolver.resolve("String"), "String");
        assert_eq!(resolver.resolve("Map.Entry"), "Map.Entry");
    }

    #[test]
    fn test_single_type_import_beats_default_package_type() {
        let known: HashSet<String> = ["Clock", "app.util.Clock"]
            .into_iter()
            .map(String::from)
            .collect();

        let importing = file("", vec![import("app.util.Clock", false)], vec![declared("Main")]);
        assert_eq!(NameResolver::new(&importing, &known).resolve("Clock"), "app.util.Clock");

        let plain = file("", Vec::new(), vec![declared("Main")]);
        assert_eq!(NameResolver::new(&plain, &known).resolve("Clock"), "Clock");
    }

    #[test]
    fn test_build_repository_resolves_supertypes_references_and_annotations() {
        let mut controller = declared("app.web.OrderController");
        controller.superclass = Some("AbstractService".to_string());
        controller.interfaces = vec!["Handler".to_string()];
        controller.references = vec!["OrderRepository".to_string(), "String".to_string()];
        controller.annotations = vec![Annotation::new("Component").with_attribute("technology", "MVC")];

        let mut handler = declared("app.web.Handler");
        handler.kind = TypeKind::Interface;

        let files = vec![
            file(
                "app.web",
                vec![
                    import("app.data.OrderRepository", false),
                    import("app.base", true),
                    import("com.structurizr.annotation.Component", false),
                ],
                vec![controller, handler],
            ),
            file(
                "app.data",
                Vec::new(),
                vec![declared("app.data.OrderRepository")],
            ),
        ];

        let repo = build_repository(&files);
        assert_eq!(repo.len(), 3);

        let info = repo.type_info("app.web.OrderController").unwrap();
        assert_eq!(info.package, "app.web");
        assert_eq!(info.superclass.as_deref(), Some("AbstractService"));
        assert_eq!(info.interfaces, vec!["app.web.Handler"]);
        assert_eq!(info.references, vec!["app.data.OrderRepository", "String"]);
        assert_eq!(info.annotations[0].name, "com.structurizr.annotation.Component");
        assert_eq!(info.annotations[0].attribute("technology"), Some("MVC"));
    }

    #[test]
    fn test_nested_types_keep_their_package() {
        let files = vec![file(
            "app",
            Vec::new(),
            vec![declared("app.Outer"), declared("app.Outer.Inner")],
        )];

        let repo = build_repository(&files);
        assert_eq!(repo.type_info("app.Outer.Inner").unwrap().package, "app");
        assert_eq!(repo.list_types("app").len(), 2);
    }
}
