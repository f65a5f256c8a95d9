use super::Marker;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    AbstractClass,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl TypeKind {
    /// Interfaces and abstract classes, i.e. types that need an implementation.
    pub fn is_abstract(self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::AbstractClass)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Annotation {
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Structural facts about one type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeInfo {
    /// Fully-qualified name, e.g. `com.example.web.MyController`.
    pub name: String,
    pub package: String,
    pub kind: TypeKind,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    /// Field, parameter and return types, in declaration order.
    pub references: Vec<String>,
    pub annotations: Vec<Annotation>,
}

impl TypeInfo {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        let name = name.into();
        let package = name
            .rsplit_once('.')
            .map(|(package, _)| package.to_string())
            .unwrap_or_default();
        Self {
            name,
            package,
            kind,
            superclass: None,
            interfaces: Vec::new(),
            references: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    pub fn abstract_class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::AbstractClass)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    /// Override the package derived from the name (nested types).
    pub fn in_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        let superclass = superclass.into();
        if self.kind == TypeKind::Interface {
            self.interfaces.push(superclass);
        } else {
            self.superclass = Some(superclass);
        }
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn references(mut self, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        if !self.references.contains(&type_name) {
            self.references.push(type_name);
        }
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn simple_name(&self) -> &str {
        crate::model::simple_name(&self.name)
    }

    pub fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.superclass
            .iter()
            .chain(self.interfaces.iter())
            .map(String::as_str)
    }

    pub fn annotation(&self, marker: &Marker) -> Option<&Annotation> {
        self.annotations.iter().find(|a| marker.matches(&a.name))
    }
}
