use serde::{Deserialize, Serialize};

/// Handle to a component owned by a [`super::Container`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentId(pub(crate) usize);

impl ComponentId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CodeElementRole {
    Primary,
    Supporting,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeElement {
    pub type_name: String,
    pub role: CodeElementRole,
}

impl CodeElement {
    pub fn primary(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            role: CodeElementRole::Primary,
        }
    }

    pub fn supporting(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            role: CodeElementRole::Supporting,
        }
    }

    /// The simple name, i.e. the last segment of the qualified type name.
    pub fn name(&self) -> &str {
        simple_name(&self.type_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Relationship {
    pub destination: ComponentId,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    pub type_name: String,
    pub description: String,
    pub technology: String,
    pub(crate) code: Vec<CodeElement>,
    pub(crate) relationships: Vec<Relationship>,
}

impl Component {
    pub(crate) fn new(
        id: ComponentId,
        name: String,
        type_name: String,
        description: String,
        technology: String,
    ) -> Self {
        let code = vec![CodeElement::primary(type_name.clone())];
        Self {
            id,
            name,
            type_name,
            description,
            technology,
            code,
            relationships: Vec::new(),
        }
    }

    /// Code elements in the order they were attributed; the primary one is first.
    pub fn code(&self) -> &[CodeElement] {
        &self.code
    }

    pub fn supporting_types(&self) -> impl Iterator<Item = &str> {
        self.code
            .iter()
            .filter(|c| c.role == CodeElementRole::Supporting)
            .map(|c| c.type_name.as_str())
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn uses(&self, destination: ComponentId) -> bool {
        self.relationships
            .iter()
            .any(|r| r.destination == destination)
    }

    pub fn has_code_element(&self, type_name: &str, role: CodeElementRole) -> bool {
        self.code
            .iter()
            .any(|c| c.type_name == type_name && c.role == role)
    }
}

/// Last dot-separated segment of a qualified name.
pub fn simple_name(type_name: &str) -> &str {
    type_name.rsplit('.').next().unwrap_or(type_name)
}
