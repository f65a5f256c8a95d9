use super::{Capability, RepositoryError, TypeInfo, TypeRepository, in_scope};
use std::collections::{HashMap, HashSet};

/// A symbol table of types, enumerated in insertion order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTypeRepository {
    types: Vec<TypeInfo>,
    by_name: HashMap<String, usize>,
    unsupported: HashSet<Capability>,
}

impl InMemoryTypeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> InMemoryTypeRepositoryBuilder {
        InMemoryTypeRepositoryBuilder::default()
    }

    /// Insert a type, replacing any earlier entry with the same name in place.
    pub fn insert(&mut self, info: TypeInfo) {
        match self.by_name.get(&info.name) {
            Some(&idx) => self.types[idx] = info,
            None => {
                self.by_name.insert(info.name.clone(), self.types.len());
                self.types.push(info);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.iter()
    }

    /// Declare that this repository cannot answer questions of a given kind.
    pub fn disable(&mut self, capability: Capability) {
        self.unsupported.insert(capability);
    }
}

impl TypeRepository for InMemoryTypeRepository {
    fn list_types(&self, scope: &str) -> Vec<String> {
        self.types
            .iter()
            .filter(|t| in_scope(scope, &t.package))
            .map(|t| t.name.clone())
            .collect()
    }

    fn type_info(&self, name: &str) -> Result<&TypeInfo, RepositoryError> {
        self.by_name
            .get(name)
            .map(|&idx| &self.types[idx])
            .ok_or_else(|| RepositoryError::TypeNotFound(name.to_string()))
    }

    fn supports(&self, capability: Capability) -> bool {
        !self.unsupported.contains(&capability)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTypeRepositoryBuilder {
    repository: InMemoryTypeRepository,
}

impl InMemoryTypeRepositoryBuilder {
    pub fn with_type(mut self, info: TypeInfo) -> Self {
        self.repository.insert(info);
        self
    }

    pub fn without(mut self, capability: Capability) -> Self {
        self.repository.disable(capability);
        self
    }

    pub fn build(self) -> InMemoryTypeRepository {
        self.repository
    }
}
