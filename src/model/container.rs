use super::component::{CodeElementRole, Component, ComponentId, Relationship};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::ops::Index;
use thiserror::Error;

pub const DEFAULT_RELATIONSHIP_DESCRIPTION: &str = "Uses";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("a component named {name} already exists for type {existing_type}")]
    DuplicateName { name: String, existing_type: String },
}

/// A deployable unit whose components are discovered from code.
///
/// The container owns its components and the index from every attributed type
/// (primary or supporting) to the component that owns it.
#[derive(Debug, Clone, Serialize)]
pub struct Container {
    pub name: String,
    pub description: String,
    pub technology: String,
    components: Vec<Component>,
    #[serde(skip)]
    type_index: HashMap<String, ComponentId>,
    /// Components that gave up a code element since the last resolution pass.
    #[serde(skip)]
    detached: BTreeSet<ComponentId>,
}

impl Container {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        technology: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            technology: technology.into(),
            components: Vec::new(),
            type_index: HashMap::new(),
            detached: BTreeSet::new(),
        }
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.0)
    }

    /// Register a component for `primary_type`.
    ///
    /// Registering the same primary type again is a no-op that returns the
    /// existing component. A type held as a supporting element of another
    /// component is moved out of it and becomes the new component's primary
    /// element.
    pub fn add_component(
        &mut self,
        name: &str,
        primary_type: &str,
        description: &str,
        technology: &str,
    ) -> Result<ComponentId, ModelError> {
        if let Some(existing) = self.get_component_of_type(primary_type) {
            return Ok(existing.id);
        }

        if let Some(existing) = self.get_component_with_name(name) {
            return Err(ModelError::DuplicateName {
                name: name.to_string(),
                existing_type: existing.type_name.clone(),
            });
        }

        if let Some(previous) = self.type_index.remove(primary_type) {
            self.components[previous.0]
                .code
                .retain(|element| element.type_name != primary_type);
            self.detached.insert(previous);
        }

        let id = ComponentId(self.components.len());
        self.components.push(Component::new(
            id,
            name.to_string(),
            primary_type.to_string(),
            description.to_string(),
            technology.to_string(),
        ));
        self.type_index.insert(primary_type.to_string(), id);
        Ok(id)
    }

    /// Attribute a type to a component. Returns false when the type is already
    /// owned by any component, including this one.
    pub fn add_code_element(
        &mut self,
        id: ComponentId,
        type_name: &str,
        role: CodeElementRole,
    ) -> bool {
        if id.0 >= self.components.len() || self.type_index.contains_key(type_name) {
            return false;
        }

        let component = &mut self.components[id.0];
        component.code.push(super::CodeElement {
            type_name: type_name.to_string(),
            role,
        });
        self.type_index.insert(type_name.to_string(), id);
        true
    }

    pub fn get_component_with_name(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Look up a component by its primary type.
    pub fn get_component_of_type(&self, type_name: &str) -> Option<&Component> {
        self.component_owning(type_name)
            .map(|id| &self.components[id.0])
            .filter(|c| c.type_name == type_name)
    }

    /// The component that owns `type_name` as a primary or supporting element.
    pub fn component_owning(&self, type_name: &str) -> Option<ComponentId> {
        self.type_index.get(type_name).copied()
    }

    pub fn is_primary_type(&self, type_name: &str) -> bool {
        self.get_component_of_type(type_name).is_some()
    }

    /// Add a relationship unless it is a self edge or the ordered pair is
    /// already connected. Returns whether a relationship was added.
    pub fn add_relationship(
        &mut self,
        source: ComponentId,
        destination: ComponentId,
        description: &str,
    ) -> bool {
        if source == destination
            || source.0 >= self.components.len()
            || destination.0 >= self.components.len()
        {
            return false;
        }

        let component = &mut self.components[source.0];
        if component.uses(destination) {
            return false;
        }

        component.relationships.push(Relationship {
            destination,
            description: description.to_string(),
        });
        true
    }

    /// Drop the relationships of `source` whose destination `keep` rejects.
    /// Returns how many were removed.
    pub(crate) fn retain_relationships(
        &mut self,
        source: ComponentId,
        keep: impl Fn(ComponentId) -> bool,
    ) -> usize {
        let Some(component) = self.components.get_mut(source.0) else {
            return 0;
        };
        let before = component.relationships.len();
        component.relationships.retain(|r| keep(r.destination));
        before - component.relationships.len()
    }

    /// Components whose code shrank since the last call.
    pub(crate) fn take_detached(&mut self) -> BTreeSet<ComponentId> {
        std::mem::take(&mut self.detached)
    }

    pub fn relationship_count(&self) -> usize {
        self.components.iter().map(|c| c.relationships.len()).sum()
    }

    /// All relationships as (source, relationship) pairs.
    pub fn relationships(&self) -> impl Iterator<Item = (ComponentId, &Relationship)> {
        self.components
            .iter()
            .flat_map(|c| c.relationships.iter().map(move |r| (c.id, r)))
    }

    pub fn dependency_graph(&self) -> DiGraph<ComponentId, ()> {
        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = self
            .components
            .iter()
            .map(|c| graph.add_node(c.id))
            .collect();

        for (source, relationship) in self.relationships() {
            graph.add_edge(nodes[source.0], nodes[relationship.destination.0], ());
        }

        graph
    }

    /// Groups of components that depend on each other, directly or transitively.
    pub fn cycles(&self) -> Vec<Vec<ComponentId>> {
        let graph = self.dependency_graph();
        tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| {
                let mut ids: Vec<_> = scc.iter().map(|idx| graph[*idx]).collect();
                ids.sort();
                ids
            })
            .collect()
    }
}

impl Index<ComponentId> for Container {
    type Output = Component;

    fn index(&self, id: ComponentId) -> &Self::Output {
        &self.components[id.0]
    }
}
