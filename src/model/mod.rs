mod component;
mod container;

pub use component::{
    CodeElement, CodeElementRole, Component, ComponentId, Relationship, simple_name,
};
pub use container::{Container, DEFAULT_RELATIONSHIP_DESCRIPTION, ModelError};
