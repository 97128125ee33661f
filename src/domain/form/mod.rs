//! Form schema domain

mod entity;
mod provider;

pub use entity::FieldDefinition;
pub use provider::FormSchemaProvider;

#[cfg(test)]
pub use provider::MockFormSchemaProvider;
