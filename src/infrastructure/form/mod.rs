//! Form schema providers

mod in_memory;
mod postgres;

pub use in_memory::InMemoryFormSchemaProvider;
pub use postgres::PostgresFormSchemaProvider;
