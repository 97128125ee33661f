//! Submission sources

mod in_memory;
mod postgres;

pub use in_memory::InMemorySubmissionSource;
pub use postgres::PostgresSubmissionSource;
