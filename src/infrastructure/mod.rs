//! Infrastructure layer - Storage, sources and export implementations

pub mod api_key;
pub mod export;
pub mod fixtures;
pub mod form;
pub mod logging;
pub mod observability;
pub mod services;
pub mod storage;
pub mod submission;
