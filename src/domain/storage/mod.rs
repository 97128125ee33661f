//! Storage domain - Generic storage abstraction layer

mod entity;
mod option;
mod repository;

pub use entity::{StorageEntity, StorageKey};
pub use option::{OptionName, StoredOption};
pub use repository::Storage;
