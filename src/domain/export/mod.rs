//! Export domain
//!
//! Formats, the resolved label map, errors and results of exporting
//! submissions.

mod error;
mod fetcher;
mod field_map;
mod format;
mod output;

pub use error::ExportError;
pub use fetcher::ImageFetcher;
pub use field_map::{humanize_key, ResolvedFieldMap};
pub use format::ExportFormat;
pub use output::{DocumentBody, ExportOutput, DOCUMENT_CONTENT_TYPE, DOCUMENT_FILE_NAME};

#[cfg(test)]
pub use fetcher::MockImageFetcher;
