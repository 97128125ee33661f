//! Remote image fetching

use async_trait::async_trait;
use bytes::Bytes;

use super::error::ExportError;

/// Retrieves image bytes referenced from submissions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageFetcher: Send + Sync + std::fmt::Debug {
    /// Fetch the body at `url`; any network error or non-success status fails
    async fn fetch(&self, url: &str) -> Result<Bytes, ExportError>;
}
