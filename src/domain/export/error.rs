//! Export errors

use thiserror::Error;

use crate::domain::DomainError;

/// Failures that abort an export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{format} export is not implemented")]
    UnsupportedFormat { format: &'static str },

    #[error("Failed to fetch image '{url}': {reason}")]
    UpstreamFetch { url: String, reason: String },

    #[error("Image '{url}' could not be decoded: {reason}")]
    UnsupportedImage { url: String, reason: String },

    #[error("Scratch storage unavailable: {reason}")]
    FilesystemUnavailable { reason: String },

    #[error("Document rendering failed: {message}")]
    Render { message: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ExportError {
    pub fn upstream_fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UpstreamFetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported_image(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedImage {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn filesystem(reason: impl Into<String>) -> Self {
        Self::FilesystemUnavailable {
            reason: reason.into(),
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Short label used in metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::UpstreamFetch { .. } => "upstream_fetch",
            Self::UnsupportedImage { .. } => "unsupported_image",
            Self::FilesystemUnavailable { .. } => "filesystem",
            Self::Render { .. } => "render",
            Self::Domain(_) => "domain",
        }
    }
}
