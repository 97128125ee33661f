//! Export results

use bytes::Bytes;

use crate::domain::submission::Submission;

/// Content type of rendered documents
pub const DOCUMENT_CONTENT_TYPE: &str = "application/pdf";

/// File name offered for rendered documents
pub const DOCUMENT_FILE_NAME: &str = "form-submissions.pdf";

/// A fully rendered document
///
/// Sending it ends the response; nothing else is written after it.
#[derive(Debug, Clone)]
pub struct DocumentBody {
    pub bytes: Bytes,
    pub content_type: &'static str,
    pub file_name: &'static str,
}

impl DocumentBody {
    pub fn pdf(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: DOCUMENT_CONTENT_TYPE,
            file_name: DOCUMENT_FILE_NAME,
        }
    }
}

/// Result of rendering submissions in a requested format
#[derive(Debug, Clone)]
pub enum ExportOutput {
    /// Submissions passed through for JSON serialization
    Structured(Vec<Submission>),
    /// Terminal document body
    Document(DocumentBody),
}
