//! Submission source trait

use async_trait::async_trait;

use crate::domain::DomainError;

use super::entity::{Submission, SubmissionQuery};

/// Read-only access to stored submissions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionSource: Send + Sync + std::fmt::Debug {
    /// Submissions matching the query
    ///
    /// Implementations return them in storage order; ordering by date is
    /// applied by the reader.
    async fn query(&self, query: &SubmissionQuery) -> Result<Vec<Submission>, DomainError>;

    /// Cheap connectivity probe used by readiness checks
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
