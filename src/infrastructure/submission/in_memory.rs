//! In-memory submission source

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::submission::{Submission, SubmissionQuery, SubmissionSource};
use crate::domain::DomainError;

/// Submissions held in memory, in insertion order
#[derive(Debug, Default)]
pub struct InMemorySubmissionSource {
    submissions: RwLock<Vec<Submission>>,
}

impl InMemorySubmissionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submissions(submissions: Vec<Submission>) -> Self {
        Self {
            submissions: RwLock::new(submissions),
        }
    }

    /// Append a submission; storage order is insertion order
    pub fn push(&self, submission: Submission) -> Result<(), DomainError> {
        self.submissions
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire lock: {}", e)))?
            .push(submission);
        Ok(())
    }
}

#[async_trait]
impl SubmissionSource for InMemorySubmissionSource {
    async fn query(&self, query: &SubmissionQuery) -> Result<Vec<Submission>, DomainError> {
        let submissions = self
            .submissions
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire lock: {}", e)))?;

        Ok(submissions
            .iter()
            .filter(|s| query.matches(s))
            .cloned()
            .collect())
    }
}
