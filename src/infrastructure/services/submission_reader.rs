//! Submission reader - ordered submissions for one form

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::submission::{FormId, Submission, SubmissionQuery, SubmissionSource};
use crate::domain::DomainError;

/// Fetches submissions for a form within an optional inclusive date window
#[derive(Debug, Clone)]
pub struct SubmissionReader {
    source: Arc<dyn SubmissionSource>,
}

impl SubmissionReader {
    pub fn new(source: Arc<dyn SubmissionSource>) -> Self {
        Self { source }
    }

    /// Submissions ordered by date, ties kept in storage order
    pub async fn list(
        &self,
        form_id: FormId,
        begin_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Submission>, DomainError> {
        let query = SubmissionQuery::for_form(form_id).with_dates(begin_date, end_date);

        let mut submissions = self.source.query(&query).await?;
        submissions.sort_by_key(|s| s.submitted_at);

        debug!(
            form_id = %form_id,
            begin = ?begin_date,
            end = ?end_date,
            count = submissions.len(),
            "Read submissions"
        );

        Ok(submissions)
    }

    /// Verify the underlying source is reachable
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.source.ping().await
    }
}
