//! Submission domain
//!
//! Stored form entries and the read-only source they come from.

mod entity;
mod source;

pub use entity::{
    FormId, Submission, SubmissionQuery, DATE_SUBMITTED_KEY, FORM_ID_KEY, SEQ_NUM_KEY,
    SUBMITTED_AT_FORMAT,
};
pub use source::SubmissionSource;

#[cfg(test)]
pub use source::MockSubmissionSource;
