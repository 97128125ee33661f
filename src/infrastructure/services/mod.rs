//! Infrastructure services

mod submission_reader;

pub use submission_reader::SubmissionReader;
