//! Data models for internship posting acquisition.

mod job;

pub use job::{Job, JobStatus};

/// A provider record as received, before normalization.
///
/// Providers disagree on field names and nesting, so raw records stay
/// untyped until the normalizer maps them into a [`Job`]. They are
/// discarded after normalization (the original payload is kept on the
/// job's `raw_data` field for audit).
pub type RawRecord = serde_json::Value;
