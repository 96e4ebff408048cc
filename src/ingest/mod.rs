//! Ingestion: normalize, filter, deduplicate, and persist posting records.
//!
//! The pipeline consumes a one-pass record stream and decides, per record,
//! whether it becomes a stored posting. Bad records are skipped and
//! counted; only systemic failures (source, storage) abort a run, and
//! always with the partial statistics attached.

pub mod dedupe;
pub mod filter;
pub mod normalize;
mod pipeline;
mod stats;

pub use dedupe::{is_duplicate, IdIndex};
pub use filter::{FilterConfig, FilterDecision, RelevanceFilter};
pub use normalize::{normalize, NormalizeError};
pub use pipeline::{IngestEvent, IngestPipeline, IngestReport, RunOptions};
pub use stats::IngestStats;

use crate::repository::StorageError;
use crate::sources::SourceError;

/// Fatal ingestion failures. Both variants carry whatever was accomplished
/// before the failure; partial progress is never silently discarded.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("storage failure after {} stored: {source}", report.stats.stored)]
    Storage {
        source: StorageError,
        report: IngestReport,
    },
    #[error("source failure after {} stored: {source}", report.stats.stored)]
    Source {
        source: SourceError,
        report: IngestReport,
    },
}

impl IngestError {
    /// Progress made before the failure.
    pub fn partial(&self) -> &IngestReport {
        match self {
            Self::Storage { report, .. } | Self::Source { report, .. } => report,
        }
    }
}
