//! Record sources: collaborators that produce raw posting records.
//!
//! A source delivers a finite, one-pass stream of raw records over a
//! channel. Consumed records cannot be replayed; re-running discovery means
//! calling the source again.

pub mod dataset_api;
pub mod retry;

pub use dataset_api::DatasetApiSource;
pub use retry::RetryingSource;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::models::RawRecord;

/// Failures from a record source. Fatal to an ingestion run.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("could not decode provider response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("provider credentials missing: {0}")]
    MissingCredentials(String),
}

/// Stream of raw records with an optional total count (when the provider
/// reports one up front).
pub struct RecordStream {
    pub receiver: mpsc::Receiver<Result<RawRecord, SourceError>>,
    pub total: Option<u64>,
}

impl RecordStream {
    /// Build a stream from records already in memory.
    pub fn from_records(records: Vec<RawRecord>) -> Self {
        let total = records.len() as u64;
        let (tx, rx) = mpsc::channel(records.len().max(1));
        for record in records {
            // Capacity covers every record, so try_send cannot fail.
            let _ = tx.try_send(Ok(record));
        }
        Self {
            receiver: rx,
            total: Some(total),
        }
    }

    /// Receive the next record, or `None` when the source is exhausted.
    pub async fn next(&mut self) -> Option<Result<RawRecord, SourceError>> {
        self.receiver.recv().await
    }
}

/// A provider of raw posting records.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Provider name, recorded on every posting this source yields.
    fn provider(&self) -> &str;

    /// Start a discovery run for `query`, yielding at most `limit` records.
    async fn discover(&self, query: &str, limit: usize) -> Result<RecordStream, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn from_records_yields_in_order_then_ends() {
        let mut stream = RecordStream::from_records(vec![
            json!({"url": "https://x/1"}),
            json!({"url": "https://x/2"}),
        ]);
        assert_eq!(stream.total, Some(2));

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first["url"], "https://x/1");
        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second["url"], "https://x/2");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn empty_stream_ends_immediately() {
        let mut stream = RecordStream::from_records(Vec::new());
        assert_eq!(stream.total, Some(0));
        assert!(stream.next().await.is_none());
    }
}
