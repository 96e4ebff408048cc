//! Retry decorator for record sources.
//!
//! Wraps any [`RecordSource`] and retries `discover` with exponential
//! backoff. Retrying lives here, around the collaborator, so the ingestion
//! pipeline stays free of retry logic.

use std::time::Duration;

use async_trait::async_trait;

use super::{RecordSource, RecordStream, SourceError};

pub struct RetryingSource<S> {
    inner: S,
    attempts: u32,
    base_delay: Duration,
}

impl<S: RecordSource> RetryingSource<S> {
    /// Wrap `inner`, allowing `attempts` tries total with delays of
    /// `base_delay`, doubled after each failure.
    pub fn new(inner: S, attempts: u32, base_delay: Duration) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
            base_delay,
        }
    }
}

#[async_trait]
impl<S: RecordSource> RecordSource for RetryingSource<S> {
    fn provider(&self) -> &str {
        self.inner.provider()
    }

    async fn discover(&self, query: &str, limit: usize) -> Result<RecordStream, SourceError> {
        let mut delay = self.base_delay;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.inner.discover(query, limit).await {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    if attempt >= self.attempts {
                        return Err(e);
                    }
                    tracing::warn!(attempt, error = %e, "discovery attempt failed");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
}
