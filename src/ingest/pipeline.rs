//! The ingestion pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use super::dedupe::{self, IdIndex};
use super::filter::RelevanceFilter;
use super::normalize::normalize;
use super::stats::IngestStats;
use super::IngestError;
use crate::models::Job;
use crate::repository::JobRepository;
use crate::sources::RecordStream;

/// Options for one pipeline run.
#[derive(Clone)]
pub struct RunOptions {
    /// Provider name recorded on normalized postings.
    pub provider: String,
    /// Storage scope (session) for deduplication and inserts.
    pub scope: String,
    /// Checked between records; when set, the run stops and reports what it
    /// accomplished. Never interrupts a record mid-flight.
    pub cancel: Arc<AtomicBool>,
    /// Incremental progress, one event per record processed. Best-effort:
    /// a full or dropped receiver never blocks the run.
    pub progress: Option<mpsc::Sender<IngestEvent>>,
}

impl RunOptions {
    pub fn new(provider: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            scope: scope.into(),
            cancel: Arc::new(AtomicBool::new(false)),
            progress: None,
        }
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<IngestEvent>) -> Self {
        self.progress = Some(tx);
        self
    }
}

/// Progress event emitted after each record.
#[derive(Debug, Clone)]
pub struct IngestEvent {
    pub stats: IngestStats,
}

/// Result of a completed (or cancelled) run.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub stats: IngestStats,
    /// Postings stored this run, in discovery order.
    pub stored: Vec<Job>,
    /// Rejection reasons tallied as (reason, count), most frequent first.
    pub rejections: Vec<(String, u64)>,
}

/// Orchestrates one discovery-to-storage run per call to [`run`].
///
/// Holds no state between runs; everything run-scoped lives in locals, so
/// independent pipelines (other sessions, tests) never interfere.
///
/// [`run`]: IngestPipeline::run
pub struct IngestPipeline {
    repo: Arc<JobRepository>,
    filter: RelevanceFilter,
}

impl IngestPipeline {
    pub fn new(repo: Arc<JobRepository>, filter: RelevanceFilter) -> Self {
        Self { repo, filter }
    }

    /// Drive `stream` to completion.
    ///
    /// Per record: normalize, filter, deduplicate, insert. Malformed and
    /// rejected records are counted and skipped. A storage or source
    /// failure ends the run with partial progress attached to the error.
    pub async fn run(
        &self,
        mut stream: RecordStream,
        options: RunOptions,
    ) -> Result<IngestReport, IngestError> {
        for warning in self.filter.config().warnings() {
            tracing::warn!(%warning, "filter configuration");
        }

        let existing = match self.repo.existing_ids(&options.scope) {
            Ok(ids) => ids,
            Err(e) => {
                return Err(IngestError::Storage {
                    source: e,
                    report: IngestReport::default(),
                })
            }
        };
        let mut index = IdIndex::new(existing);
        let mut stats = IngestStats::default();
        let mut stored = Vec::new();
        let mut rejection_tally: Vec<(String, u64)> = Vec::new();

        loop {
            if options.cancel.load(Ordering::Relaxed) {
                tracing::info!(%stats, "ingestion cancelled");
                break;
            }

            let record = match stream.next().await {
                Some(Ok(record)) => record,
                Some(Err(e)) => {
                    return Err(IngestError::Source {
                        source: e,
                        report: finish(stats, stored, rejection_tally),
                    });
                }
                None => break,
            };
            stats.discovered += 1;

            let job = match normalize(&record, &options.provider) {
                Ok(job) => job,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping malformed record");
                    self.emit(&options, stats);
                    continue;
                }
            };
            stats.normalized += 1;

            let decision = self.filter.evaluate(&job);
            if !decision.accepted {
                stats.filtered_out += 1;
                if let Some(reason) = decision.rejection() {
                    tracing::debug!(title = %job.title, %reason, "posting rejected");
                    tally(&mut rejection_tally, reason);
                }
                self.emit(&options, stats);
                continue;
            }
            stats.filtered_in += 1;

            if dedupe::is_duplicate(&job, &index) {
                stats.duplicates += 1;
                tracing::debug!(title = %job.title, "duplicate posting skipped");
                self.emit(&options, stats);
                continue;
            }

            if let Err(e) = self.repo.insert(&job, &options.scope) {
                return Err(IngestError::Storage {
                    source: e,
                    report: finish(stats, stored, rejection_tally),
                });
            }
            stats.stored += 1;
            index.insert(&job.id);
            tracing::info!(title = %job.title, company = %job.company, "stored posting");
            stored.push(job);
            self.emit(&options, stats);
        }

        tracing::info!(%stats, "ingestion run complete");
        Ok(finish(stats, stored, rejection_tally))
    }

    fn emit(&self, options: &RunOptions, stats: IngestStats) {
        if let Some(tx) = &options.progress {
            let _ = tx.try_send(IngestEvent { stats });
        }
    }
}

fn tally(tally: &mut Vec<(String, u64)>, reason: &str) {
    match tally.iter_mut().find(|(r, _)| r == reason) {
        Some((_, count)) => *count += 1,
        None => tally.push((reason.to_string(), 1)),
    }
}

fn finish(
    stats: IngestStats,
    stored: Vec<Job>,
    mut rejections: Vec<(String, u64)>,
) -> IngestReport {
    rejections.sort_by(|a, b| b.1.cmp(&a.1));
    IngestReport {
        stats,
        stored,
        rejections,
    }
}
