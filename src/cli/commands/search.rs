//! `search` command: run one full discovery-to-storage pass.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use crate::config::Settings;
use crate::ingest::{IngestPipeline, RelevanceFilter, RunOptions};
use crate::repository::JobRepository;
use crate::sources::{DatasetApiSource, RecordSource, RetryingSource};

pub async fn run(
    settings: &Settings,
    scope: &str,
    query: &str,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let limit = limit.unwrap_or(settings.search.max_results);
    let repo = Arc::new(JobRepository::new(&settings.database.path)?);

    let source = RetryingSource::new(
        DatasetApiSource::new(&settings.provider)?,
        settings.provider.retry_attempts,
        Duration::from_secs(2),
    );

    println!(
        "Searching {} for {} (limit {limit})",
        style(source.provider()).cyan(),
        style(query).bold()
    );
    let stream = source.discover(query, limit).await?;

    let bar = match stream.total {
        Some(total) => ProgressBar::new(total),
        None => ProgressBar::new_spinner(),
    };
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    // Ctrl-C requests record-level cancellation rather than killing the run.
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    let (tx, mut rx) = mpsc::channel::<crate::ingest::IngestEvent>(64);
    let progress_bar = bar.clone();
    let progress_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            progress_bar.set_position(event.stats.discovered);
            progress_bar.set_message(format!("{} stored", event.stats.stored));
        }
    });

    let pipeline = IngestPipeline::new(repo, RelevanceFilter::new(settings.filter.clone()));
    let options = RunOptions::new(settings.provider.name.clone(), scope)
        .with_cancel(cancel)
        .with_progress(tx);

    let result = pipeline.run(stream, options).await;
    let _ = progress_task.await;
    bar.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            let partial = e.partial();
            eprintln!(
                "{} {e}\n  progress before failure: {}",
                style("Run failed:").red(),
                partial.stats
            );
            return Err(e.into());
        }
    };

    println!("{} {}", style("Done:").green(), report.stats);
    for job in &report.stored {
        println!("  + {} at {} ({})", job.title, job.company, job.url);
    }
    if !report.rejections.is_empty() {
        println!("Top rejection reasons:");
        for (reason, count) in report.rejections.iter().take(5) {
            println!("  {count:>4}  {reason}");
        }
    }
    Ok(())
}
