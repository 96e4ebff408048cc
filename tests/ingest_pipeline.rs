//! End-to-end pipeline tests: discovery stream in, stored postings out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;
use tokio::sync::mpsc;

use internscout::ingest::{
    FilterConfig, IngestError, IngestPipeline, RelevanceFilter, RunOptions,
};
use internscout::models::RawRecord;
use internscout::repository::JobRepository;
use internscout::sources::{RecordStream, SourceError};

fn permissive_config() -> FilterConfig {
    FilterConfig {
        title_include: vec!["intern".into()],
        title_exclude: Vec::new(),
        company_exclude: Vec::new(),
        description_exclude: Vec::new(),
        min_description_length: 0,
        tech_keywords: Vec::new(),
        quality_threshold: 0.0,
    }
}

fn pipeline(dir: &TempDir, config: FilterConfig) -> (Arc<JobRepository>, IngestPipeline) {
    let repo = Arc::new(JobRepository::new(&dir.path().join("jobs.db")).unwrap());
    let pipeline = IngestPipeline::new(repo.clone(), RelevanceFilter::new(config));
    (repo, pipeline)
}

fn options() -> RunOptions {
    RunOptions::new("linkedin", "")
}

fn stream(records: Vec<RawRecord>) -> RecordStream {
    RecordStream::from_records(records)
}

#[tokio::test]
async fn accepts_filters_and_stores() {
    let dir = TempDir::new().unwrap();
    let config = FilterConfig {
        title_include: vec!["intern".into()],
        title_exclude: vec!["senior".into(), "manager".into()],
        min_description_length: 100,
        ..permissive_config()
    };
    let (repo, pipeline) = pipeline(&dir, config);

    let records = vec![
        json!({
            "url": "https://x/1",
            "title": "Software Engineer Intern",
            "company_name": "Acme",
            "description": "A".repeat(150),
        }),
        json!({
            "url": "https://x/2",
            "title": "Senior Manager",
            "description": "B".repeat(150),
        }),
    ];

    let report = pipeline.run(stream(records), options()).await.unwrap();

    assert_eq!(report.stats.discovered, 2);
    assert_eq!(report.stats.normalized, 2);
    assert_eq!(report.stats.filtered_in, 1);
    assert_eq!(report.stats.filtered_out, 1);
    assert_eq!(report.stats.stored, 1);
    assert_eq!(report.stored.len(), 1);

    // company_name was mapped by the normalizer, not left as a sentinel.
    let stored = repo.get(&report.stored[0].id, "").unwrap().unwrap();
    assert_eq!(stored.company, "Acme");
    assert_eq!(stored.title, "Software Engineer Intern");
}

#[tokio::test]
async fn short_description_rejected_at_length_rule() {
    let dir = TempDir::new().unwrap();
    let config = FilterConfig {
        min_description_length: 100,
        ..permissive_config()
    };
    let (_repo, pipeline) = pipeline(&dir, config);

    let records = vec![json!({
        "url": "https://x/1",
        "title": "Data Science Intern",
        "company": "Acme",
        "description": "too short",
    })];
    let report = pipeline.run(stream(records), options()).await.unwrap();

    assert_eq!(report.stats.filtered_out, 1);
    assert_eq!(report.stats.stored, 0);
    // Rejected for length, not for the include rule.
    assert!(report.rejections[0].0.contains("too short"));
}

#[tokio::test]
async fn malformed_records_are_counted_and_skipped() {
    let dir = TempDir::new().unwrap();
    let (_repo, pipeline) = pipeline(&dir, permissive_config());

    let records = vec![
        json!({"title": "Intern without url", "company": "Acme"}),
        json!({"url": "https://x/1", "title": "Intern", "company": "Acme"}),
    ];
    let report = pipeline.run(stream(records), options()).await.unwrap();

    assert_eq!(report.stats.discovered, 2);
    assert_eq!(report.stats.normalized, 1);
    assert_eq!(report.stats.malformed(), 1);
    assert_eq!(report.stats.stored, 1);
}

#[tokio::test]
async fn same_batch_duplicates_keep_first_occurrence() {
    let dir = TempDir::new().unwrap();
    let (_repo, pipeline) = pipeline(&dir, permissive_config());

    // Whitespace variants normalize to the same (url, title, company).
    let records = vec![
        json!({"url": "https://x/1", "title": "Intern", "company": "Acme"}),
        json!({"url": "https://x/1", "title": "Intern ", "company": " Acme"}),
    ];
    let report = pipeline.run(stream(records), options()).await.unwrap();

    assert_eq!(report.stats.filtered_in, 2);
    assert_eq!(report.stats.duplicates, 1);
    assert_eq!(report.stats.stored, 1);
    assert_eq!(report.stored.len(), 1);
}

#[tokio::test]
async fn second_run_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let (_repo, pipeline) = pipeline(&dir, permissive_config());

    let records = || {
        vec![
            json!({"url": "https://x/1", "title": "Intern A", "company": "Acme"}),
            json!({"url": "https://x/2", "title": "Intern B", "company": "Globex"}),
        ]
    };

    let first = pipeline.run(stream(records()), options()).await.unwrap();
    assert_eq!(first.stats.stored, 2);
    assert_eq!(first.stats.duplicates, 0);

    let second = pipeline.run(stream(records()), options()).await.unwrap();
    assert_eq!(second.stats.stored, 0);
    assert_eq!(second.stats.duplicates, 2);
    assert!(second.stored.is_empty());
}

#[tokio::test]
async fn scopes_deduplicate_independently() {
    let dir = TempDir::new().unwrap();
    let (_repo, pipeline) = pipeline(&dir, permissive_config());
    let record = || vec![json!({"url": "https://x/1", "title": "Intern", "company": "Acme"})];

    let a = pipeline
        .run(stream(record()), RunOptions::new("linkedin", "session-a"))
        .await
        .unwrap();
    let b = pipeline
        .run(stream(record()), RunOptions::new("linkedin", "session-b"))
        .await
        .unwrap();

    assert_eq!(a.stats.stored, 1);
    assert_eq!(b.stats.stored, 1);
}

#[tokio::test]
async fn source_failure_surfaces_partial_stats() {
    let dir = TempDir::new().unwrap();
    let (_repo, pipeline) = pipeline(&dir, permissive_config());

    let (tx, rx) = mpsc::channel(4);
    tx.try_send(Ok(json!({"url": "https://x/1", "title": "Intern", "company": "Acme"})))
        .unwrap();
    tx.try_send(Err(SourceError::Api {
        status: 500,
        message: "provider fell over".to_string(),
    }))
    .unwrap();
    drop(tx);

    let stream = RecordStream {
        receiver: rx,
        total: None,
    };
    let err = pipeline.run(stream, options()).await.unwrap_err();
    match err {
        IngestError::Source { report, .. } => {
            assert_eq!(report.stats.stored, 1);
            assert_eq!(report.stored.len(), 1);
        }
        other => panic!("expected source failure, got {other:?}"),
    }
}

#[tokio::test]
async fn storage_failure_is_fatal_with_partial_stats() {
    let dir = TempDir::new().unwrap();
    let (repo, pipeline) = pipeline(&dir, permissive_config());

    // Replace the table with an empty read-only view: the id snapshot
    // still works, but the first insert fails and must abort the run.
    let conn = rusqlite::Connection::open(repo.database_path()).unwrap();
    conn.execute_batch(
        "DROP TABLE jobs;
         CREATE VIEW jobs (job_id, scope) AS SELECT '', '' WHERE 0;",
    )
    .unwrap();

    let records = vec![
        json!({"url": "https://x/1", "title": "Intern A", "company": "Acme"}),
        json!({"url": "https://x/2", "title": "Intern B", "company": "Globex"}),
    ];
    let err = pipeline.run(stream(records), options()).await.unwrap_err();
    match err {
        IngestError::Storage { report, .. } => {
            assert_eq!(report.stats.stored, 0);
            assert_eq!(report.stats.discovered, 1);
        }
        other => panic!("expected storage failure, got {other:?}"),
    }
}

#[tokio::test]
async fn cancellation_stops_between_records() {
    let dir = TempDir::new().unwrap();
    let (_repo, pipeline) = pipeline(&dir, permissive_config());

    let cancel = Arc::new(AtomicBool::new(true));
    let records = vec![json!({"url": "https://x/1", "title": "Intern", "company": "Acme"})];
    let report = pipeline
        .run(stream(records), options().with_cancel(cancel.clone()))
        .await
        .unwrap();

    // Cancelled before the first record was taken.
    assert_eq!(report.stats.discovered, 0);
    assert_eq!(report.stats.stored, 0);
    assert!(cancel.load(Ordering::Relaxed));
}

#[tokio::test]
async fn progress_events_track_each_record() {
    let dir = TempDir::new().unwrap();
    let (_repo, pipeline) = pipeline(&dir, permissive_config());

    let (tx, mut rx) = mpsc::channel(16);
    let records = vec![
        json!({"url": "https://x/1", "title": "Intern A", "company": "Acme"}),
        json!({"url": "https://x/2", "title": "Intern B", "company": "Globex"}),
    ];
    let report = pipeline
        .run(stream(records), options().with_progress(tx))
        .await
        .unwrap();
    assert_eq!(report.stats.stored, 2);

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].stats.discovered, 1);
    assert_eq!(events[1].stats.discovered, 2);
    assert_eq!(events[1].stats.stored, 2);
}
