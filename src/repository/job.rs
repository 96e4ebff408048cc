//! Job repository for SQLite persistence.
//!
//! Ingestion only ever inserts; tracking mutations (status, notes, rating)
//! happen here on behalf of the browsing layer and never touch a posting's
//! content fields.
//!
//! Storage is scoped: the same posting may be stored once per scope key
//! (session), and duplicate detection operates within a single scope.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{connect, parse_datetime, parse_datetime_opt, Result, StorageError};
use crate::models::{Job, JobStatus};

/// Scope key used when the caller does not isolate sessions.
pub const DEFAULT_SCOPE: &str = "";

/// SQLite-backed job repository.
pub struct JobRepository {
    db_path: PathBuf,
}

impl JobRepository {
    /// Open a repository, creating the schema if needed.
    pub fn new(db_path: &Path) -> Result<Self> {
        let repo = Self {
            db_path: db_path.to_path_buf(),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        connect(&self.db_path)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                job_id TEXT NOT NULL,
                scope TEXT NOT NULL DEFAULT '',
                url TEXT NOT NULL,
                title TEXT NOT NULL,
                company TEXT NOT NULL,
                source TEXT NOT NULL,
                location TEXT NOT NULL DEFAULT '',
                job_type TEXT NOT NULL DEFAULT '',
                experience_level TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                requirements TEXT NOT NULL DEFAULT '',
                salary TEXT NOT NULL DEFAULT '',
                posted_date TEXT,
                application_deadline TEXT,
                extracted_at TEXT NOT NULL,
                content_length INTEGER NOT NULL DEFAULT 0,
                raw_data TEXT NOT NULL DEFAULT '{}',
                status TEXT NOT NULL DEFAULT 'new',
                notes TEXT,
                rating INTEGER,
                applied_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(job_id, scope)
            );
            CREATE INDEX IF NOT EXISTS idx_jobs_scope ON jobs (scope);
            CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs (status);
            CREATE INDEX IF NOT EXISTS idx_jobs_company ON jobs (company);
            CREATE INDEX IF NOT EXISTS idx_jobs_extracted_at ON jobs (extracted_at);",
        )?;
        Ok(())
    }

    /// All fingerprints stored under `scope`, for duplicate detection.
    pub fn existing_ids(&self, scope: &str) -> Result<HashSet<String>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT job_id FROM jobs WHERE scope = ?")?;
        let ids = stmt
            .query_map(params![scope], |row| row.get::<_, String>(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(ids)
    }

    /// Insert a posting. Insert-only: an existing (job_id, scope) pair is an
    /// error, since the pipeline deduplicates before persisting.
    pub fn insert(&self, job: &Job, scope: &str) -> Result<()> {
        let conn = self.connect()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO jobs (
                job_id, scope, url, title, company, source, location,
                job_type, experience_level, description, requirements,
                salary, posted_date, application_deadline, extracted_at,
                content_length, raw_data, status, notes, rating,
                applied_date, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                      ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)",
            params![
                job.id,
                scope,
                job.url,
                job.title,
                job.company,
                job.source,
                job.location,
                job.job_type,
                job.experience_level,
                job.description,
                job.requirements,
                job.salary,
                job.posted_date,
                job.application_deadline,
                job.extracted_at.to_rfc3339(),
                job.content_length,
                job.raw_data.to_string(),
                job.status.as_str(),
                job.notes,
                job.rating,
                job.applied_date.map(|d| d.to_rfc3339()),
                job.created_at.to_rfc3339(),
                job.updated_at.to_rfc3339(),
            ],
        )?;
        if inserted == 0 {
            return Err(StorageError::DuplicateId(job.id.clone()));
        }
        Ok(())
    }

    /// Fetch a posting by fingerprint within a scope.
    pub fn get(&self, job_id: &str, scope: &str) -> Result<Option<Job>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM jobs WHERE job_id = ? AND scope = ?")?;
        let job = stmt
            .query_row(params![job_id, scope], row_to_job)
            .optional()?;
        Ok(job)
    }

    /// List postings for a scope, newest first, optionally filtered by
    /// status.
    pub fn list(
        &self,
        scope: &str,
        status: Option<JobStatus>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Job>> {
        let conn = self.connect()?;
        let jobs = match status {
            Some(status) => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM jobs WHERE scope = ? AND status = ?
                     ORDER BY extracted_at DESC LIMIT ? OFFSET ?",
                )?;
                let rows = stmt.query_map(
                    params![scope, status.as_str(), limit as i64, offset as i64],
                    row_to_job,
                )?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM jobs WHERE scope = ?
                     ORDER BY extracted_at DESC LIMIT ? OFFSET ?",
                )?;
                let rows =
                    stmt.query_map(params![scope, limit as i64, offset as i64], row_to_job)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
        };
        Ok(jobs)
    }

    /// Update tracking status. Moving to `applied` records the application
    /// date. Returns false when the posting does not exist.
    pub fn update_status(
        &self,
        job_id: &str,
        scope: &str,
        status: JobStatus,
        notes: Option<&str>,
    ) -> Result<bool> {
        let conn = self.connect()?;
        let now = Utc::now().to_rfc3339();
        let applied_date = (status == JobStatus::Applied).then(|| now.clone());
        let updated = conn.execute(
            "UPDATE jobs SET
                status = ?1,
                notes = COALESCE(?2, notes),
                applied_date = COALESCE(?3, applied_date),
                updated_at = ?4
             WHERE job_id = ?5 AND scope = ?6",
            params![status.as_str(), notes, applied_date, now, job_id, scope],
        )?;
        Ok(updated > 0)
    }

    /// Set the user rating (1-5).
    pub fn set_rating(&self, job_id: &str, scope: &str, rating: u8) -> Result<bool> {
        let conn = self.connect()?;
        let updated = conn.execute(
            "UPDATE jobs SET rating = ?1, updated_at = ?2 WHERE job_id = ?3 AND scope = ?4",
            params![rating, Utc::now().to_rfc3339(), job_id, scope],
        )?;
        Ok(updated > 0)
    }

    /// Replace the free-form notes.
    pub fn set_notes(&self, job_id: &str, scope: &str, notes: &str) -> Result<bool> {
        let conn = self.connect()?;
        let updated = conn.execute(
            "UPDATE jobs SET notes = ?1, updated_at = ?2 WHERE job_id = ?3 AND scope = ?4",
            params![notes, Utc::now().to_rfc3339(), job_id, scope],
        )?;
        Ok(updated > 0)
    }

    /// Posting counts per tracking status for a scope.
    pub fn counts_by_status(&self, scope: &str) -> Result<Vec<(String, u64)>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT status, COUNT(*) FROM jobs WHERE scope = ?
             GROUP BY status ORDER BY COUNT(*) DESC",
        )?;
        let counts = stmt
            .query_map(params![scope], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(counts)
    }
}

fn row_to_job(row: &Row) -> rusqlite::Result<Job> {
    let raw: String = row.get("raw_data")?;
    let status: String = row.get("status")?;
    let extracted_at: String = row.get("extracted_at")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    Ok(Job {
        id: row.get("job_id")?,
        url: row.get("url")?,
        title: row.get("title")?,
        company: row.get("company")?,
        source: row.get("source")?,
        location: row.get("location")?,
        job_type: row.get("job_type")?,
        experience_level: row.get("experience_level")?,
        description: row.get("description")?,
        requirements: row.get("requirements")?,
        salary: row.get("salary")?,
        posted_date: row.get("posted_date")?,
        application_deadline: row.get("application_deadline")?,
        extracted_at: parse_datetime(&extracted_at),
        content_length: row.get::<_, i64>("content_length")? as u64,
        raw_data: serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null),
        status: JobStatus::from_str(&status).unwrap_or(JobStatus::New),
        notes: row.get("notes")?,
        rating: row.get("rating")?,
        applied_date: parse_datetime_opt(row.get("applied_date")?),
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}
