//! Job posting models.
//!
//! Postings are identified by a content fingerprint over (url, title,
//! company), allowing the same logical posting to be recognized across
//! repeated searches regardless of which provider returned it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Application-tracking status of a stored job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    New,
    Interested,
    Applied,
    Interview,
    Rejected,
    Hidden,
    NotInterested,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Interested => "interested",
            Self::Applied => "applied",
            Self::Interview => "interview",
            Self::Rejected => "rejected",
            Self::Hidden => "hidden",
            Self::NotInterested => "not_interested",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "interested" => Some(Self::Interested),
            "applied" => Some(Self::Applied),
            "interview" => Some(Self::Interview),
            "rejected" => Some(Self::Rejected),
            "hidden" => Some(Self::Hidden),
            "not_interested" => Some(Self::NotInterested),
            _ => None,
        }
    }
}

/// A normalized job posting.
///
/// Created by the normalizer from a raw provider record and persisted once
/// if it survives filtering and deduplication. After insertion the posting's
/// content fields are immutable; only the tracking fields (status, notes,
/// rating) change, and only through the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Fingerprint of (url, title, company); unique per scope.
    pub id: String,
    /// Canonical link to the posting.
    pub url: String,
    /// Posting title.
    pub title: String,
    /// Hiring company. `"Unknown"` only when the provider gave nothing.
    pub company: String,
    /// Provider that supplied the record (e.g., "linkedin").
    pub source: String,
    pub location: String,
    pub job_type: String,
    pub experience_level: String,
    pub description: String,
    pub requirements: String,
    pub salary: String,
    pub posted_date: Option<String>,
    pub application_deadline: Option<String>,
    /// When the record was normalized (or the provider's own timestamp).
    pub extracted_at: DateTime<Utc>,
    /// Size of the fetched content, as reported by the provider.
    pub content_length: u64,
    /// Original provider payload, preserved for audit.
    pub raw_data: serde_json::Value,
    /// Current tracking status.
    pub status: JobStatus,
    pub notes: Option<String>,
    /// User rating, 1-5.
    pub rating: Option<u8>,
    pub applied_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Compute the identity fingerprint for a posting.
    ///
    /// SHA-256 over `url|title|company`, hex encoded. The same triple always
    /// produces the same id; distinct triples practically never collide.
    pub fn fingerprint(url: &str, title: &str, company: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        hasher.update(b"|");
        hasher.update(title.as_bytes());
        hasher.update(b"|");
        hasher.update(company.as_bytes());
        hex::encode(hasher.finalize())
    }
}
