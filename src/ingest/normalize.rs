//! Normalization of raw provider records into canonical jobs.
//!
//! Each canonical field is read from a prioritized list of candidate source
//! keys; the first present, non-empty value wins. Provider shape never leaks
//! past this module.

use chrono::{DateTime, Utc};

use crate::models::{Job, JobStatus, RawRecord};

/// A record that cannot be normalized. Recoverable: the pipeline skips and
/// counts it, the run continues.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// The record is not a key/value object.
    #[error("record is not an object")]
    NotAnObject,
    /// No usable posting URL anywhere in the record.
    #[error("record has no url")]
    MissingUrl,
}

/// Candidate keys per canonical field, highest priority first. Observed
/// across the LinkedIn dataset API, SERP results, and generic providers.
const URL_KEYS: &[&str] = &["url", "link", "job_url", "href", "job_link"];
const TITLE_KEYS: &[&str] = &["job_title", "title", "name", "position"];
const COMPANY_KEYS: &[&str] = &["company", "company_name", "employer", "organization"];
const LOCATION_KEYS: &[&str] = &["location", "job_location", "city", "address"];
const DESCRIPTION_KEYS: &[&str] = &[
    "description",
    "job_summary",
    "job_description_formatted",
    "job_description",
];
const JOB_TYPE_KEYS: &[&str] = &["job_type", "job_employment_type", "employment_type"];
const EXPERIENCE_KEYS: &[&str] = &["experience_level", "job_seniority_level", "seniority"];
const REQUIREMENTS_KEYS: &[&str] = &["requirements", "job_requirements", "qualifications"];
const SALARY_KEYS: &[&str] = &["salary", "job_base_pay_range", "compensation", "pay"];
const POSTED_KEYS: &[&str] = &["posted_date", "job_posted_date", "date_posted"];
const DEADLINE_KEYS: &[&str] = &["application_deadline", "apply_by", "deadline"];

/// Sentinel for a company the provider genuinely did not name.
pub const UNKNOWN_COMPANY: &str = "Unknown";

/// Normalize a raw provider record into a [`Job`].
///
/// Pure apart from the timestamp fallback: when the record carries no
/// extraction timestamp, `extracted_at` is the moment of normalization.
/// Fails with [`NormalizeError::MissingUrl`] when no candidate URL key holds
/// a non-empty value.
pub fn normalize(record: &RawRecord, provider: &str) -> Result<Job, NormalizeError> {
    let obj = record.as_object().ok_or(NormalizeError::NotAnObject)?;
    if obj.is_empty() {
        return Err(NormalizeError::MissingUrl);
    }

    let url = first_string(record, URL_KEYS).ok_or(NormalizeError::MissingUrl)?;
    let title = first_string(record, TITLE_KEYS).unwrap_or_default();
    let company =
        first_string(record, COMPANY_KEYS).unwrap_or_else(|| UNKNOWN_COMPANY.to_string());
    let source = first_string(record, &["source"]).unwrap_or_else(|| provider.to_string());

    let extracted_at = source_timestamp(record).unwrap_or_else(Utc::now);
    let content_length = source_content_length(record)
        .unwrap_or_else(|| first_string(record, DESCRIPTION_KEYS).map_or(0, |d| d.len() as u64));

    let now = Utc::now();
    Ok(Job {
        id: Job::fingerprint(&url, &title, &company),
        url,
        title,
        company,
        source,
        location: first_string(record, LOCATION_KEYS).unwrap_or_default(),
        job_type: first_string(record, JOB_TYPE_KEYS).unwrap_or_default(),
        experience_level: first_string(record, EXPERIENCE_KEYS).unwrap_or_default(),
        description: first_string(record, DESCRIPTION_KEYS).unwrap_or_default(),
        requirements: first_string(record, REQUIREMENTS_KEYS).unwrap_or_default(),
        salary: first_string(record, SALARY_KEYS).unwrap_or_default(),
        posted_date: first_string(record, POSTED_KEYS),
        application_deadline: first_string(record, DEADLINE_KEYS),
        extracted_at,
        content_length,
        raw_data: record.clone(),
        status: JobStatus::New,
        notes: None,
        rating: None,
        applied_date: None,
        created_at: now,
        updated_at: now,
    })
}

/// Return the first non-empty string value among `keys`, trimmed.
///
/// An object value is treated as a named entity and its `name` field is
/// read instead (the LinkedIn API nests company under an employer object).
fn first_string(record: &RawRecord, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(value) = record.get(key) {
            if let Some(s) = scalar_string(value) {
                return Some(s);
            }
        }
    }
    None
}

fn scalar_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Object(obj) => obj.get("name").and_then(scalar_string),
        _ => None,
    }
}

/// Extraction timestamp from the record itself, if the provider supplied
/// one: either top-level `extracted_at` or nested under
/// `extraction_metadata.extracted_at`, RFC 3339.
fn source_timestamp(record: &RawRecord) -> Option<DateTime<Utc>> {
    let raw = first_string(record, &["extracted_at"]).or_else(|| {
        record
            .get("extraction_metadata")
            .and_then(|m| m.get("extracted_at"))
            .and_then(scalar_string)
    })?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn source_content_length(record: &RawRecord) -> Option<u64> {
    record
        .get("content_length")
        .or_else(|| {
            record
                .get("extraction_metadata")
                .and_then(|m| m.get("content_length"))
        })
        .and_then(|v| v.as_u64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_linkedin_dataset_fields() {
        let record = json!({
            "url": "https://linkedin.com/jobs/view/123",
            "job_title": "Software Engineering Intern",
            "company_name": "Acme",
            "job_location": "Remote",
            "job_summary": "Build things with us.",
            "job_employment_type": "Internship",
            "job_seniority_level": "Entry level",
            "job_posted_date": "2025-06-01",
        });

        let job = normalize(&record, "linkedin").unwrap();
        assert_eq!(job.title, "Software Engineering Intern");
        assert_eq!(job.company, "Acme");
        assert_eq!(job.location, "Remote");
        assert_eq!(job.description, "Build things with us.");
        assert_eq!(job.job_type, "Internship");
        assert_eq!(job.posted_date.as_deref(), Some("2025-06-01"));
        assert_eq!(job.source, "linkedin");
    }

    #[test]
    fn missing_url_is_malformed() {
        let record = json!({"job_title": "Intern", "company": "Acme"});
        assert_eq!(
            normalize(&record, "linkedin").unwrap_err(),
            NormalizeError::MissingUrl
        );
    }

    #[test]
    fn blank_url_is_malformed() {
        let record = json!({"url": "   ", "job_title": "Intern"});
        assert_eq!(
            normalize(&record, "linkedin").unwrap_err(),
            NormalizeError::MissingUrl
        );
    }

    #[test]
    fn non_object_is_malformed() {
        assert_eq!(
            normalize(&json!("just a string"), "x").unwrap_err(),
            NormalizeError::NotAnObject
        );
    }

    #[test]
    fn key_priority_first_nonempty_wins() {
        let record = json!({
            "url": "https://x/1",
            "job_title": "",
            "title": "Data Science Intern",
            "company": "",
            "company_name": "Globex",
        });
        let job = normalize(&record, "indeed").unwrap();
        assert_eq!(job.title, "Data Science Intern");
        assert_eq!(job.company, "Globex");
    }

    #[test]
    fn nested_employer_object() {
        let record = json!({
            "url": "https://x/2",
            "title": "Intern",
            "employer": {"name": "Initech"},
        });
        let job = normalize(&record, "indeed").unwrap();
        assert_eq!(job.company, "Initech");
    }

    #[test]
    fn company_unknown_only_when_truly_absent() {
        let record = json!({"url": "https://x/3", "title": "Intern"});
        let job = normalize(&record, "indeed").unwrap();
        assert_eq!(job.company, UNKNOWN_COMPANY);
    }

    #[test]
    fn fingerprint_stable_across_calls() {
        let record = json!({
            "url": "https://x/4",
            "title": "ML Intern",
            "company": "Acme",
        });
        let a = normalize(&record, "indeed").unwrap();
        let b = normalize(&record, "indeed").unwrap();
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn whitespace_variants_share_an_id() {
        let a = normalize(
            &json!({"url": "https://x/5", "title": "Intern ", "company": " Acme"}),
            "indeed",
        )
        .unwrap();
        let b = normalize(
            &json!({"url": "https://x/5", "title": "Intern", "company": "Acme"}),
            "indeed",
        )
        .unwrap();
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn provider_timestamp_is_preserved() {
        let record = json!({
            "url": "https://x/6",
            "title": "Intern",
            "extraction_metadata": {
                "extracted_at": "2025-05-01T12:00:00Z",
                "content_length": 2500,
            },
        });
        let job = normalize(&record, "linkedin").unwrap();
        assert_eq!(job.extracted_at.to_rfc3339(), "2025-05-01T12:00:00+00:00");
        assert_eq!(job.content_length, 2500);
    }

    #[test]
    fn content_length_falls_back_to_description() {
        let record = json!({
            "url": "https://x/7",
            "title": "Intern",
            "description": "abcdef",
        });
        let job = normalize(&record, "indeed").unwrap();
        assert_eq!(job.content_length, 6);
    }
}
