//! Relevance filtering for normalized job postings.
//!
//! Rules are evaluated in a fixed order and short-circuit on the first
//! rejection. The decision records every rule that ran, so a run summary
//! can explain exactly why postings were kept or dropped.

use serde::{Deserialize, Serialize};

use crate::models::Job;

/// Filter configuration. All criteria are explicit data; the defaults here
/// are the shipped stock lists, not hidden behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Title must match at least one of these (case-insensitive substring).
    /// When empty, `tech_keywords` serves as the include set instead.
    pub title_include: Vec<String>,
    /// Title matching any of these is rejected.
    pub title_exclude: Vec<String>,
    /// Companies to skip entirely.
    pub company_exclude: Vec<String>,
    /// Description matching any of these is rejected.
    pub description_exclude: Vec<String>,
    /// Minimum description length. Empty descriptions are exempt: a missing
    /// description means "unknown", not "too short".
    pub min_description_length: usize,
    /// Secondary include set; also feeds the quality score.
    pub tech_keywords: Vec<String>,
    /// Quality score cutoff in [0, 1].
    pub quality_threshold: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            title_include: [
                "intern",
                "internship",
                "co-op",
                "coop",
                "summer",
                "student",
                "trainee",
                "graduate program",
                "entry level",
            ]
            .map(String::from)
            .to_vec(),
            title_exclude: [
                "senior",
                "principal",
                "lead",
                "manager",
                "director",
                "head of",
                "vice president",
                "chief",
                "architect",
                "staff engineer",
            ]
            .map(String::from)
            .to_vec(),
            company_exclude: Vec::new(),
            description_exclude: [
                "security clearance required",
                "top secret clearance",
                "minimum 5 years",
                "minimum 3 years",
                "senior level",
                "expert level",
            ]
            .map(String::from)
            .to_vec(),
            min_description_length: 100,
            tech_keywords: [
                "software",
                "programming",
                "development",
                "engineer",
                "developer",
                "python",
                "java",
                "javascript",
                "react",
                "frontend",
                "backend",
                "full stack",
                "data science",
                "machine learning",
            ]
            .map(String::from)
            .to_vec(),
            quality_threshold: 0.3,
        }
    }
}

impl FilterConfig {
    /// Sanity-check the configuration.
    ///
    /// Contradictory configurations are still valid (a filter that rejects
    /// everything is allowed), so this returns warnings rather than errors.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.title_include.is_empty() && self.tech_keywords.is_empty() {
            warnings.push(
                "no title include terms and no tech keywords configured; \
                 every posting will be rejected"
                    .to_string(),
            );
        }
        if !(0.0..=1.0).contains(&self.quality_threshold) {
            warnings.push(format!(
                "quality threshold {} is outside [0, 1]",
                self.quality_threshold
            ));
        }
        warnings
    }
}

/// Outcome of filtering one posting. Transient, never persisted.
#[derive(Debug, Clone)]
pub struct FilterDecision {
    pub accepted: bool,
    /// One entry per rule evaluated, in evaluation order. When rejected,
    /// the last entry names the failing rule.
    pub reasons: Vec<String>,
}

impl FilterDecision {
    /// The failing rule's reason, if the posting was rejected.
    pub fn rejection(&self) -> Option<&str> {
        (!self.accepted).then(|| self.reasons.last().map(String::as_str).unwrap_or(""))
    }
}

/// Relevance filter with terms pre-lowered for case-insensitive matching.
///
/// Pure and deterministic: the same posting and configuration always yield
/// the same decision.
pub struct RelevanceFilter {
    config: FilterConfig,
    title_include: Vec<String>,
    title_exclude: Vec<String>,
    company_exclude: Vec<String>,
    description_exclude: Vec<String>,
    tech_keywords: Vec<String>,
}

fn lowered(terms: &[String]) -> Vec<String> {
    terms.iter().map(|t| t.to_lowercase()).collect()
}

impl RelevanceFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self {
            title_include: lowered(&config.title_include),
            title_exclude: lowered(&config.title_exclude),
            company_exclude: lowered(&config.company_exclude),
            description_exclude: lowered(&config.description_exclude),
            tech_keywords: lowered(&config.tech_keywords),
            config,
        }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Evaluate a posting against the configured rules.
    pub fn evaluate(&self, job: &Job) -> FilterDecision {
        let title = job.title.to_lowercase();
        let company = job.company.to_lowercase();
        let description = job.description.to_lowercase();
        let mut reasons = Vec::new();

        // Rule 1: title must match an include term (or a tech keyword when
        // no include terms are configured).
        let include_terms = if self.title_include.is_empty() {
            &self.tech_keywords
        } else {
            &self.title_include
        };
        let include_matches = include_terms.iter().filter(|t| title.contains(*t)).count();
        if include_matches == 0 {
            reasons.push("title matches no include terms".to_string());
            return FilterDecision {
                accepted: false,
                reasons,
            };
        }
        reasons.push(format!("title matches {include_matches} include term(s)"));

        // Rule 2: excluded title terms.
        if let Some(term) = self.title_exclude.iter().find(|t| title.contains(*t)) {
            reasons.push(format!("title contains excluded term \"{term}\""));
            return FilterDecision {
                accepted: false,
                reasons,
            };
        }
        reasons.push("title passes exclusions".to_string());

        // Rule 2b: excluded companies (substring in either direction, as
        // listings abbreviate legal names).
        if let Some(term) = self
            .company_exclude
            .iter()
            .find(|t| company.contains(*t) || t.contains(&company))
        {
            reasons.push(format!("company matches exclusion \"{term}\""));
            return FilterDecision {
                accepted: false,
                reasons,
            };
        }

        // Rule 3: minimum description length. Empty descriptions are
        // unknown, not short, and pass through.
        if !description.is_empty() && description.len() < self.config.min_description_length {
            reasons.push(format!(
                "description too short: {} < {} chars",
                description.len(),
                self.config.min_description_length
            ));
            return FilterDecision {
                accepted: false,
                reasons,
            };
        }
        reasons.push("description length ok".to_string());

        // Rule 4: excluded description terms.
        if let Some(term) = self
            .description_exclude
            .iter()
            .find(|t| description.contains(*t))
        {
            reasons.push(format!("description contains excluded term \"{term}\""));
            return FilterDecision {
                accepted: false,
                reasons,
            };
        }

        // Rule 5: quality score cutoff.
        let score = self.quality_score(&title, &description, include_matches);
        reasons.push(format!("quality score {score:.2}"));
        if score < self.config.quality_threshold {
            reasons.push(format!(
                "quality score {score:.2} below threshold {:.2}",
                self.config.quality_threshold
            ));
            return FilterDecision {
                accepted: false,
                reasons,
            };
        }

        FilterDecision {
            accepted: true,
            reasons,
        }
    }

    /// Weighted quality score in [0, 1].
    ///
    /// 0.4 — include-term matches in the title (saturates at two terms);
    /// 0.3 — presence of any tech keyword in title or description (neutral
    ///       when no tech keywords are configured);
    /// 0.3 — description length bucket, with empty treated as unknown.
    fn quality_score(&self, title: &str, description: &str, include_matches: usize) -> f64 {
        let title_component = (include_matches.min(2) as f64) / 2.0;

        let tech_component = if self.tech_keywords.is_empty() {
            1.0
        } else {
            let haystack = format!("{title} {description}");
            self.tech_keywords
                .iter()
                .any(|t| haystack.contains(t))
                .then_some(1.0)
                .unwrap_or(0.0)
        };

        let len = description.len();
        let length_component = if len == 0 {
            0.5
        } else if len >= 1200 {
            1.0
        } else if len >= 600 {
            0.75
        } else if len >= self.config.min_description_length {
            0.5
        } else {
            0.25
        };

        0.4 * title_component + 0.3 * tech_component + 0.3 * length_component
    }
}
