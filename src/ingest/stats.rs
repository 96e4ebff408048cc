//! Per-run ingestion counters.

use serde::Serialize;

/// Counters for one ingestion run. Mutated only by the pipeline while the
/// run is active; returned to the caller when it finishes (or fails).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Records received from the source, malformed ones included.
    pub discovered: u64,
    /// Records that normalized successfully.
    pub normalized: u64,
    /// Records accepted by the relevance filter.
    pub filtered_in: u64,
    /// Records rejected by the relevance filter.
    pub filtered_out: u64,
    /// Records whose fingerprint was already stored (or already seen
    /// earlier in the same batch).
    pub duplicates: u64,
    /// Records persisted this run.
    pub stored: u64,
}

impl IngestStats {
    /// Records dropped because they could not be normalized.
    pub fn malformed(&self) -> u64 {
        self.discovered - self.normalized
    }
}

impl std::fmt::Display for IngestStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} discovered, {} normalized, {} accepted, {} rejected, {} duplicates, {} stored",
            self.discovered,
            self.normalized,
            self.filtered_in,
            self.filtered_out,
            self.duplicates,
            self.stored
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_is_the_gap_between_discovered_and_normalized() {
        let stats = IngestStats {
            discovered: 5,
            normalized: 3,
            ..Default::default()
        };
        assert_eq!(stats.malformed(), 2);
    }

    #[test]
    fn display_summarizes_all_counters() {
        let stats = IngestStats {
            discovered: 4,
            normalized: 4,
            filtered_in: 2,
            filtered_out: 2,
            duplicates: 1,
            stored: 1,
        };
        assert_eq!(
            stats.to_string(),
            "4 discovered, 4 normalized, 2 accepted, 2 rejected, 1 duplicates, 1 stored"
        );
    }
}
