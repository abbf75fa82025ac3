//! Participants and their citation counts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Placeholder name used when a talk has no known presenter.
///
/// Never counts as a shared participant.
pub const UNKNOWN_PRESENTER: &str = "Unknown presenter";

/// Whether a participant name takes part in overlap checks.
#[inline]
pub fn is_real_participant(name: &str) -> bool {
    !name.trim().is_empty() && name != UNKNOWN_PRESENTER
}

/// Citation count per participant, injected by the data-loading layer.
///
/// Participants missing from the index count as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitationIndex {
    counts: HashMap<String, u64>,
}

impl CitationIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a participant's citation count.
    pub fn with_citations(mut self, name: impl Into<String>, citations: u64) -> Self {
        self.counts.insert(name.into(), citations);
        self
    }

    /// Citation count of a participant.
    pub fn citations(&self, name: &str) -> u64 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// Sum of citation counts over a set of participants.
    pub fn total<'a>(&self, names: impl IntoIterator<Item = &'a String>) -> u64 {
        names.into_iter().map(|n| self.citations(n)).sum()
    }
}

impl FromIterator<(String, u64)> for CitationIndex {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_participant() {
        assert!(is_real_participant("Ada Lovelace"));
        assert!(!is_real_participant(UNKNOWN_PRESENTER));
        assert!(!is_real_participant("  "));
    }

    #[test]
    fn test_citation_lookup() {
        let index = CitationIndex::new()
            .with_citations("A", 10)
            .with_citations("B", 5);
        assert_eq!(index.citations("A"), 10);
        assert_eq!(index.citations("missing"), 0);

        let names = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        assert_eq!(index.total(&names), 15);
    }
}
