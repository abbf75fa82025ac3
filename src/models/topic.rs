//! Topic (classification) codes.
//!
//! Every entity carries three numeric classification codes. Two codes are
//! identical, similar (same stem), or different. The stem of a code is the
//! code with its last two digits zeroed, so `6512` and `6599` share the
//! stem `6500`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of topic codes carried by every entity.
pub const TOPICS_PER_ENTITY: usize = 3;

/// Highest possible entity-to-entity topic similarity.
pub const MAX_TOPIC_SIMILARITY: u32 = TOPICS_PER_ENTITY as u32 * Similarity::Identical as u32;

/// A coarse classification id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TopicCode(pub u32);

/// Outcome of comparing two topic codes.
///
/// Discriminants are the weights used by the theme penalty and the
/// cohesion score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Similarity {
    Different = 0,
    Similar = 1,
    Identical = 2,
}

impl TopicCode {
    /// The code's family: last two digits zeroed.
    #[inline]
    pub fn stem(self) -> TopicCode {
        TopicCode((self.0 / 100) * 100)
    }

    /// Compares two codes.
    pub fn compare(self, other: TopicCode) -> Similarity {
        if self == other {
            Similarity::Identical
        } else if self.stem() == other.stem() {
            Similarity::Similar
        } else {
            Similarity::Different
        }
    }
}

/// Similarity between two sets of topic codes (range `0..=6`).
///
/// Each code of `a` contributes its best match among the codes of `b`.
/// The measure is made symmetric by taking the larger of both directions.
pub fn topic_similarity(a: &[TopicCode; TOPICS_PER_ENTITY], b: &[TopicCode; TOPICS_PER_ENTITY]) -> u32 {
    directed_similarity(a, b).max(directed_similarity(b, a))
}

fn directed_similarity(a: &[TopicCode], b: &[TopicCode]) -> u32 {
    a.iter()
        .map(|&ca| {
            b.iter()
                .map(|&cb| ca.compare(cb) as u32)
                .max()
                .unwrap_or(0)
        })
        .sum()
}

/// Read-only topic name table, injected by the data-loading layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicCatalog {
    names: HashMap<u32, String>,
}

impl TopicCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a topic name.
    pub fn with_topic(mut self, id: u32, name: impl Into<String>) -> Self {
        self.names.insert(id, name.into());
        self
    }

    /// Number of named topics.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Display name of a code.
    ///
    /// Codes ending in `99` ("other") fall back to their stem's name.
    pub fn name(&self, code: TopicCode) -> String {
        if let Some(name) = self.names.get(&code.0) {
            return name.clone();
        }
        if code.0 % 100 == 99 {
            if let Some(name) = self.names.get(&code.stem().0) {
                return name.clone();
            }
        }
        format!("UNKNOWN THEME: {}", code.0)
    }
}

impl FromIterator<(u32, String)> for TopicCatalog {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem() {
        assert_eq!(TopicCode(6512).stem(), TopicCode(6500));
        assert_eq!(TopicCode(42).stem(), TopicCode(0));
    }

    #[test]
    fn test_compare() {
        assert_eq!(TopicCode(6512).compare(TopicCode(6512)), Similarity::Identical);
        assert_eq!(TopicCode(6512).compare(TopicCode(6530)), Similarity::Similar);
        assert_eq!(TopicCode(6512).compare(TopicCode(6612)), Similarity::Different);
    }

    #[test]
    fn test_topic_similarity_range() {
        let a = [TopicCode(100), TopicCode(200), TopicCode(300)];
        assert_eq!(topic_similarity(&a, &a), MAX_TOPIC_SIMILARITY);

        let b = [TopicCode(900), TopicCode(800), TopicCode(700)];
        assert_eq!(topic_similarity(&a, &b), 0);

        // One identical, one similar
        let c = [TopicCode(100), TopicCode(250), TopicCode(999)];
        assert_eq!(topic_similarity(&a, &c), 3);
    }

    #[test]
    fn test_topic_similarity_symmetric() {
        let a = [TopicCode(100), TopicCode(100), TopicCode(100)];
        let b = [TopicCode(100), TopicCode(500), TopicCode(600)];
        assert_eq!(topic_similarity(&a, &b), topic_similarity(&b, &a));
        assert_eq!(topic_similarity(&a, &b), 6);
    }

    #[test]
    fn test_catalog_names() {
        let catalog = TopicCatalog::new()
            .with_topic(6500, "Numerical analysis")
            .with_topic(6512, "Sparse solvers");

        assert_eq!(catalog.name(TopicCode(6512)), "Sparse solvers");
        assert_eq!(catalog.name(TopicCode(6599)), "Numerical analysis");
        assert_eq!(catalog.name(TopicCode(7000)), "UNKNOWN THEME: 7000");
    }
}
