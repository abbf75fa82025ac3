//! Schedulable entity model.
//!
//! An entity is a conference session (minisymposium) or a single lecture.
//! Multi-part sessions share a base title and are distinguished by their
//! part number; every lower part must be scheduled before every higher one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::participant::is_real_participant;
use super::topic::{TopicCode, TOPICS_PER_ENTITY};

/// A schedulable item.
///
/// Entities are immutable once handed to an [`EntitySet`](super::EntitySet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// External identifier (stable across runs, used in reports).
    pub id: u32,
    /// Title without any part suffix.
    pub title: String,
    /// Part number (1-based). `None` = single-part entity.
    pub part: Option<u32>,
    /// Organizers and speakers, de-duplicated.
    pub participants: BTreeSet<String>,
    /// Talk titles already contained in this entity.
    pub talks: Vec<String>,
    /// Classification codes.
    pub topics: [TopicCode; TOPICS_PER_ENTITY],
    /// Required room index. `None` = any room.
    pub room: Option<usize>,
    /// Allowed timeslot indices. `None` = any timeslot.
    pub timeslots: Option<Vec<usize>>,
    /// Number of talk-slots occupied.
    pub size: u32,
}

impl Entity {
    /// Creates an entity.
    ///
    /// A title of the form `"<base> - Part <roman> of <roman>"` is split into
    /// its base title and part number.
    pub fn new(id: u32, title: impl Into<String>) -> Self {
        let title = title.into();
        let (title, part) = split_part(&title);
        Self {
            id,
            title,
            part,
            participants: BTreeSet::new(),
            talks: Vec::new(),
            topics: [TopicCode(0); TOPICS_PER_ENTITY],
            room: None,
            timeslots: None,
            size: 1,
        }
    }

    /// Sets the part number explicitly.
    pub fn with_part(mut self, part: u32) -> Self {
        self.part = Some(part);
        self
    }

    /// Adds an organizer or speaker.
    pub fn with_participant(mut self, name: impl Into<String>) -> Self {
        self.participants.insert(name.into());
        self
    }

    /// Adds several participants.
    pub fn with_participants<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.participants.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds an existing talk.
    pub fn with_talk(mut self, title: impl Into<String>) -> Self {
        self.talks.push(title.into());
        self
    }

    /// Sets the three classification codes.
    pub fn with_topics(mut self, codes: [u32; TOPICS_PER_ENTITY]) -> Self {
        self.topics = codes.map(TopicCode);
        self
    }

    /// Requires a specific room.
    pub fn with_room(mut self, room: usize) -> Self {
        self.room = Some(room);
        self
    }

    /// Restricts the entity to a set of timeslots.
    pub fn with_timeslots(mut self, slots: Vec<usize>) -> Self {
        self.timeslots = Some(slots);
        self
    }

    /// Sets the number of talk-slots occupied.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Title including the part suffix.
    pub fn full_title(&self) -> String {
        match self.part {
            Some(p) => format!("{} - Part {}", self.title, to_roman(p)),
            None => self.title.clone(),
        }
    }

    /// Whether `self` must be scheduled before `other`.
    pub fn comes_before(&self, other: &Entity) -> bool {
        match (self.part, other.part) {
            (Some(a), Some(b)) => self.title == other.title && a < b,
            _ => false,
        }
    }

    /// Whether the two entities share a real participant.
    pub fn shares_participant(&self, other: &Entity) -> bool {
        self.participants
            .intersection(&other.participants)
            .any(|name| is_real_participant(name))
    }

    /// Participants taking part in overlap checks.
    pub fn real_participants(&self) -> impl Iterator<Item = &String> {
        self.participants.iter().filter(|n| is_real_participant(n))
    }
}

/// Splits `"<base> - Part <roman> of <roman>"` into base title and part.
fn split_part(title: &str) -> (String, Option<u32>) {
    if let Some(idx) = title.find(" - Part ") {
        let rest = &title[idx + " - Part ".len()..];
        let numeral = rest.split_whitespace().next().unwrap_or("");
        let part = numeral
            .parse::<u32>()
            .ok()
            .or_else(|| from_roman(numeral));
        if let Some(part) = part {
            return (title[..idx].trim_end().to_string(), Some(part));
        }
    }
    (title.to_string(), None)
}

fn from_roman(s: &str) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    let mut total = 0u32;
    let mut prev = 0u32;
    for c in s.chars().rev() {
        let v = match c.to_ascii_uppercase() {
            'I' => 1,
            'V' => 5,
            'X' => 10,
            'L' => 50,
            'C' => 100,
            _ => return None,
        };
        if v < prev {
            total = total.checked_sub(v)?;
        } else {
            total += v;
            prev = v;
        }
    }
    Some(total)
}

fn to_roman(mut n: u32) -> String {
    const TABLE: [(u32, &str); 9] = [
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for &(value, numeral) in &TABLE {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_part_roman() {
        let e = Entity::new(7, "Sparse Solvers - Part II of III");
        assert_eq!(e.title, "Sparse Solvers");
        assert_eq!(e.part, Some(2));
        assert_eq!(e.full_title(), "Sparse Solvers - Part II");
    }

    #[test]
    fn test_split_part_numeric() {
        let e = Entity::new(1, "Meshing - Part 4 of 4");
        assert_eq!(e.title, "Meshing");
        assert_eq!(e.part, Some(4));
    }

    #[test]
    fn test_no_part() {
        let e = Entity::new(1, "Plain Session");
        assert_eq!(e.title, "Plain Session");
        assert_eq!(e.part, None);
        assert_eq!(e.full_title(), "Plain Session");
    }

    #[test]
    fn test_roman_round_trip_small() {
        for n in 1..40 {
            assert_eq!(from_roman(&to_roman(n)), Some(n));
        }
    }

    #[test]
    fn test_comes_before() {
        let p1 = Entity::new(0, "A - Part I of II");
        let p2 = Entity::new(1, "A - Part II of II");
        let other = Entity::new(2, "B - Part I of II");
        assert!(p1.comes_before(&p2));
        assert!(!p2.comes_before(&p1));
        assert!(!p1.comes_before(&other));
    }

    #[test]
    fn test_shares_participant_ignores_sentinel() {
        let a = Entity::new(0, "A").with_participants(["X", crate::models::UNKNOWN_PRESENTER]);
        let b = Entity::new(1, "B").with_participant(crate::models::UNKNOWN_PRESENTER);
        let c = Entity::new(2, "C").with_participant("X");
        assert!(!a.shares_participant(&b));
        assert!(a.shares_participant(&c));
    }
}
