//! Rooms and timeslots.
//!
//! Rooms are ordered by index. An entity in priority band `p` costs nothing
//! in a room whose index is at least `p`, so repair packs the entities of a
//! timeslot into its highest free rooms in (priority, id) order and leaves
//! the lowest rooms to fillers. Timeslots are ordered chronologically and
//! carry the number of talks they can host.

use serde::{Deserialize, Serialize};

/// A room that can host one entity per timeslot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Display name.
    pub name: String,
    /// Seating capacity.
    pub capacity: u32,
}

/// A timeslot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeslot {
    /// Display label (e.g., "Tue AM").
    pub label: String,
    /// Number of talks that fit in this timeslot.
    pub talk_capacity: u32,
}

/// Ordered rooms and timeslots of a conference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resources {
    /// Rooms in index order.
    pub rooms: Vec<Room>,
    /// Timeslots in chronological order.
    pub timeslots: Vec<Timeslot>,
}

impl Room {
    /// Creates a room.
    pub fn new(name: impl Into<String>, capacity: u32) -> Self {
        Self {
            name: name.into(),
            capacity,
        }
    }
}

impl Timeslot {
    /// Creates a timeslot.
    pub fn new(label: impl Into<String>, talk_capacity: u32) -> Self {
        Self {
            label: label.into(),
            talk_capacity,
        }
    }
}

impl Resources {
    /// Creates an empty resource set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a room.
    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    /// Adds a timeslot.
    pub fn with_timeslot(mut self, slot: Timeslot) -> Self {
        self.timeslots.push(slot);
        self
    }

    /// Creates `nrooms` rooms and `nslots` timeslots with generic names.
    ///
    /// Timeslots can host `talks_per_slot` talks each.
    pub fn uniform(nrooms: usize, nslots: usize, talks_per_slot: u32) -> Self {
        Self {
            rooms: (0..nrooms)
                .map(|r| Room::new(format!("Room {}", r + 1), 0))
                .collect(),
            timeslots: (0..nslots)
                .map(|s| Timeslot::new(format!("Slot {}", s + 1), talks_per_slot))
                .collect(),
        }
    }

    /// Number of rooms.
    #[inline]
    pub fn nrooms(&self) -> usize {
        self.rooms.len()
    }

    /// Number of timeslots.
    #[inline]
    pub fn nslots(&self) -> usize {
        self.timeslots.len()
    }

    /// Number of grid cells (timeslots × rooms).
    #[inline]
    pub fn ncells(&self) -> usize {
        self.nrooms() * self.nslots()
    }

    /// Room index by name.
    pub fn room_index(&self, name: &str) -> Option<usize> {
        self.rooms.iter().position(|r| r.name == name)
    }
}
