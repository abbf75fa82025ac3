//! Analytic penalty bounds.
//!
//! Bounds are computed once from the entity set and the grid shape. They
//! come from relaxations of the real problem (every real grid is feasible
//! for the relaxation), so each observed raw penalty lies inside its
//! `[min, max]` range and the normalized terms lie in `[0, 1]`.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::EntitySet;

/// Weight of the normalized priority term in the combined penalty.
pub const PRIORITY_WEIGHT: f64 = 0.5;

/// Weight of the normalized theme term in the combined penalty.
pub const THEME_WEIGHT: f64 = 1.0;

/// Precomputed normalization bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyBounds {
    /// Smallest achievable theme penalty (lower bound).
    pub min_theme: u64,
    /// Largest achievable theme penalty (upper bound).
    pub max_theme: u64,
    /// Smallest achievable priority penalty (lower bound).
    pub min_priority: u64,
    /// Largest achievable priority penalty (upper bound).
    pub max_priority: u64,
    /// Largest oversubscription penalty: all participant-sharing pairs.
    pub max_overlap: u64,
    /// Largest ordering penalty: all prerequisite pairs.
    pub max_order: u64,
    /// Largest room penalty: all room requests missed.
    pub max_room: u64,
    /// Largest timeslot penalty: every restricted entity misplaced.
    pub max_timeslot: u64,
}

impl PenaltyBounds {
    /// Computes bounds for `nslots × nrooms` grids over `set`.
    pub fn compute(set: &EntitySet, nslots: usize, nrooms: usize) -> Self {
        let (min_theme, max_theme) = theme_bounds(set, nslots, nrooms);
        let (min_priority, max_priority) = priority_bounds(set, nslots, nrooms);

        let bounds = Self {
            min_theme,
            max_theme,
            min_priority,
            max_priority,
            max_overlap: set.conflict_pairs() as u64,
            max_order: set.prereq_pairs() as u64,
            max_room: set.room_requests() as u64,
            max_timeslot: (0..set.len())
                .filter(|&e| (0..set.nslots()).any(|s| !set.is_valid_slot(e, s)))
                .count() as u64,
        };
        if bounds.max_theme == bounds.min_theme {
            warn!(value = bounds.min_theme, "theme penalty range is empty; theme term disabled");
        }
        if bounds.max_priority == bounds.min_priority {
            warn!(value = bounds.min_priority, "priority penalty range is empty; priority term disabled");
        }
        bounds
    }

    /// Denominator of the combined score.
    ///
    /// Always at least `PRIORITY_WEIGHT + THEME_WEIGHT`, never zero.
    pub fn max_penalty(&self) -> f64 {
        (self.max_order + self.max_overlap + self.max_room + self.max_timeslot) as f64
            + PRIORITY_WEIGHT
            + THEME_WEIGHT
    }

    /// Maps a raw priority penalty into `[0, 1]`.
    pub fn map_priority_penalty(&self, raw: u64) -> f64 {
        normalize(raw, self.min_priority, self.max_priority)
    }

    /// Maps a raw theme penalty into `[0, 1]`.
    pub fn map_theme_penalty(&self, raw: u64) -> f64 {
        normalize(raw, self.min_theme, self.max_theme)
    }
}

/// `(raw - min) / (max - min)`, with an empty range mapping to 0.
fn normalize(raw: u64, min: u64, max: u64) -> f64 {
    if max <= min {
        return 0.0;
    }
    (raw as f64 - min as f64) / (max - min) as f64
}

#[inline]
fn pairs(k: usize) -> usize {
    k * k.saturating_sub(1) / 2
}

/// Theme bounds from the sorted pair costs.
///
/// The maximum packs entities into as few timeslots as possible and charges
/// the most similar pairs; the minimum spreads entities evenly and charges
/// the least similar pairs.
fn theme_bounds(set: &EntitySet, nslots: usize, nrooms: usize) -> (u64, u64) {
    let n = set.len();
    if n < 2 || nslots == 0 || nrooms < 2 {
        return (0, 0);
    }
    let mut costs = set.pair_theme_costs();
    costs.sort_unstable();

    // Densest packing: full timeslots plus one partial timeslot.
    let full = (n / nrooms).min(nslots);
    let rest = if full < nslots { n - full * nrooms } else { 0 };
    let max_pairs = (full * pairs(nrooms) + pairs(rest.min(nrooms))).min(costs.len());

    // Even spread: `extra` timeslots get one more entity.
    let base = n / nslots;
    let extra = n % nslots;
    let min_pairs = (extra * pairs(base + 1) + (nslots - extra) * pairs(base)).min(costs.len());

    let min: u64 = costs[..min_pairs].iter().map(|&c| c as u64).sum();
    let max: u64 = costs[costs.len() - max_pairs..].iter().map(|&c| c as u64).sum();
    (min, max)
}

/// Priority bounds from the sorted-assignment relaxation.
///
/// Room capacities are `nslots` cells each; room requests are ignored,
/// which only widens the range.
fn priority_bounds(set: &EntitySet, nslots: usize, nrooms: usize) -> (u64, u64) {
    let mut prio: Vec<usize> = (0..set.len())
        .filter(|&e| set.room_request(e).is_none())
        .map(|e| set.priority(e))
        .collect();
    let count = prio.len().min(nslots * nrooms);
    if count == 0 {
        return (0, 0);
    }
    prio.sort_unstable();

    // Room index of every cell, ascending.
    let cells: Vec<usize> = (0..nrooms)
        .flat_map(|r| std::iter::repeat(r).take(nslots))
        .collect();

    // Minimum: highest-index cells, same order.
    let high = &cells[cells.len() - count..];
    let min = prio[prio.len() - count..]
        .iter()
        .zip(high)
        .map(|(&p, &r)| priority_cost(p, r))
        .sum();

    // Maximum: lowest-index cells, opposite order.
    let low = &cells[..count];
    let max = prio[prio.len() - count..]
        .iter()
        .rev()
        .zip(low)
        .map(|(&p, &r)| priority_cost(p, r))
        .sum();

    (min, max)
}

/// Priority cost of placing an entity of band `priority` in room `room`.
#[inline]
pub(crate) fn priority_cost(priority: usize, room: usize) -> u64 {
    if priority > room {
        let gap = (priority - room) as u64;
        gap * gap
    } else {
        0
    }
}
