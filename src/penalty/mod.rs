//! Penalty model for (timeslot × room) grids.
//!
//! # Terms
//!
//! | Term | Raw value | Normalized by |
//! |------|-----------|---------------|
//! | Ordering | prerequisite pairs scheduled at or after their dependent | count |
//! | Oversubscription | same-slot pairs sharing a participant | count |
//! | Room | room requests not honoured | count |
//! | Timeslot | entities outside their admissible timeslots | count |
//! | Priority | Σ (band − room)² where band > room | [`PenaltyBounds`] |
//! | Theme | Σ topic similarity of same-slot pairs | [`PenaltyBounds`] |
//!
//! The combined score is
//! `1 − (order + oversub + room + timeslot + priority/2 + theme) / max_penalty`,
//! which lies in `[0, 1]` for every grid over the entity set.

mod bounds;

pub use bounds::{PenaltyBounds, PRIORITY_WEIGHT, THEME_WEIGHT};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScheduleError;
use crate::models::{EntitySet, Grid};
use bounds::priority_cost;

/// Per-term penalties of one grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Broken prerequisite pairs.
    pub order: u64,
    /// Same-slot pairs sharing a participant.
    pub oversubscription: u64,
    /// Room requests not honoured.
    pub room: u64,
    /// Entities outside their admissible timeslots.
    pub timeslot: u64,
    /// Raw priority penalty.
    pub priority: u64,
    /// Raw theme penalty.
    pub theme: u64,
    /// Priority penalty mapped into `[0, 1]`.
    pub priority_normalized: f64,
    /// Theme penalty mapped into `[0, 1]`.
    pub theme_normalized: f64,
    /// Combined score in `[0, 1]`, higher is better.
    pub score: f64,
}

impl ScoreBreakdown {
    /// Sum of the weighted penalty terms.
    pub fn total_penalty(&self) -> f64 {
        (self.order + self.oversubscription + self.room + self.timeslot) as f64
            + PRIORITY_WEIGHT * self.priority_normalized
            + THEME_WEIGHT * self.theme_normalized
    }
}

impl fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "score {:.4} (order {}, oversubscription {}, room {}, timeslot {}, priority {} [{:.3}], theme {} [{:.3}])",
            self.score,
            self.order,
            self.oversubscription,
            self.room,
            self.timeslot,
            self.priority,
            self.priority_normalized,
            self.theme,
            self.theme_normalized
        )
    }
}

/// Scores session grids against an entity set.
#[derive(Debug, Clone)]
pub struct PenaltyModel {
    set: EntitySet,
    bounds: PenaltyBounds,
}

impl PenaltyModel {
    /// Creates the model and computes its bounds.
    pub fn new(set: EntitySet) -> Self {
        let bounds = PenaltyBounds::compute(&set, set.nslots(), set.nrooms());
        Self { set, bounds }
    }

    /// The entity set being scored.
    pub fn entities(&self) -> &EntitySet {
        &self.set
    }

    /// Precomputed bounds.
    pub fn bounds(&self) -> &PenaltyBounds {
        &self.bounds
    }

    /// Full per-term evaluation of `grid`.
    ///
    /// Fails unless `grid` is an `nslots × nrooms` permutation.
    pub fn score(&self, grid: &Grid) -> Result<ScoreBreakdown, ScheduleError> {
        let (nslots, nrooms) = (self.set.nslots(), self.set.nrooms());
        if grid.rows() != nslots || grid.cols() != nrooms {
            return Err(ScheduleError::GridShape {
                expected: nslots * nrooms,
                actual: grid.len(),
            });
        }
        grid.check_permutation()?;

        let pos = grid.positions(self.set.len());
        let order = self.order_penalty(grid, &pos);

        let mut oversubscription = 0;
        let mut theme = 0;
        let mut room = 0;
        let mut timeslot = 0;
        let mut priority = 0;

        for slot in 0..grid.rows() {
            let cells = grid.row(slot);
            for (r, &gene) in cells.iter().enumerate() {
                if !self.set.is_entity(gene) {
                    continue;
                }
                let a = gene as usize;
                if !self.set.is_valid_slot(a, slot) {
                    timeslot += 1;
                }

                match self.set.room_request(a) {
                    Some(req) if req != r => room += 1,
                    Some(_) => {}
                    None => priority += priority_cost(self.set.priority(a), r),
                }

                for &other in &cells[r + 1..] {
                    if !self.set.is_entity(other) {
                        continue;
                    }
                    let b = other as usize;
                    if self.set.overlaps_participants(a, b) {
                        oversubscription += 1;
                    }
                    theme += self.set.theme_cost(a, b) as u64;
                }
            }
        }

        let priority_normalized = self.bounds.map_priority_penalty(priority);
        let theme_normalized = self.bounds.map_theme_penalty(theme);

        let mut breakdown = ScoreBreakdown {
            order,
            oversubscription,
            room,
            timeslot,
            priority,
            theme,
            priority_normalized,
            theme_normalized,
            score: 0.0,
        };
        breakdown.score = 1.0 - breakdown.total_penalty() / self.bounds.max_penalty();
        Ok(breakdown)
    }

    /// Combined score only; a malformed grid rates 0.
    #[inline]
    pub fn rate(&self, grid: &Grid) -> f64 {
        self.score(grid).map_or(0.0, |b| b.score)
    }

    /// Prerequisite pairs `(p, q)` where `q` sits in the same or an earlier
    /// timeslot than `p`.
    fn order_penalty(&self, grid: &Grid, pos: &[usize]) -> u64 {
        self.set
            .prereq_list()
            .iter()
            .filter(|&&(p, q)| grid.row_of(pos[q]) <= grid.row_of(pos[p]))
            .count() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CitationIndex, Entity, Resources};
    use rand::rngs::SmallRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    /// Two parts of one session sharing organiser X (part I wants room 1)
    /// and one unrelated, highly cited session.
    fn sample_model() -> PenaltyModel {
        let entities = vec![
            Entity::new(0, "T - Part I of II")
                .with_participant("X")
                .with_topics([100, 200, 300])
                .with_room(1),
            Entity::new(1, "T - Part II of II")
                .with_participant("X")
                .with_topics([100, 200, 300]),
            Entity::new(2, "U")
                .with_participant("Y")
                .with_topics([700, 800, 900]),
        ];
        let citations = CitationIndex::new()
            .with_citations("X", 50)
            .with_citations("Y", 100);
        let set = EntitySet::new(entities, &Resources::uniform(3, 2, 4), &citations).unwrap();
        PenaltyModel::new(set)
    }

    fn grid(rows: Vec<Vec<u32>>) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    #[test]
    fn test_bounds() {
        let model = sample_model();
        let b = model.bounds();
        assert_eq!(b.max_order, 1);
        assert_eq!(b.max_overlap, 1);
        assert_eq!(b.max_room, 1);
        assert_eq!((b.min_theme, b.max_theme), (0, 6));
        assert_eq!((b.min_priority, b.max_priority), (0, 1));
        assert!((b.max_penalty() - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_best_grid_scores_one() {
        let model = sample_model();
        let s = model.score(&grid(vec![vec![2, 0, 3], vec![4, 1, 5]])).unwrap();
        assert_eq!(s.order, 0);
        assert_eq!(s.oversubscription, 0);
        assert_eq!(s.room, 0);
        assert_eq!(s.priority, 0);
        assert_eq!(s.theme, 0);
        assert!((s.score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_worst_grid_scores_zero() {
        let model = sample_model();
        let s = model.score(&grid(vec![vec![1, 2, 0], vec![3, 4, 5]])).unwrap();
        assert_eq!(s.order, 1);
        assert_eq!(s.oversubscription, 1);
        assert_eq!(s.room, 1);
        assert_eq!(s.timeslot, 0);
        assert_eq!(s.priority, 1);
        assert_eq!(s.theme, 6);
        assert!(s.score.abs() < 1e-12);
    }

    #[test]
    fn test_oversubscription_scenario() {
        let entities = vec![
            Entity::new(0, "A").with_participant("shared"),
            Entity::new(1, "B").with_participant("shared"),
        ];
        let set = EntitySet::new(entities, &Resources::uniform(2, 2, 4), &CitationIndex::new())
            .unwrap();
        let model = PenaltyModel::new(set);

        let same = model.score(&grid(vec![vec![0, 1], vec![2, 3]])).unwrap();
        assert_eq!(same.oversubscription, 1);

        let apart = model.score(&grid(vec![vec![0, 2], vec![1, 3]])).unwrap();
        assert_eq!(apart.oversubscription, 0);
        assert!(apart.score > same.score);
    }

    #[test]
    fn test_order_counts_same_slot() {
        let model = sample_model();
        // Part II before part I.
        let s = model.score(&grid(vec![vec![1, 3, 2], vec![4, 0, 5]])).unwrap();
        assert_eq!(s.order, 1);
        // Same slot also breaks ordering.
        let s = model.score(&grid(vec![vec![1, 0, 2], vec![3, 4, 5]])).unwrap();
        assert_eq!(s.order, 1);
    }

    #[test]
    fn test_random_grids_within_unit_interval() {
        let model = sample_model();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut cells: Vec<u32> = (0..6).collect();
        for _ in 0..500 {
            cells.shuffle(&mut rng);
            let g = Grid::new(2, 3, cells.clone()).unwrap();
            let s = model.score(&g).unwrap();
            assert!((0.0..=1.0).contains(&s.score), "{s}");
            assert!((0.0..=1.0).contains(&s.priority_normalized));
            assert!((0.0..=1.0).contains(&s.theme_normalized));
        }
    }

    #[test]
    fn test_timeslot_term() {
        let entities = vec![
            Entity::new(0, "A").with_timeslots(vec![1]),
            Entity::new(1, "B"),
        ];
        let set = EntitySet::new(entities, &Resources::uniform(1, 2, 4), &CitationIndex::new())
            .unwrap();
        let model = PenaltyModel::new(set);
        assert_eq!(model.bounds().max_timeslot, 1);

        let bad = model.score(&grid(vec![vec![0], vec![1]])).unwrap();
        assert_eq!(bad.timeslot, 1);
        let good = model.score(&grid(vec![vec![1], vec![0]])).unwrap();
        assert_eq!(good.timeslot, 0);
        assert!(good.score > bad.score);
        assert!((0.0..=1.0).contains(&bad.score));
    }

    #[test]
    fn test_malformed_grid_rejected() {
        let model = sample_model();
        assert_eq!(
            model.score(&Grid::identity(1, 3)).unwrap_err(),
            ScheduleError::GridShape {
                expected: 6,
                actual: 3
            }
        );
        let twice = grid(vec![vec![0, 0, 3], vec![4, 1, 5]]);
        assert_eq!(
            model.score(&twice).unwrap_err(),
            ScheduleError::NotPermutation { len: 6 }
        );
        assert_eq!(model.rate(&twice), 0.0);
    }

    #[test]
    fn test_display() {
        let model = sample_model();
        let text = model.score(&grid(vec![vec![2, 0, 3], vec![4, 1, 5]])).unwrap().to_string();
        assert!(text.starts_with("score 1.0000"));
    }
}
