//! Constructive starting grid for session scheduling.
//!
//! # Algorithm
//!
//! 1. Order entities by part number (single-part entities count as part 1),
//!    then by id, so every prerequisite is placed before its dependents.
//! 2. Place each entity in the admissible timeslot after all of its placed
//!    prerequisites that adds the least conflict (shared participants weigh
//!    [`CONFLICT_WEIGHT`], topic similarity its raw value).
//! 3. If no such timeslot has a free room, relax the ordering bound, then
//!    admissibility.
//! 4. Fill the remaining cells with fillers in ascending order.

use crate::models::{EntitySet, Gene, Grid};

/// Cost of one shared-participant pair relative to one unit of topic similarity.
pub const CONFLICT_WEIGHT: u64 = 1000;

/// Builds a greedy grid of `set.nslots()` rows and `set.nrooms()` columns.
pub fn greedy_grid(set: &EntitySet) -> Grid {
    let (nslots, nrooms) = (set.nslots(), set.nrooms());
    let n = set.len();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&e| (set.get(e).part.unwrap_or(1), e));

    let mut occupants: Vec<Vec<usize>> = vec![Vec::with_capacity(nrooms); nslots];
    let mut slot_of = vec![usize::MAX; n];

    for &e in &order {
        let earliest = set
            .prerequisites(e)
            .filter(|&p| slot_of[p] != usize::MAX)
            .map(|p| slot_of[p] + 1)
            .max()
            .unwrap_or(0);

        let has_room = |s: usize| occupants[s].len() < nrooms;
        let cost = |s: usize| -> u64 {
            occupants[s]
                .iter()
                .map(|&o| {
                    let clash = if set.overlaps_participants(e, o) {
                        CONFLICT_WEIGHT
                    } else {
                        0
                    };
                    clash + set.theme_cost(e, o) as u64
                })
                .sum()
        };
        let pick = |from: usize, admissible_only: bool| {
            (from..nslots)
                .filter(|&s| has_room(s) && (!admissible_only || set.is_valid_slot(e, s)))
                .min_by_key(|&s| (cost(s), s))
        };

        let chosen = pick(earliest, true)
            .or_else(|| pick(0, true))
            .or_else(|| pick(0, false));

        if let Some(s) = chosen {
            occupants[s].push(e);
            slot_of[e] = s;
        }
    }

    let mut filler = n as Gene..(nslots * nrooms) as Gene;
    let mut cells = Vec::with_capacity(nslots * nrooms);
    for slot in &occupants {
        cells.extend(slot.iter().map(|&e| e as Gene));
        cells.extend(filler.by_ref().take(nrooms - slot.len()));
    }
    Grid::new(nslots, nrooms, cells).unwrap_or_else(|_| Grid::identity(nslots, nrooms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CitationIndex, Entity, Resources};

    #[test]
    fn test_greedy_is_permutation() {
        let entities: Vec<Entity> = (0..7).map(|i| Entity::new(i, format!("E{i}"))).collect();
        let set = EntitySet::new(entities, &Resources::uniform(3, 3, 4), &CitationIndex::new()).unwrap();
        let g = greedy_grid(&set);
        assert_eq!((g.rows(), g.cols()), (3, 3));
        assert!(g.is_valid_permutation());
    }

    #[test]
    fn test_greedy_orders_parts_and_avoids_conflicts() {
        let entities = vec![
            Entity::new(0, "A - Part II of II").with_participant("x"),
            Entity::new(1, "A - Part I of II").with_participant("x"),
            Entity::new(2, "B").with_participant("y"),
            Entity::new(3, "C").with_participant("y"),
        ];
        let set = EntitySet::new(entities, &Resources::uniform(2, 2, 4), &CitationIndex::new()).unwrap();
        let g = greedy_grid(&set);
        let pos = g.positions(4);
        assert!(g.row_of(pos[1]) < g.row_of(pos[0]));
        assert_ne!(g.row_of(pos[2]), g.row_of(pos[3]));
    }

    #[test]
    fn test_greedy_respects_timeslots() {
        let entities = vec![
            Entity::new(0, "A").with_timeslots(vec![2]),
            Entity::new(1, "B").with_timeslots(vec![1]),
        ];
        let set = EntitySet::new(entities, &Resources::uniform(1, 3, 4), &CitationIndex::new()).unwrap();
        let g = greedy_grid(&set);
        assert_eq!(g.get(2, 0), 0);
        assert_eq!(g.get(1, 0), 1);
    }
}
