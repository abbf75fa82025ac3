//! Validated entity set with precomputed relation tables.
//!
//! Pairwise relations (ordering, shared participants, topic similarity) are
//! computed once so that the penalty model and the repair passes only do
//! table lookups inside the generation loop.

use tracing::debug;

use super::{topic_similarity, CitationIndex, Entity, Resources};
use crate::error::ScheduleError;
use crate::validation::{admissible_timeslots, validate_input};

/// Read-only view of the entities of one scheduling problem.
///
/// Entity `i` of the set is gene value `i` in a [`Grid`](super::Grid).
#[derive(Debug, Clone)]
pub struct EntitySet {
    entities: Vec<Entity>,
    nrooms: usize,
    nslots: usize,
    /// `prereq[p * n + q]`: p must be scheduled before q.
    prereq: Vec<bool>,
    /// `conflict[a * n + b]`: a and b share a participant.
    conflict: Vec<bool>,
    /// `theme[a * n + b]`: topic similarity of a and b.
    theme: Vec<u32>,
    /// `valid[e * nslots + s]`: entity e may occupy timeslot s.
    valid: Vec<bool>,
    priority: Vec<usize>,
    predecessor: Vec<Option<usize>>,
    has_order: Vec<bool>,
    prereq_list: Vec<(usize, usize)>,
    conflict_pairs: usize,
    room_requests: usize,
}

impl EntitySet {
    /// Builds and validates an entity set.
    ///
    /// Priority ranks are derived from `citations`: entities are sorted by
    /// the total citation count of their participants (descending) and cut
    /// into bands of one entity per timeslot.
    pub fn new(
        entities: Vec<Entity>,
        resources: &Resources,
        citations: &CitationIndex,
    ) -> Result<Self, ScheduleError> {
        validate_input(&entities, resources).map_err(ScheduleError::InvalidInput)?;

        let n = entities.len();
        let nslots = resources.nslots();
        let nrooms = resources.nrooms();

        let mut prereq = vec![false; n * n];
        let mut conflict = vec![false; n * n];
        let mut theme = vec![0u32; n * n];
        let mut prereq_list = Vec::new();
        let mut conflict_pairs = 0;

        for a in 0..n {
            for b in 0..n {
                if a == b {
                    continue;
                }
                if entities[a].comes_before(&entities[b]) {
                    prereq[a * n + b] = true;
                    prereq_list.push((a, b));
                }
                if b > a {
                    if entities[a].shares_participant(&entities[b]) {
                        conflict[a * n + b] = true;
                        conflict[b * n + a] = true;
                        conflict_pairs += 1;
                    }
                    let sim = topic_similarity(&entities[a].topics, &entities[b].topics);
                    theme[a * n + b] = sim;
                    theme[b * n + a] = sim;
                }
            }
        }

        let mut valid = vec![false; n * nslots];
        for (e, entity) in entities.iter().enumerate() {
            for s in admissible_timeslots(entity, resources) {
                valid[e * nslots + s] = true;
            }
        }

        let predecessor = (0..n)
            .map(|q| {
                (0..n)
                    .filter(|&p| prereq[p * n + q])
                    .max_by_key(|&p| entities[p].part)
            })
            .collect();
        let has_order = (0..n)
            .map(|e| (0..n).any(|o| prereq[e * n + o] || prereq[o * n + e]))
            .collect();

        let priority = priority_bands(&entities, citations, nslots);
        let room_requests = entities.iter().filter(|e| e.room.is_some()).count();

        debug!(
            entities = n,
            prereq_pairs = prereq_list.len(),
            conflict_pairs,
            room_requests,
            "entity set built"
        );

        Ok(Self {
            entities,
            nrooms,
            nslots,
            prereq,
            conflict,
            theme,
            valid,
            priority,
            predecessor,
            has_order,
            prereq_list,
            conflict_pairs,
            room_requests,
        })
    }

    /// Number of entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity by gene value.
    #[inline]
    pub fn get(&self, id: usize) -> &Entity {
        &self.entities[id]
    }

    /// All entities.
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Number of rooms the set was built for.
    #[inline]
    pub fn nrooms(&self) -> usize {
        self.nrooms
    }

    /// Number of timeslots the set was built for.
    #[inline]
    pub fn nslots(&self) -> usize {
        self.nslots
    }

    /// Whether a gene value is a real entity.
    #[inline]
    pub fn is_entity(&self, gene: u32) -> bool {
        (gene as usize) < self.entities.len()
    }

    /// Whether `p` must be scheduled before `q`.
    #[inline]
    pub fn is_prereq(&self, p: usize, q: usize) -> bool {
        self.prereq[p * self.len() + q]
    }

    /// Whether placing `first` no later than `second` breaks ordering,
    /// i.e. `second` is a prerequisite of `first`.
    #[inline]
    pub fn breaks_ordering(&self, first: usize, second: usize) -> bool {
        self.is_prereq(second, first)
    }

    /// Whether two entities share a participant.
    #[inline]
    pub fn overlaps_participants(&self, a: usize, b: usize) -> bool {
        self.conflict[a * self.len() + b]
    }

    /// Topic similarity of two entities.
    #[inline]
    pub fn theme_cost(&self, a: usize, b: usize) -> u32 {
        self.theme[a * self.len() + b]
    }

    /// Whether an entity may occupy a timeslot.
    #[inline]
    pub fn is_valid_slot(&self, entity: usize, slot: usize) -> bool {
        self.valid[entity * self.nslots + slot]
    }

    /// Priority band (0 = most prominent).
    #[inline]
    pub fn priority(&self, entity: usize) -> usize {
        self.priority[entity]
    }

    /// Requested room, if any.
    #[inline]
    pub fn room_request(&self, entity: usize) -> Option<usize> {
        self.entities[entity].room
    }

    /// Immediately preceding part of a multi-part entity.
    #[inline]
    pub fn predecessor(&self, entity: usize) -> Option<usize> {
        self.predecessor[entity]
    }

    /// Whether the entity takes part in any ordering relation.
    #[inline]
    pub fn has_ordering(&self, entity: usize) -> bool {
        self.has_order[entity]
    }

    /// Entities that must come before `entity`.
    pub fn prerequisites(&self, entity: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(move |&p| self.is_prereq(p, entity))
    }

    /// Entities that must come after `entity`.
    pub fn successors(&self, entity: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(move |&q| self.is_prereq(entity, q))
    }

    /// All (prerequisite, dependent) pairs.
    #[inline]
    pub fn prereq_list(&self) -> &[(usize, usize)] {
        &self.prereq_list
    }

    /// Number of (prerequisite, dependent) pairs.
    #[inline]
    pub fn prereq_pairs(&self) -> usize {
        self.prereq_list.len()
    }

    /// Number of unordered pairs sharing a participant.
    #[inline]
    pub fn conflict_pairs(&self) -> usize {
        self.conflict_pairs
    }

    /// Number of entities with a room request.
    #[inline]
    pub fn room_requests(&self) -> usize {
        self.room_requests
    }

    /// All unordered pair theme costs.
    pub fn pair_theme_costs(&self) -> Vec<u32> {
        let n = self.len();
        let mut costs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for a in 0..n {
            for b in (a + 1)..n {
                costs.push(self.theme_cost(a, b));
            }
        }
        costs
    }
}

/// Priority band per entity: rank by total citations (descending, ties by
/// position), divided by the number of timeslots.
fn priority_bands(entities: &[Entity], citations: &CitationIndex, nslots: usize) -> Vec<usize> {
    let totals: Vec<u64> = entities
        .iter()
        .map(|e| citations.total(e.real_participants()))
        .collect();
    let mut order: Vec<usize> = (0..entities.len()).collect();
    order.sort_by(|&a, &b| totals[b].cmp(&totals[a]).then(a.cmp(&b)));

    let mut priority = vec![0; entities.len()];
    for (rank, &e) in order.iter().enumerate() {
        priority[e] = rank / nslots.max(1);
    }
    priority
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNKNOWN_PRESENTER;

    fn sample_set() -> EntitySet {
        let entities = vec![
            Entity::new(0, "A - Part I of III")
                .with_participant("X")
                .with_topics([100, 200, 300]),
            Entity::new(1, "A - Part II of III")
                .with_participant("X")
                .with_topics([100, 200, 300]),
            Entity::new(2, "A - Part III of III").with_participant("Y"),
            Entity::new(3, "B")
                .with_participants(["Z", UNKNOWN_PRESENTER])
                .with_topics([150, 900, 901]),
            Entity::new(4, "C").with_participant(UNKNOWN_PRESENTER).with_room(1),
        ];
        let citations = CitationIndex::new()
            .with_citations("Z", 100)
            .with_citations("Y", 50)
            .with_citations("X", 10);
        EntitySet::new(entities, &Resources::uniform(2, 3, 4), &citations).unwrap()
    }

    #[test]
    fn test_prerequisites_transitive() {
        let set = sample_set();
        assert!(set.is_prereq(0, 1));
        assert!(set.is_prereq(0, 2));
        assert!(set.is_prereq(1, 2));
        assert!(!set.is_prereq(2, 0));
        assert_eq!(set.prereq_pairs(), 3);
        assert!(set.breaks_ordering(1, 0));
        assert!(!set.breaks_ordering(0, 1));
    }

    #[test]
    fn test_predecessor_is_immediate() {
        let set = sample_set();
        assert_eq!(set.predecessor(0), None);
        assert_eq!(set.predecessor(1), Some(0));
        assert_eq!(set.predecessor(2), Some(1));
        assert_eq!(set.predecessor(3), None);
        assert!(set.has_ordering(2));
        assert!(!set.has_ordering(4));
    }

    #[test]
    fn test_conflicts_ignore_unknown_presenter() {
        let set = sample_set();
        assert!(set.overlaps_participants(0, 1));
        assert!(!set.overlaps_participants(3, 4));
        assert_eq!(set.conflict_pairs(), 1);
    }

    #[test]
    fn test_theme_costs_symmetric() {
        let set = sample_set();
        assert_eq!(set.theme_cost(0, 1), 6);
        assert_eq!(set.theme_cost(0, 3), set.theme_cost(3, 0));
        assert_eq!(set.pair_theme_costs().len(), 10);
    }

    #[test]
    fn test_priority_bands() {
        let set = sample_set();
        // Z (3) > Y (2) > X (0, 1) > none (4); three timeslots per band.
        assert_eq!(set.priority(3), 0);
        assert_eq!(set.priority(2), 0);
        assert_eq!(set.priority(0), 0);
        assert_eq!(set.priority(1), 1);
        assert_eq!(set.priority(4), 1);
    }

    #[test]
    fn test_invalid_input_rejected() {
        let entities = vec![Entity::new(0, "A").with_room(7)];
        let err = EntitySet::new(entities, &Resources::uniform(2, 2, 1), &CitationIndex::new())
            .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidInput(_)));
    }
}
