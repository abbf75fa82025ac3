//! Lecture mapping: contributed lectures onto (session × talk-slot) grids.
//!
//! Sessions that already hold fewer than `talks_per_session` talks host
//! lectures in their free talk-slots; `extra_sessions` additional sessions
//! collect the remaining lectures. Row `r` of a grid is host session `r`
//! (or a contributed-lecture session once the hosts run out) and column `c`
//! is its `c`-th talk-slot. Talk-slots already taken by existing talks are
//! locked and only ever hold fillers.
//!
//! # Score
//!
//! ```text
//! fullness = Σ rows (talks in the session)²
//! cohesion = Σ hosted lectures similarity(lecture, host)
//!          + Σ contributed sessions Σ pairs similarity(a, b)
//! score    = (fullness + 5·cohesion) / (fullness_max + 5·cohesion_max)
//! ```
//!
//! Squaring the talk count rewards packing lectures into few sessions over
//! spreading them thin.

mod greedy;

pub use greedy::greedy_grid;

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::error::ScheduleError;
use crate::ga::{GeneticConfig, GeneticEngine, GridProblem, Population, RunOutcome};
use crate::models::{topic_similarity, Entity, Grid, MAX_TOPIC_SIMILARITY};
use crate::validation::validate_lectures;

/// Weight of the cohesion term relative to fullness.
pub const COHESION_WEIGHT: f64 = 5.0;

/// Session layout of a mapping problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperLayout {
    /// Talk-slots per session (grid columns).
    pub talks_per_session: usize,
    /// Contributed-lecture sessions appended after the host sessions.
    pub extra_sessions: usize,
}

impl Default for MapperLayout {
    fn default() -> Self {
        Self {
            talks_per_session: 5,
            extra_sessions: 10,
        }
    }
}

/// Score terms of one mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingScore {
    /// Σ (talks per session)².
    pub fullness: u64,
    /// Topic cohesion of hosted and grouped lectures.
    pub cohesion: u64,
    /// Combined score in `[0, 1]`, higher is better.
    pub score: f64,
}

impl fmt::Display for MappingScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "score {:.4} (fullness {}, cohesion {})",
            self.score, self.fullness, self.cohesion
        )
    }
}

/// Result of a mapping run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LectureMapping {
    /// Winning grid (rows = sessions, columns = talk-slots).
    pub grid: Grid,
    /// Its score terms.
    pub score: MappingScore,
    /// Engine summary.
    pub outcome: RunOutcome,
}

/// Genetic lecture-to-session mapper.
///
/// # Example
///
/// ```
/// use u_confsched::ga::GeneticConfig;
/// use u_confsched::mapper::{LectureMapper, MapperLayout};
/// use u_confsched::models::Entity;
///
/// let sessions = vec![Entity::new(0, "Solvers")
///     .with_topics([100, 200, 300])
///     .with_talk("Krylov methods")];
/// let lectures = vec![
///     Entity::new(0, "Multigrid").with_topics([100, 200, 300]),
///     Entity::new(1, "Tensors").with_topics([900, 910, 920]),
/// ];
/// let layout = MapperLayout { talks_per_session: 3, extra_sessions: 2 };
/// let mapper = LectureMapper::new(lectures, sessions, layout)
///     .unwrap()
///     .with_greedy_seed(true);
///
/// let config = GeneticConfig::default()
///     .with_population_size(10)
///     .with_elite_size(2)
///     .with_generations(10)
///     .with_seed(7);
/// let mapping = mapper.map(&config).unwrap();
/// assert!(mapping.score.score > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct LectureMapper {
    lectures: Vec<Entity>,
    hosts: Vec<Entity>,
    layout: MapperLayout,
    /// Existing talks per row; zero for contributed sessions.
    existing: Vec<usize>,
    /// `host_sim[lecture * hosts + row]`.
    host_sim: Vec<u32>,
    /// `pair_sim[a * lectures + b]`.
    pair_sim: Vec<u32>,
    fullness_max: u64,
    cohesion_max: f64,
    greedy_seed: bool,
}

impl LectureMapper {
    /// Builds a mapper; `sessions` with no free talk-slot are left out.
    pub fn new(
        lectures: Vec<Entity>,
        sessions: Vec<Entity>,
        layout: MapperLayout,
    ) -> Result<Self, ScheduleError> {
        let per = layout.talks_per_session;
        let hosts: Vec<Entity> = sessions
            .into_iter()
            .filter(|s| s.talks.len() < per)
            .collect();

        let existing: Vec<usize> = hosts
            .iter()
            .map(|s| s.talks.len())
            .chain(std::iter::repeat(0).take(layout.extra_sessions))
            .collect();
        let open_cells: usize = existing.iter().map(|&e| per - e).sum();
        validate_lectures(&lectures, open_cells).map_err(ScheduleError::InvalidInput)?;

        let n = lectures.len();
        let mut host_sim = Vec::with_capacity(n * hosts.len());
        for l in &lectures {
            host_sim.extend(hosts.iter().map(|h| topic_similarity(&l.topics, &h.topics)));
        }
        let mut pair_sim = Vec::with_capacity(n * n);
        for a in &lectures {
            pair_sim.extend(lectures.iter().map(|b| topic_similarity(&a.topics, &b.topics)));
        }

        let fullness_max = fullness_bound(&existing, per, n);
        let cohesion_max =
            MAX_TOPIC_SIMILARITY as f64 * n as f64 * ((per as f64 - 1.0) / 2.0).max(1.0);
        debug!(
            lectures = n,
            hosts = hosts.len(),
            open_cells,
            fullness_max,
            cohesion_max,
            "lecture mapper built"
        );

        Ok(Self {
            lectures,
            hosts,
            layout,
            existing,
            host_sim,
            pair_sim,
            fullness_max,
            cohesion_max,
            greedy_seed: false,
        })
    }

    /// Starts the population with one greedy grid.
    pub fn with_greedy_seed(mut self, enabled: bool) -> Self {
        self.greedy_seed = enabled;
        self
    }

    /// The session layout.
    pub fn layout(&self) -> MapperLayout {
        self.layout
    }

    /// The lectures; lecture `i` is gene `i`.
    pub fn lectures(&self) -> &[Entity] {
        &self.lectures
    }

    /// Host sessions, one per leading row.
    pub fn hosts(&self) -> &[Entity] {
        &self.hosts
    }

    /// Host session of `row`, `None` for contributed sessions.
    pub fn host_of_row(&self, row: usize) -> Option<&Entity> {
        self.hosts.get(row)
    }

    /// Talks already present in `row`.
    pub fn existing_talks(&self, row: usize) -> usize {
        self.existing[row]
    }

    /// Whether linear cell `index` is taken by an existing talk.
    pub fn is_locked(&self, index: usize) -> bool {
        let cols = self.layout.talks_per_session;
        index % cols < self.existing[index / cols]
    }

    /// Lectures placed in the open cells of `row`.
    pub fn row_lectures<'g>(&'g self, grid: &'g Grid, row: usize) -> impl Iterator<Item = usize> + 'g {
        grid.row(row)[self.existing[row]..]
            .iter()
            .filter(|&&g| self.is_entity(g))
            .map(|&g| g as usize)
    }

    pub(crate) fn host_similarity(&self, lecture: usize, row: usize) -> u32 {
        self.host_sim[lecture * self.hosts.len() + row]
    }

    pub(crate) fn pair_similarity(&self, a: usize, b: usize) -> u32 {
        self.pair_sim[a * self.lectures.len() + b]
    }

    /// Score terms of `grid`; fails unless `grid` is a permutation of
    /// this mapper's shape.
    pub fn score(&self, grid: &Grid) -> Result<MappingScore, ScheduleError> {
        let (rows, cols) = self.shape();
        if grid.rows() != rows || grid.cols() != cols {
            return Err(ScheduleError::GridShape {
                expected: rows * cols,
                actual: grid.len(),
            });
        }
        grid.check_permutation()?;

        let mut fullness = 0u64;
        let mut cohesion = 0u64;
        let mut grouped: Vec<usize> = Vec::with_capacity(self.layout.talks_per_session);

        for row in 0..grid.rows() {
            let hosted = row < self.hosts.len();
            let mut talks = self.existing[row] as u64;
            grouped.clear();
            for l in self.row_lectures(grid, row) {
                talks += 1;
                if hosted {
                    cohesion += self.host_similarity(l, row) as u64;
                } else {
                    cohesion += grouped
                        .iter()
                        .map(|&o| self.pair_similarity(l, o) as u64)
                        .sum::<u64>();
                    grouped.push(l);
                }
            }
            fullness += talks * talks;
        }

        let denominator = self.fullness_max as f64 + COHESION_WEIGHT * self.cohesion_max;
        let score = if denominator > 0.0 {
            (fullness as f64 + COHESION_WEIGHT * cohesion as f64) / denominator
        } else {
            0.0
        };
        Ok(MappingScore {
            fullness,
            cohesion,
            score,
        })
    }

    /// Runs the genetic engine and returns the best repaired grid.
    pub fn map(&self, config: &GeneticConfig) -> Result<LectureMapping, ScheduleError> {
        let engine = GeneticEngine::new(self, config.clone())?;
        let mut population = engine.initialize_population(config.population_size)?;
        let outcome = engine.run(&mut population)?;
        self.finish(population, outcome)
    }

    /// Wraps the best member of a finished population.
    pub fn finish(
        &self,
        population: Population,
        outcome: RunOutcome,
    ) -> Result<LectureMapping, ScheduleError> {
        let grid = population.into_best();
        let score = self.score(&grid)?;
        info!(%score, "lecture mapping ready");
        Ok(LectureMapping {
            grid,
            score,
            outcome,
        })
    }

    /// Moves lectures out of locked cells; returns the number moved.
    pub fn evict_locked(&self, grid: &mut Grid) -> usize {
        let stranded: Vec<usize> = (0..grid.len())
            .filter(|&i| self.is_locked(i) && self.is_entity(grid.cells()[i]))
            .collect();
        if stranded.is_empty() {
            return 0;
        }
        let open: Vec<usize> = (0..grid.len())
            .filter(|&i| !self.is_locked(i) && !self.is_entity(grid.cells()[i]))
            .take(stranded.len())
            .collect();
        for (&from, &to) in stranded.iter().zip(&open) {
            grid.swap(from, to);
        }
        stranded.len().min(open.len())
    }
}

impl GridProblem for LectureMapper {
    fn shape(&self) -> (usize, usize) {
        (self.existing.len(), self.layout.talks_per_session)
    }

    fn n_entities(&self) -> usize {
        self.lectures.len()
    }

    fn rate(&self, grid: &Grid) -> f64 {
        self.score(grid).map_or(0.0, |s| s.score)
    }

    fn repair(&self, grid: &mut Grid) {
        self.evict_locked(grid);
    }

    /// Both cells open and `b` holding a lecture.
    fn can_swap(&self, grid: &Grid, a: usize, b: usize) -> bool {
        a != b && !self.is_locked(a) && !self.is_locked(b) && self.is_entity(grid.cells()[b])
    }

    fn seed_grid(&self) -> Option<Grid> {
        self.greedy_seed.then(|| greedy_grid(self))
    }
}

/// Largest Σ (existing + added)² with at most `per` talks per row and
/// exactly `lectures` added talks.
fn fullness_bound(existing: &[usize], per: usize, lectures: usize) -> u64 {
    let base: u64 = existing.iter().map(|&e| (e * e) as u64).sum();

    // best[b]: largest gain from adding exactly b talks to the rows seen so far
    let mut best: Vec<Option<u64>> = vec![None; lectures + 1];
    best[0] = Some(0);
    for &e in existing {
        let mut next = best.clone();
        for (b, gain) in best.iter().enumerate() {
            let Some(gain) = *gain else {
                continue;
            };
            for x in 1..=(per - e).min(lectures - b) {
                let v = gain + ((e + x) * (e + x) - e * e) as u64;
                if next[b + x].map_or(true, |cur| v > cur) {
                    next[b + x] = Some(v);
                }
            }
        }
        best = next;
    }
    base + best[lectures].unwrap_or(0)
}
