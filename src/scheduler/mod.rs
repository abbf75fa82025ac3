//! Session scheduling: entities onto a (timeslot × room) grid.
//!
//! [`SessionScheduler`] ties the entity set, the penalty model and the
//! repair passes together and exposes them to the genetic engine as a
//! [`GridProblem`].
//!
//! # Algorithm
//!
//! Random permutations (optionally plus one greedy grid) are evolved by
//! [`GeneticEngine`]; every generation is repaired before it is scored.
//!
//! # References
//!
//! - Vangerven et al. (2018), "Conference scheduling: a personalized approach"
//! - Thompson (2002), "Improving Conferences through Session Scheduling"

mod greedy;
pub mod repair;

pub use greedy::{greedy_grid, CONFLICT_WEIGHT};
pub use repair::repair;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ScheduleError;
use crate::ga::{GeneticConfig, GeneticEngine, GridProblem, Population, RunOutcome};
use crate::models::{CitationIndex, Entity, EntitySet, Gene, Grid, Resources};
use crate::penalty::{PenaltyModel, ScoreBreakdown};

/// Result of a scheduling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSchedule {
    /// Winning grid (rows = timeslots, columns = rooms).
    pub grid: Grid,
    /// Its penalty terms.
    pub breakdown: ScoreBreakdown,
    /// Engine summary.
    pub outcome: RunOutcome,
}

/// Genetic session scheduler.
///
/// # Example
///
/// ```
/// use u_confsched::ga::GeneticConfig;
/// use u_confsched::models::{CitationIndex, Entity, Resources};
/// use u_confsched::scheduler::SessionScheduler;
///
/// let entities = vec![
///     Entity::new(0, "Solvers - Part I of II").with_participant("Ada"),
///     Entity::new(1, "Solvers - Part II of II").with_participant("Ada"),
///     Entity::new(2, "Meshing").with_participant("Grace"),
/// ];
/// let scheduler = SessionScheduler::new(
///     entities,
///     &Resources::uniform(2, 3, 4),
///     &CitationIndex::new(),
/// )
/// .unwrap()
/// .with_greedy_seed(true);
///
/// let config = GeneticConfig::default()
///     .with_population_size(20)
///     .with_elite_size(2)
///     .with_generations(20)
///     .with_seed(42);
/// let result = scheduler.schedule(&config).unwrap();
/// assert_eq!(result.breakdown.order, 0);
/// ```
#[derive(Debug, Clone)]
pub struct SessionScheduler {
    model: PenaltyModel,
    greedy_seed: bool,
}

impl SessionScheduler {
    /// Validates the input and precomputes relations and bounds.
    pub fn new(
        entities: Vec<Entity>,
        resources: &Resources,
        citations: &CitationIndex,
    ) -> Result<Self, ScheduleError> {
        Ok(Self::from_set(EntitySet::new(entities, resources, citations)?))
    }

    /// Creates a scheduler over an already built entity set.
    pub fn from_set(set: EntitySet) -> Self {
        Self {
            model: PenaltyModel::new(set),
            greedy_seed: false,
        }
    }

    /// Starts the population with one greedy grid.
    pub fn with_greedy_seed(mut self, enabled: bool) -> Self {
        self.greedy_seed = enabled;
        self
    }

    /// The entity set.
    pub fn entities(&self) -> &EntitySet {
        self.model.entities()
    }

    /// The penalty model.
    pub fn model(&self) -> &PenaltyModel {
        &self.model
    }

    /// Per-term score of a grid; fails on a malformed grid.
    pub fn score(&self, grid: &Grid) -> Result<ScoreBreakdown, ScheduleError> {
        self.model.score(grid)
    }

    /// Runs the genetic engine and returns the best repaired grid.
    pub fn schedule(&self, config: &GeneticConfig) -> Result<SessionSchedule, ScheduleError> {
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
    ) -> Result<SessionSchedule, ScheduleError> {
        let grid = population.into_best();
        let breakdown = self.score(&grid)?;
        info!(%breakdown, "session schedule ready");
        Ok(SessionSchedule {
            grid,
            breakdown,
            outcome,
        })
    }
}

impl GridProblem for SessionScheduler {
    fn shape(&self) -> (usize, usize) {
        let set = self.model.entities();
        (set.nslots(), set.nrooms())
    }

    fn n_entities(&self) -> usize {
        self.model.entities().len()
    }

    fn rate(&self, grid: &Grid) -> f64 {
        self.model.rate(grid)
    }

    fn repair(&self, grid: &mut Grid) {
        repair::repair(self.model.entities(), grid);
    }

    /// Rejects swaps that would move an entity into a timeslot it may not
    /// occupy.
    fn can_swap(&self, grid: &Grid, a: usize, b: usize) -> bool {
        let set = self.model.entities();
        let admits = |gene: Gene, cell: usize| {
            !set.is_entity(gene) || set.is_valid_slot(gene as usize, grid.row_of(cell))
        };
        a != b && admits(grid.cells()[a], b) && admits(grid.cells()[b], a)
    }

    fn seed_grid(&self) -> Option<Grid> {
        self.greedy_seed.then(|| greedy_grid(self.model.entities()))
    }
}
