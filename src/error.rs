//! Error types.
//!
//! Only setup can fail, along with grids handed in from outside that are
//! malformed. Infeasible placements are never errors; they lower the
//! score instead.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors raised while setting up an optimization run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    /// The engine configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The entity set failed validation.
    #[error("invalid input: {} problem(s), first: {}", .0.len(), .0.first().map(|e| e.message.as_str()).unwrap_or(""))]
    InvalidInput(Vec<ValidationError>),

    /// A grid does not have the expected number of cells.
    #[error("grid has {actual} cells, expected {expected}")]
    GridShape { expected: usize, actual: usize },

    /// A grid lost or duplicated a gene.
    #[error("grid is not a permutation of 0..{len}")]
    NotPermutation { len: usize },

    /// An operation needed at least one population member.
    #[error("population is empty")]
    EmptyPopulation,
}

/// Invalid engine parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Population size is zero.
    #[error("population_size must be at least 1")]
    ZeroPopulation,

    /// Elites would fill the whole population.
    #[error("elite_size ({elite}) must be smaller than population_size ({population})")]
    EliteTooLarge { elite: usize, population: usize },

    /// Mutation rate is not a probability.
    #[error("mutation_rate must lie in [0, 1], got {0}")]
    MutationRateOutOfRange(f64),

    /// Breeding needs two distinct parents.
    #[error("breeding requires a population of at least 2")]
    TooFewToBreed,
}
