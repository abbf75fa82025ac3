//! Genetic algorithm over permutation-encoded grids.
//!
//! # Encoding
//!
//! A candidate is a [`Grid`](crate::models::Grid) whose cells form a
//! permutation of `0..rows * cols`. Values below the number of entities
//! are entities; the rest are distinct empty fillers. Every operator keeps
//! this invariant.
//!
//! # Submodules
//!
//! - [`operators`]: Runtime-selectable crossover and swap mutation
//! - [`selection`]: Roulette-wheel weights and parent draws
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"

mod config;
mod engine;
pub mod operators;
mod population;
mod problem;
pub mod selection;

pub use config::GeneticConfig;
pub use engine::{GeneticEngine, Progress, RunOutcome};
pub use operators::{CrossoverType, GeneticOperators};
pub use population::Population;
pub use problem::GridProblem;
