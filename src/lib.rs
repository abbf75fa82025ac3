//! Genetic conference scheduling.
//!
//! Assigns conference sessions to (timeslot × room) grids and contributed
//! lectures to (session × talk-slot) grids with a permutation-encoded
//! genetic algorithm.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Entity`, `EntitySet`, `Resources`,
//!   `Grid`, topic codes and citation lookups
//! - **`validation`**: Input integrity checks (duplicate IDs and parts,
//!   resource references, admissible timeslots, grid capacity)
//! - **`penalty`**: Session penalty terms, analytic bounds and the
//!   normalized score
//! - **`ga`**: Problem-agnostic genetic engine over [`ga::GridProblem`]
//! - **`scheduler`**: Session scheduling with repair and a greedy seed
//! - **`mapper`**: Lecture-to-session mapping
//!
//! # Architecture
//!
//! The engine only knows grids of genes. Each variant implements
//! [`ga::GridProblem`] to give genes their meaning: how a grid is scored,
//! how it is repaired, and which cells mutation may touch. Runs are
//! reproducible for a fixed seed, sequential or parallel.
//!
//! # References
//!
//! - Vangerven et al. (2018), "Conference scheduling: a personalized approach"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"

pub mod error;
pub mod ga;
pub mod mapper;
pub mod models;
pub mod penalty;
pub mod scheduler;
pub mod validation;

pub use error::{ConfigError, ScheduleError};
