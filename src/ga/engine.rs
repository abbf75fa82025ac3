//! Generation loop.
//!
//! # Algorithm
//!
//! Per generation:
//! 1. Repair every member of the current buffer
//! 2. Evaluate and rank (descending fitness, ties by index)
//! 3. Stop if the budget is spent or the best fitness reached 1.0
//! 4. Compute roulette weights
//! 5. Copy the top `elite_size` members into the next buffer, in rank order
//! 6. Breed the remaining members from two distinct roulette-drawn parents
//! 7. Mutate every non-elite member of the next buffer
//! 8. Swap buffers
//!
//! Steps 1, 2, 6 and 7 are independent per member and run on the rayon
//! pool when [`GeneticConfig::parallel`] is set. Every member draws from
//! its own ChaCha stream keyed by (generation, member, phase), so a fixed
//! seed gives the same run with or without parallelism.
//!
//! # Reference
//! Holland (1975), "Adaptation in Natural and Artificial Systems"

use std::ops::ControlFlow;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::config::{validate_sizes, GeneticConfig};
use super::operators::GeneticOperators;
use super::population::Population;
use super::problem::GridProblem;
use super::selection::{compute_weights, select_parents};
use crate::error::ScheduleError;
use crate::models::Grid;

const PHASE_INIT: u64 = 0;
const PHASE_BREED: u64 = 1;
const PHASE_MUTATE: u64 = 2;

/// Snapshot handed to a progress observer.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    /// Generations completed so far.
    pub generation: usize,
    /// Best fitness of the current population.
    pub best_score: f64,
    /// Best grid of the current population.
    pub best: &'a Grid,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Index of the best member in the final population.
    pub best_index: usize,
    /// Fitness of that member.
    pub best_score: f64,
    /// Generations bred before stopping.
    pub generations_run: usize,
    /// Best fitness of every evaluated population, first to last.
    pub history: Vec<f64>,
    /// Seed the run used.
    pub seed: u64,
}

/// Genetic engine over a [`GridProblem`].
///
/// # Example
///
/// ```no_run
/// use u_confsched::ga::{GeneticConfig, GeneticEngine};
/// # fn demo<P: u_confsched::ga::GridProblem>(problem: &P) -> Result<(), u_confsched::ScheduleError> {
/// let config = GeneticConfig::default().with_seed(42);
/// let engine = GeneticEngine::new(problem, config)?;
/// let mut population = engine.initialize_population(100)?;
/// let outcome = engine.run(&mut population)?;
/// println!("best {:.4}", outcome.best_score);
/// # Ok(())
/// # }
/// ```
pub struct GeneticEngine<'a, P: GridProblem> {
    problem: &'a P,
    config: GeneticConfig,
    operators: GeneticOperators,
    seed: u64,
}

impl<'a, P: GridProblem> GeneticEngine<'a, P> {
    /// Creates an engine; fails on an invalid configuration.
    pub fn new(problem: &'a P, config: GeneticConfig) -> Result<Self, ScheduleError> {
        config.validate()?;
        let seed = match config.seed {
            Some(seed) => seed,
            None => {
                let seed: u64 = rand::rng().random();
                info!(seed, "no seed configured; drew one");
                seed
            }
        };
        let operators = GeneticOperators::new(config.crossover, config.mutation_rate);
        Ok(Self {
            problem,
            config,
            operators,
            seed,
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &GeneticConfig {
        &self.config
    }

    /// The seed in use.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Random initial population.
    ///
    /// Member 0 is the problem's seed grid when it offers one.
    pub fn initialize_population(&self, size: usize) -> Result<Population, ScheduleError> {
        validate_sizes(size, 0)?;
        let mut members: Vec<Grid> = (0..size)
            .map(|m| {
                let mut rng = self.stream(0, m, PHASE_INIT);
                self.problem.random_grid(&mut rng)
            })
            .collect();

        if let Some(seed) = self.problem.seed_grid() {
            self.check_grid(&seed)?;
            debug!("seeding member 0 with constructed grid");
            members[0] = seed;
        }
        Population::new(members)
    }

    /// Runs the configured number of generations.
    pub fn run(&self, population: &mut Population) -> Result<RunOutcome, ScheduleError> {
        self.run_with_observer(population, |_| ControlFlow::Continue(()))
    }

    /// Runs the generation loop, reporting progress.
    ///
    /// `observer` is called every `snapshot_interval` generations (if
    /// non-zero) and once at the end. Returning [`ControlFlow::Break`]
    /// stops the run after the current generation has been evaluated.
    #[instrument(skip_all, fields(seed = self.seed))]
    pub fn run_with_observer<F>(
        &self,
        population: &mut Population,
        mut observer: F,
    ) -> Result<RunOutcome, ScheduleError>
    where
        F: FnMut(&Progress<'_>) -> ControlFlow<()>,
    {
        validate_sizes(population.len(), self.config.elite_size)?;
        for grid in population.members() {
            self.check_grid(grid)?;
        }

        let elite = self.config.elite_size;
        let budget = self.config.generations;
        let interval = self.config.snapshot_interval;
        info!(
            population = population.len(),
            elite,
            generations = budget,
            mutation_rate = self.config.mutation_rate,
            "genetic run started"
        );

        let mut history = Vec::with_capacity(budget + 1);
        let mut generation = 0;
        loop {
            self.repair_all(&mut population.current);
            self.evaluate(population);
            population.rank();

            let best = population.ranking[0];
            let best_score = population.fitness[best];
            history.push(best_score);
            let worst_score = population.ranking.last().map_or(best_score, |&w| population.fitness[w]);
            debug!(generation, best_score, worst_score, "generation evaluated");

            if generation >= budget || best_score >= 1.0 {
                break;
            }
            if interval > 0 && generation > 0 && generation % interval == 0 {
                let progress = Progress {
                    generation,
                    best_score,
                    best: &population.current[best],
                };
                if observer(&progress).is_break() {
                    info!(generation, "run stopped by observer");
                    break;
                }
            }

            population.weights = compute_weights(&population.fitness, &population.ranking);
            self.breed(population, generation);
            self.mutate(&mut population.next, generation);
            debug_assert!(population.next.iter().all(Grid::is_valid_permutation));
            population.swap_buffers();
            generation += 1;
        }

        let outcome = RunOutcome {
            best_index: population.best_index(),
            best_score: population.best_score(),
            generations_run: generation,
            history,
            seed: self.seed,
        };
        let last = Progress {
            generation,
            best_score: outcome.best_score,
            best: population.best_assignment(),
        };
        if observer(&last).is_break() {
            debug!(generation, "observer break after final report ignored");
        }
        info!(
            generations = outcome.generations_run,
            best_score = outcome.best_score,
            best_index = outcome.best_index,
            "genetic run finished"
        );
        Ok(outcome)
    }

    /// Independent random stream for one member in one phase.
    fn stream(&self, generation: usize, member: usize, phase: u64) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(((generation as u64) << 32) | ((member as u64) << 2) | phase);
        rng
    }

    /// Shape and permutation check for grids coming from outside the loop.
    fn check_grid(&self, grid: &Grid) -> Result<(), ScheduleError> {
        let (rows, cols) = self.problem.shape();
        if grid.rows() != rows || grid.cols() != cols {
            return Err(ScheduleError::GridShape {
                expected: rows * cols,
                actual: grid.len(),
            });
        }
        grid.check_permutation()
    }

    fn repair_all(&self, grids: &mut [Grid]) {
        let problem = self.problem;
        if self.config.parallel {
            grids.par_iter_mut().for_each(|g| problem.repair(g));
        } else {
            grids.iter_mut().for_each(|g| problem.repair(g));
        }
    }

    fn evaluate(&self, population: &mut Population) {
        let problem = self.problem;
        population.fitness = if self.config.parallel {
            population.current.par_iter().map(|g| problem.rate(g)).collect()
        } else {
            population.current.iter().map(|g| problem.rate(g)).collect()
        };
    }

    /// Fills the next buffer: elites in rank order, then children.
    fn breed(&self, population: &mut Population, generation: usize) {
        let elite = self.config.elite_size;
        let Population {
            current,
            next,
            weights,
            ranking,
            ..
        } = population;
        let (current, weights, ranking) = (&*current, &*weights, &*ranking);

        let make = |m: usize, child: &mut Grid| {
            if m < elite {
                child.copy_from(&current[ranking[m]]);
            } else {
                let mut rng = self.stream(generation, m, PHASE_BREED);
                let (mom, dad) = select_parents(weights, ranking, &mut rng);
                self.operators
                    .crossover(&current[mom], &current[dad], child, &mut rng);
            }
        };

        if self.config.parallel {
            next.par_iter_mut()
                .enumerate()
                .for_each(|(m, child)| make(m, child));
        } else {
            next.iter_mut()
                .enumerate()
                .for_each(|(m, child)| make(m, child));
        }
    }

    /// Mutates every non-elite member.
    fn mutate(&self, next: &mut [Grid], generation: usize) {
        let elite = self.config.elite_size;
        let apply = |m: usize, grid: &mut Grid| {
            let mut rng = self.stream(generation, m, PHASE_MUTATE);
            self.operators.mutate(self.problem, grid, &mut rng);
        };

        if self.config.parallel {
            next.par_iter_mut()
                .enumerate()
                .skip(elite)
                .for_each(|(m, grid)| apply(m, grid));
        } else {
            next.iter_mut()
                .enumerate()
                .skip(elite)
                .for_each(|(m, grid)| apply(m, grid));
        }
    }
}
