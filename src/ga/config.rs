//! Engine configuration.
//!
//! [`GeneticConfig`] holds every parameter of the evolutionary loop.

use serde::{Deserialize, Serialize};

use super::operators::CrossoverType;
use crate::error::ConfigError;

/// Configuration for the genetic engine.
///
/// # Defaults
///
/// ```
/// use u_confsched::ga::GeneticConfig;
///
/// let config = GeneticConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.elite_size, 20);
/// assert_eq!(config.generations, 1000);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_confsched::ga::{CrossoverType, GeneticConfig};
///
/// let config = GeneticConfig::default()
///     .with_population_size(200)
///     .with_elite_size(10)
///     .with_mutation_rate(0.02)
///     .with_crossover(CrossoverType::Mapped)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticConfig {
    /// Number of grids per generation.
    pub population_size: usize,

    /// Members copied unchanged (and never mutated) into the next generation.
    pub elite_size: usize,

    /// Per-gene swap probability for non-elite members.
    pub mutation_rate: f64,

    /// Generation budget.
    pub generations: usize,

    /// Random seed. `None` draws one from the thread RNG and logs it.
    pub seed: Option<u64>,

    /// Repair, evaluate, breed and mutate members on the rayon pool.
    pub parallel: bool,

    /// Report progress every this many generations (0 = only at the end).
    pub snapshot_interval: usize,

    /// How children inherit genes from the second parent.
    pub crossover: CrossoverType,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            elite_size: 20,
            mutation_rate: 0.01,
            generations: 1000,
            seed: None,
            parallel: true,
            snapshot_interval: 0,
            crossover: CrossoverType::Order,
        }
    }
}

impl GeneticConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of elites.
    pub fn with_elite_size(mut self, n: usize) -> Self {
        self.elite_size = n;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the generation budget.
    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the progress reporting interval.
    pub fn with_snapshot_interval(mut self, every: usize) -> Self {
        self.snapshot_interval = every;
        self
    }

    /// Sets the crossover strategy.
    pub fn with_crossover(mut self, crossover: CrossoverType) -> Self {
        self.crossover = crossover;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_sizes(self.population_size, self.elite_size)?;
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::MutationRateOutOfRange(self.mutation_rate));
        }
        Ok(())
    }
}

/// Checks a population size against an elite count.
pub(crate) fn validate_sizes(population: usize, elite: usize) -> Result<(), ConfigError> {
    if population == 0 {
        return Err(ConfigError::ZeroPopulation);
    }
    if elite >= population {
        return Err(ConfigError::EliteTooLarge { elite, population });
    }
    if population < 2 {
        return Err(ConfigError::TooFewToBreed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeneticConfig::default();
        assert_eq!(config.population_size, 100);
        assert_eq!(config.elite_size, 20);
        assert!((config.mutation_rate - 0.01).abs() < 1e-12);
        assert_eq!(config.generations, 1000);
        assert!(config.seed.is_none());
        assert!(config.parallel);
        assert_eq!(config.snapshot_interval, 0);
        assert_eq!(config.crossover, CrossoverType::Order);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = GeneticConfig::default()
            .with_population_size(50)
            .with_elite_size(5)
            .with_mutation_rate(0.05)
            .with_generations(10)
            .with_seed(42)
            .with_parallel(false)
            .with_snapshot_interval(2)
            .with_crossover(CrossoverType::Mapped);

        assert_eq!(config.population_size, 50);
        assert_eq!(config.elite_size, 5);
        assert!((config.mutation_rate - 0.05).abs() < 1e-12);
        assert_eq!(config.generations, 10);
        assert_eq!(config.seed, Some(42));
        assert!(!config.parallel);
        assert_eq!(config.snapshot_interval, 2);
        assert_eq!(config.crossover, CrossoverType::Mapped);
    }

    #[test]
    fn test_validate_zero_population() {
        let config = GeneticConfig::default().with_population_size(0).with_elite_size(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroPopulation));
    }

    #[test]
    fn test_validate_elite_too_large() {
        let config = GeneticConfig::default().with_population_size(10).with_elite_size(10);
        assert_eq!(
            config.validate(),
            Err(ConfigError::EliteTooLarge {
                elite: 10,
                population: 10
            })
        );
    }

    #[test]
    fn test_validate_mutation_rate() {
        let config = GeneticConfig::default().with_mutation_rate(1.5);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MutationRateOutOfRange(_))
        ));
        let config = GeneticConfig::default().with_mutation_rate(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_single_member() {
        let config = GeneticConfig::default().with_population_size(1).with_elite_size(0);
        assert_eq!(config.validate(), Err(ConfigError::TooFewToBreed));
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = GeneticConfig::default().with_seed(3);
        let json = serde_json::to_string(&config).unwrap();
        let back: GeneticConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);

        let partial: GeneticConfig = serde_json::from_str(r#"{"generations": 5}"#).unwrap();
        assert_eq!(partial.generations, 5);
        assert_eq!(partial.population_size, 100);
    }
}
