//! Grid problem definition.
//!
//! [`GridProblem`] is the seam between the generic engine and a concrete
//! assignment variant. The engine only shuffles, recombines and swaps genes;
//! everything that knows what a gene means lives behind this trait.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{Gene, Grid};

/// A permutation-encoded grid assignment problem.
///
/// Implementors must be `Sync`: the engine evaluates and repairs population
/// members in parallel.
///
/// # Contract
///
/// - Every grid is a permutation of `0..rows * cols`. Values below
///   [`n_entities`](Self::n_entities) are entities, the rest are empty fillers.
/// - [`repair`](Self::repair) only permutes cells, and applying it twice
///   gives the same grid as applying it once.
/// - [`rate`](Self::rate) returns a value in `[0, 1]`, higher is better.
pub trait GridProblem: Sync {
    /// Grid shape as `(rows, cols)`.
    fn shape(&self) -> (usize, usize);

    /// Number of real entities.
    fn n_entities(&self) -> usize;

    /// Fitness of a grid.
    fn rate(&self, grid: &Grid) -> f64;

    /// Deterministic constraint normalization.
    fn repair(&self, _grid: &mut Grid) {}

    /// Whether mutation may swap linear positions `a` and `b`.
    fn can_swap(&self, _grid: &Grid, a: usize, b: usize) -> bool {
        a != b
    }

    /// A constructed starting grid, placed at member 0 of the initial population.
    fn seed_grid(&self) -> Option<Grid> {
        None
    }

    /// A uniformly random grid.
    fn random_grid<R: Rng>(&self, rng: &mut R) -> Grid {
        let (rows, cols) = self.shape();
        let mut grid = Grid::identity(rows, cols);
        grid.cells_mut().shuffle(rng);
        grid
    }

    /// Whether a gene is a real entity.
    #[inline]
    fn is_entity(&self, gene: Gene) -> bool {
        (gene as usize) < self.n_entities()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    struct Fixed;

    impl GridProblem for Fixed {
        fn shape(&self) -> (usize, usize) {
            (3, 4)
        }
        fn n_entities(&self) -> usize {
            7
        }
        fn rate(&self, _grid: &Grid) -> f64 {
            0.5
        }
    }

    #[test]
    fn test_random_grid_is_permutation() {
        let mut rng = SmallRng::seed_from_u64(42);
        let g = Fixed.random_grid(&mut rng);
        assert_eq!((g.rows(), g.cols()), (3, 4));
        assert!(g.is_valid_permutation());
    }

    #[test]
    fn test_defaults() {
        let g = Grid::identity(3, 4);
        assert!(Fixed.can_swap(&g, 0, 1));
        assert!(!Fixed.can_swap(&g, 2, 2));
        assert!(Fixed.seed_grid().is_none());
        assert!(Fixed.is_entity(6));
        assert!(!Fixed.is_entity(7));
    }
}
