//! Population store.
//!
//! Two equally shaped grid buffers ("current" and "next"), per-member
//! fitness, rank-ordered selection weights and the ranking itself. Only
//! `current` is meaningful between generations.

use std::cmp::Ordering;

use crate::error::ScheduleError;
use crate::models::Grid;

/// A generation of candidate grids.
#[derive(Debug, Clone)]
pub struct Population {
    pub(crate) current: Vec<Grid>,
    pub(crate) next: Vec<Grid>,
    pub(crate) fitness: Vec<f64>,
    pub(crate) weights: Vec<f64>,
    pub(crate) ranking: Vec<usize>,
}

impl Population {
    /// Creates a population from its initial members.
    ///
    /// All members must share one shape. Fitness is zero until evaluated.
    pub fn new(members: Vec<Grid>) -> Result<Self, ScheduleError> {
        let first = members.first().ok_or(ScheduleError::EmptyPopulation)?;
        let (rows, cols) = (first.rows(), first.cols());
        if let Some(bad) = members.iter().find(|g| g.rows() != rows || g.cols() != cols) {
            return Err(ScheduleError::GridShape {
                expected: rows * cols,
                actual: bad.len(),
            });
        }

        let n = members.len();
        Ok(Self {
            next: members.clone(),
            current: members,
            fitness: vec![0.0; n],
            weights: vec![1.0 / n as f64; n],
            ranking: (0..n).collect(),
        })
    }

    /// Number of members.
    #[inline]
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Whether the population is empty (never true for a constructed one).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Shape shared by every member.
    pub fn shape(&self) -> (usize, usize) {
        self.current
            .first()
            .map_or((0, 0), |g| (g.rows(), g.cols()))
    }

    /// Current members.
    #[inline]
    pub fn members(&self) -> &[Grid] {
        &self.current
    }

    /// One current member.
    #[inline]
    pub fn member(&self, index: usize) -> &Grid {
        &self.current[index]
    }

    /// Fitness per member, as of the last evaluation.
    #[inline]
    pub fn fitness(&self) -> &[f64] {
        &self.fitness
    }

    /// Selection weights in rank order.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Member indices sorted by descending fitness.
    #[inline]
    pub fn ranking(&self) -> &[usize] {
        &self.ranking
    }

    /// Index of the fittest member; ties go to the lowest index.
    pub fn best_index(&self) -> usize {
        let mut best = 0;
        for (i, &f) in self.fitness.iter().enumerate() {
            if f > self.fitness[best] {
                best = i;
            }
        }
        best
    }

    /// Fitness of the best member.
    pub fn best_score(&self) -> f64 {
        self.fitness.get(self.best_index()).copied().unwrap_or(0.0)
    }

    /// The winning grid.
    pub fn best_assignment(&self) -> &Grid {
        &self.current[self.best_index()]
    }

    /// Consumes the population and returns the winning grid.
    pub fn into_best(mut self) -> Grid {
        let best = self.best_index();
        self.current.swap_remove(best)
    }

    /// Sorts the ranking by descending fitness, ties by index.
    pub(crate) fn rank(&mut self) {
        let fitness = &self.fitness;
        self.ranking
            .sort_by(|&a, &b| match fitness[b].total_cmp(&fitness[a]) {
                Ordering::Equal => a.cmp(&b),
                other => other,
            });
    }

    /// Makes the next buffer current.
    pub(crate) fn swap_buffers(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn population(n: usize) -> Population {
        Population::new((0..n).map(|_| Grid::identity(2, 3)).collect()).unwrap()
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(
            Population::new(Vec::new()).unwrap_err(),
            ScheduleError::EmptyPopulation
        );
    }

    #[test]
    fn test_mixed_shapes_rejected() {
        let err = Population::new(vec![Grid::identity(2, 3), Grid::identity(3, 3)]).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::GridShape {
                expected: 6,
                actual: 9
            }
        );
    }

    #[test]
    fn test_rank_descending_with_index_ties() {
        let mut pop = population(4);
        pop.fitness = vec![0.2, 0.8, 0.8, 0.5];
        pop.rank();
        assert_eq!(pop.ranking(), &[1, 2, 3, 0]);
        assert_eq!(pop.best_index(), 1);
        assert!((pop.best_score() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_swap_buffers() {
        let mut pop = population(2);
        pop.next[0] = Grid::new(2, 3, vec![5, 4, 3, 2, 1, 0]).unwrap();
        pop.swap_buffers();
        assert_eq!(pop.member(0).cells(), &[5, 4, 3, 2, 1, 0]);
        assert_eq!(pop.shape(), (2, 3));
    }

    #[test]
    fn test_into_best() {
        let mut pop = population(3);
        pop.current[2] = Grid::new(2, 3, vec![1, 0, 2, 3, 4, 5]).unwrap();
        pop.fitness = vec![0.1, 0.1, 0.4];
        assert_eq!(pop.best_assignment().cells()[0], 1);
        assert_eq!(pop.into_best().cells()[0], 1);
    }
}
