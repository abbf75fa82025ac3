//! Permutation-preserving genetic operators for grids.
//!
//! Crossover and mutation act on the row-major gene sequence of a
//! [`Grid`], so a child of two permutations is again a permutation.
//!
//! # Crossover
//!
//! A non-empty contiguous segment of the first parent ("mom") is copied
//! verbatim; the remaining positions come from the second parent ("dad"):
//!
//! - [`CrossoverType::Order`]: dad's genes in grid order, skipping those
//!   already copied from mom (Davis, 1985).
//! - [`CrossoverType::Mapped`]: dad's gene at the same position, following
//!   the mom-segment mapping while it points at a copied gene
//!   (Goldberg & Lingle, 1985).
//!
//! # Mutation
//!
//! Independent per-gene swaps with a partner position accepted by the
//! problem's [`can_swap`](super::GridProblem::can_swap).
//!
//! # Usage
//!
//! ```
//! use u_confsched::ga::operators::{CrossoverType, GeneticOperators};
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.crossover_type, CrossoverType::Order);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::problem::GridProblem;
use crate::models::{Gene, Grid};

/// How a child fills the positions outside the copied segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CrossoverType {
    /// Order crossover: walk dad in grid order, skip genes copied from mom.
    #[default]
    Order,
    /// Mapped crossover: chase dad's gene through the mom segment.
    Mapped,
}

/// Runtime-selectable crossover plus swap mutation.
#[derive(Debug, Clone, Default)]
pub struct GeneticOperators {
    /// Crossover strategy.
    pub crossover_type: CrossoverType,
    /// Per-gene swap probability.
    pub mutation_rate: f64,
}

impl GeneticOperators {
    /// Creates operators.
    pub fn new(crossover_type: CrossoverType, mutation_rate: f64) -> Self {
        Self {
            crossover_type,
            mutation_rate,
        }
    }

    /// Writes a child of `mom` and `dad` into `child`.
    ///
    /// All three grids must have the same shape.
    pub fn crossover<R: Rng>(&self, mom: &Grid, dad: &Grid, child: &mut Grid, rng: &mut R) {
        let n = mom.len();
        debug_assert_eq!(n, dad.len());
        debug_assert_eq!(n, child.len());

        if n < 2 {
            child.copy_from(mom);
            return;
        }
        let (start, end) = random_segment(n, rng);
        match self.crossover_type {
            CrossoverType::Order => {
                order_fill(mom.cells(), dad.cells(), child.cells_mut(), start, end)
            }
            CrossoverType::Mapped => {
                mapped_fill(mom.cells(), dad.cells(), child.cells_mut(), start, end)
            }
        }
    }

    /// Swap-mutates `grid` in place; returns the number of swaps.
    pub fn mutate<P: GridProblem, R: Rng>(&self, problem: &P, grid: &mut Grid, rng: &mut R) -> usize {
        swap_mutation(problem, grid, self.mutation_rate, rng)
    }
}

/// Random segment `[start, end)` with `1 <= end - start < n`.
///
/// # Panics
/// Panics if `n < 2`.
pub fn random_segment<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    assert!(n >= 2, "segment needs at least two genes");
    let len = rng.random_range(1..n);
    let start = rng.random_range(0..=n - len);
    (start, start + len)
}

/// Order crossover fill.
///
/// Copies `mom[start..end]`, then fills the other positions left to right
/// with dad's genes in grid order that are not in the copied segment.
pub fn order_fill(mom: &[Gene], dad: &[Gene], child: &mut [Gene], start: usize, end: usize) {
    let n = mom.len();
    let mut copied = vec![false; n];
    for i in start..end {
        child[i] = mom[i];
        copied[mom[i] as usize] = true;
    }

    let mut donor = dad.iter().filter(|&&g| !copied[g as usize]);
    for i in (0..start).chain(end..n) {
        if let Some(&g) = donor.next() {
            child[i] = g;
        }
    }
}

/// Mapped crossover fill.
///
/// Copies `mom[start..end]`. Every other position `i` takes `dad[i]`; while
/// that gene was already copied from mom at position `k`, the walk moves on
/// to `dad[k]`.
pub fn mapped_fill(mom: &[Gene], dad: &[Gene], child: &mut [Gene], start: usize, end: usize) {
    let n = mom.len();
    // Position of each copied gene inside mom's segment.
    let mut seg_pos = vec![usize::MAX; n];
    for i in start..end {
        child[i] = mom[i];
        seg_pos[mom[i] as usize] = i;
    }

    for i in (0..start).chain(end..n) {
        let mut cur = i;
        while seg_pos[dad[cur] as usize] != usize::MAX {
            cur = seg_pos[dad[cur] as usize];
        }
        child[i] = dad[cur];
    }
}

/// Per-gene swap mutation.
///
/// Each position is picked with probability `rate` and swapped with a
/// uniformly chosen partner accepted by `problem.can_swap`. Positions
/// without an acceptable partner are left alone.
pub fn swap_mutation<P: GridProblem, R: Rng>(
    problem: &P,
    grid: &mut Grid,
    rate: f64,
    rng: &mut R,
) -> usize {
    let n = grid.len();
    let mut swaps = 0;
    let mut partners = Vec::new();
    for i in 0..n {
        if !rng.random_bool(rate) {
            continue;
        }
        partners.clear();
        partners.extend((0..n).filter(|&j| problem.can_swap(grid, i, j)));
        if partners.is_empty() {
            continue;
        }
        let j = partners[rng.random_range(0..partners.len())];
        grid.swap(i, j);
        swaps += 1;
    }
    swaps
}
