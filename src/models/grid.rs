//! Assignment grid.
//!
//! # Encoding
//!
//! A grid is a dense row-major array of genes. Rows are timeslots (session
//! scheduling) or host sessions (lecture mapping); columns are rooms or
//! talk positions. A gene below the number of entities is an entity id;
//! any other gene is a distinct "empty" filler.
//!
//! Every grid produced by the engine is a permutation of `0..len`: each
//! entity id and each filler value appears exactly once. Deserialized
//! grids go through [`Grid::new`], so their cell count always matches
//! their shape.

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// A gene value (entity id or empty filler).
pub type Gene = u32;

/// One candidate assignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Gene>,
}

/// Unchecked wire form of a [`Grid`].
#[derive(Deserialize)]
struct RawGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Gene>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = ScheduleError;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        Grid::new(raw.rows, raw.cols, raw.cells)
    }
}

impl Grid {
    /// Creates a grid from row-major cells.
    pub fn new(rows: usize, cols: usize, cells: Vec<Gene>) -> Result<Self, ScheduleError> {
        if cells.len() != rows * cols {
            return Err(ScheduleError::GridShape {
                expected: rows * cols,
                actual: cells.len(),
            });
        }
        Ok(Self { rows, cols, cells })
    }

    /// Creates the identity grid `0, 1, 2, ...` in row-major order.
    pub fn identity(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: (0..(rows * cols) as Gene).collect(),
        }
    }

    /// Creates a grid from nested rows.
    pub fn from_rows(rows: Vec<Vec<Gene>>) -> Result<Self, ScheduleError> {
        let nrows = rows.len();
        let ncols = rows.first().map(Vec::len).unwrap_or(0);
        let cells: Vec<Gene> = rows.into_iter().flatten().collect();
        Self::new(nrows, ncols, cells)
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of genes.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Gene at (row, col).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Gene {
        self.cells[row * self.cols + col]
    }

    /// Sets the gene at (row, col).
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, gene: Gene) {
        self.cells[row * self.cols + col] = gene;
    }

    /// Row-major genes.
    #[inline]
    pub fn cells(&self) -> &[Gene] {
        &self.cells
    }

    /// Mutable row-major genes.
    #[inline]
    pub fn cells_mut(&mut self) -> &mut [Gene] {
        &mut self.cells
    }

    /// Genes of one row.
    #[inline]
    pub fn row(&self, row: usize) -> &[Gene] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    /// Mutable genes of one row.
    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [Gene] {
        &mut self.cells[row * self.cols..(row + 1) * self.cols]
    }

    /// Row of a linear index.
    #[inline]
    pub fn row_of(&self, index: usize) -> usize {
        index / self.cols
    }

    /// Column of a linear index.
    #[inline]
    pub fn col_of(&self, index: usize) -> usize {
        index % self.cols
    }

    /// Swaps two linear positions.
    #[inline]
    pub fn swap(&mut self, a: usize, b: usize) {
        self.cells.swap(a, b);
    }

    /// Overwrites this grid's genes with another grid of the same shape.
    pub fn copy_from(&mut self, other: &Grid) {
        debug_assert_eq!(self.cells.len(), other.cells.len());
        self.cells.copy_from_slice(&other.cells);
    }

    /// Linear position of every entity id below `n_entities`.
    ///
    /// Entities absent from the grid map to `usize::MAX`.
    pub fn positions(&self, n_entities: usize) -> Vec<usize> {
        let mut pos = vec![usize::MAX; n_entities];
        for (i, &g) in self.cells.iter().enumerate() {
            if (g as usize) < n_entities {
                pos[g as usize] = i;
            }
        }
        pos
    }

    /// Whether the grid holds every value of `0..len` exactly once.
    pub fn is_valid_permutation(&self) -> bool {
        let n = self.cells.len();
        let mut seen = vec![false; n];
        for &g in &self.cells {
            let g = g as usize;
            if g >= n || seen[g] {
                return false;
            }
            seen[g] = true;
        }
        true
    }

    /// Fails with [`ScheduleError::NotPermutation`] unless the grid holds
    /// every value of `0..len` exactly once.
    pub fn check_permutation(&self) -> Result<(), ScheduleError> {
        if self.is_valid_permutation() {
            Ok(())
        } else {
            Err(ScheduleError::NotPermutation { len: self.len() })
        }
    }

    /// Whether both grids hold the same multiset of genes.
    pub fn is_permutation_of(&self, other: &Grid) -> bool {
        if self.cells.len() != other.cells.len() {
            return false;
        }
        let mut a = self.cells.clone();
        let mut b = other.cells.clone();
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }

    /// Nested-row view (for reports and persistence).
    pub fn to_rows(&self) -> Vec<Vec<Gene>> {
        self.cells.chunks(self.cols.max(1)).map(<[Gene]>::to_vec).collect()
    }
}
