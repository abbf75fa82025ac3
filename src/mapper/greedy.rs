//! Constructive starting grid for lecture mapping.
//!
//! # Algorithm
//!
//! For each similarity goal from the maximum down to 1:
//! 1. Fill every free talk-slot of a host session with the first unused
//!    lecture whose similarity to the host equals the goal.
//! 2. Open every empty contributed session with the first unused pair of
//!    lectures whose mutual similarity equals the goal.
//! 3. Extend every opened contributed session with the unused lecture of
//!    highest mean similarity to its members, while that mean reaches
//!    the goal.
//!
//! Leftover lectures then take the free talk-slots in row-major order and
//! fillers take every remaining cell in ascending order.

use super::LectureMapper;
use crate::ga::GridProblem;
use crate::models::{Gene, Grid, MAX_TOPIC_SIMILARITY};

/// Builds a greedy grid for `mapper`.
pub fn greedy_grid(mapper: &LectureMapper) -> Grid {
    let (rows, cols) = mapper.shape();
    let nhosts = mapper.hosts().len();
    let mut cells: Vec<Option<usize>> = vec![None; rows * cols];
    let mut unused: Vec<usize> = (0..mapper.n_entities()).collect();

    for goal in (1..=MAX_TOPIC_SIMILARITY).rev() {
        for row in 0..nhosts {
            for col in mapper.existing_talks(row)..cols {
                let cell = &mut cells[row * cols + col];
                if cell.is_some() {
                    continue;
                }
                if let Some(k) = unused
                    .iter()
                    .position(|&l| mapper.host_similarity(l, row) == goal)
                {
                    *cell = Some(unused.remove(k));
                }
            }
        }

        for row in nhosts..rows {
            let members = &mut cells[row * cols..(row + 1) * cols];
            if cols >= 2 && members[0].is_none() {
                if let Some((i, j)) = matching_pair(mapper, &unused, goal) {
                    members[0] = Some(unused[i]);
                    members[1] = Some(unused[j]);
                    unused.remove(j);
                    unused.remove(i);
                }
            }
            if members[0].is_some() {
                extend_session(mapper, members, &mut unused, goal);
            }
        }
    }

    let mut leftovers = unused.into_iter();
    for (index, cell) in cells.iter_mut().enumerate() {
        if cell.is_none() && !mapper.is_locked(index) {
            match leftovers.next() {
                Some(l) => *cell = Some(l),
                None => break,
            }
        }
    }

    let mut filler = mapper.n_entities() as Gene;
    let genes: Vec<Gene> = cells
        .into_iter()
        .map(|c| match c {
            Some(l) => l as Gene,
            None => {
                filler += 1;
                filler - 1
            }
        })
        .collect();
    Grid::new(rows, cols, genes).unwrap_or_else(|_| Grid::identity(rows, cols))
}

/// First unused pair `(i, j)`, `i < j`, with similarity equal to `goal`.
fn matching_pair(mapper: &LectureMapper, unused: &[usize], goal: u32) -> Option<(usize, usize)> {
    (0..unused.len()).find_map(|i| {
        (i + 1..unused.len())
            .find(|&j| mapper.pair_similarity(unused[i], unused[j]) == goal)
            .map(|j| (i, j))
    })
}

fn extend_session(
    mapper: &LectureMapper,
    members: &mut [Option<usize>],
    unused: &mut Vec<usize>,
    goal: u32,
) {
    for col in 0..members.len() {
        if members[col].is_some() {
            continue;
        }
        let placed: Vec<usize> = members[..col].iter().flatten().copied().collect();
        let mean = |l: usize| {
            placed
                .iter()
                .map(|&m| mapper.pair_similarity(m, l) as f64)
                .sum::<f64>()
                / placed.len() as f64
        };
        let best = unused
            .iter()
            .enumerate()
            .map(|(k, &l)| (k, mean(l)))
            .fold(None, |best: Option<(usize, f64)>, (k, m)| match best {
                Some((_, bm)) if bm >= m => best,
                _ => Some((k, m)),
            });
        match best {
            Some((k, m)) if m >= goal as f64 => members[col] = Some(unused.remove(k)),
            _ => break,
        }
    }
}
