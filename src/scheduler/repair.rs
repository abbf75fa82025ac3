//! Deterministic repair of session grids.
//!
//! # Passes
//!
//! 0. **Timeslots**: an entity sitting in a timeslot it may not occupy
//!    exchanges cells with a filler in one of its admissible timeslots, or
//!    with an entity that may occupy the vacated timeslot.
//! 1. **Ordering**: a prerequisite scheduled in a later timeslot than its
//!    dependent swaps cells with it, when both stay in admissible timeslots.
//! 2. **Arrangement**: within each timeslot, room requests are honoured
//!    (lower id wins a contested room), the other entities take the highest
//!    free rooms in ascending (priority, id) order, and fillers take the
//!    rest in ascending value order.
//! 3. **Gumbanding**: a later part sitting in its predecessor's timeslot
//!    or more than one timeslot after it moves to the timeslot right after
//!    the predecessor, exchanging cells with a filler or an entity that has
//!    no ordering relations.
//!
//! The passes repeat until none changes the grid, so repairing a repaired
//! grid is a no-op. Every pass only permutes cells, and none moves an
//! entity into a timeslot it may not occupy.

use tracing::warn;

use crate::models::{EntitySet, Gene, Grid};

/// Repairs `grid` in place; returns the number of rounds that changed it.
pub fn repair(set: &EntitySet, grid: &mut Grid) -> usize {
    let cap = 4 * set.len() + 8;
    for round in 0..cap {
        let mut changed = fix_timeslots(set, grid);
        changed |= fix_ordering(set, grid);
        changed |= arrange_slots(set, grid);
        changed |= gumband(set, grid);
        if !changed {
            return round;
        }
    }
    warn!(rounds = cap, "repair did not reach a fixpoint");
    cap
}

/// Pass 0: moves entities out of inadmissible timeslots.
pub fn fix_timeslots(set: &EntitySet, grid: &mut Grid) -> bool {
    let mut changed = false;
    for from in 0..grid.len() {
        let gene = grid.cells()[from];
        if !set.is_entity(gene) {
            continue;
        }
        let slot = grid.row_of(from);
        if set.is_valid_slot(gene as usize, slot) {
            continue;
        }
        if let Some(cell) = relocation_cell(set, grid, gene as usize, slot) {
            grid.swap(from, cell);
            changed = true;
        }
    }
    changed
}

/// Cell in an admissible timeslot of `entity` whose occupant can take
/// timeslot `from`: the first filler, else the first entity valid there.
fn relocation_cell(set: &EntitySet, grid: &Grid, entity: usize, from: usize) -> Option<usize> {
    let cols = grid.cols();
    let candidates: Vec<usize> = (0..grid.rows())
        .filter(|&s| set.is_valid_slot(entity, s))
        .flat_map(|s| s * cols..(s + 1) * cols)
        .collect();
    let cells = grid.cells();
    candidates
        .iter()
        .copied()
        .find(|&c| !set.is_entity(cells[c]))
        .or_else(|| {
            candidates
                .iter()
                .copied()
                .find(|&c| set.is_valid_slot(cells[c] as usize, from))
        })
}

/// Pass 1: swaps prerequisite pairs scheduled in the wrong timeslot order.
pub fn fix_ordering(set: &EntitySet, grid: &mut Grid) -> bool {
    let mut changed = false;
    let mut pos = grid.positions(set.len());
    for &(p, q) in set.prereq_list() {
        let (pp, pq) = (pos[p], pos[q]);
        let (sp, sq) = (grid.row_of(pp), grid.row_of(pq));
        if sq < sp && set.is_valid_slot(p, sq) && set.is_valid_slot(q, sp) {
            grid.swap(pp, pq);
            pos.swap(p, q);
            changed = true;
        }
    }
    changed
}

/// Pass 2: canonical room arrangement of every timeslot.
pub fn arrange_slots(set: &EntitySet, grid: &mut Grid) -> bool {
    let mut changed = false;
    let mut arranged = vec![0; grid.cols()];
    for slot in 0..grid.rows() {
        arrange_row(set, grid.row(slot), &mut arranged);
        if grid.row(slot) != arranged.as_slice() {
            grid.row_mut(slot).copy_from_slice(&arranged);
            changed = true;
        }
    }
    changed
}

fn arrange_row(set: &EntitySet, row: &[Gene], out: &mut [Gene]) {
    let nrooms = row.len();
    let mut taken = vec![false; nrooms];

    let mut requested: Vec<Gene> = row
        .iter()
        .copied()
        .filter(|&g| set.is_entity(g) && set.room_request(g as usize).is_some())
        .collect();
    requested.sort_unstable();

    let mut others: Vec<Gene> = Vec::with_capacity(nrooms);
    for g in requested {
        match set.room_request(g as usize) {
            Some(room) if room < nrooms && !taken[room] => {
                out[room] = g;
                taken[room] = true;
            }
            _ => others.push(g),
        }
    }
    others.extend(
        row.iter()
            .copied()
            .filter(|&g| set.is_entity(g) && set.room_request(g as usize).is_none()),
    );
    others.sort_unstable_by_key(|&g| (set.priority(g as usize), g));

    let mut fillers: Vec<Gene> = row.iter().copied().filter(|&g| !set.is_entity(g)).collect();
    fillers.sort_unstable();

    let free: Vec<usize> = (0..nrooms).filter(|&r| !taken[r]).collect();
    let split = free.len() - others.len();
    for (&room, g) in free[..split].iter().zip(fillers) {
        out[room] = g;
    }
    for (&room, g) in free[split..].iter().zip(others) {
        out[room] = g;
    }
}

/// Pass 3: moves later parts next to their predecessor.
pub fn gumband(set: &EntitySet, grid: &mut Grid) -> bool {
    let mut changed = false;
    let mut pos = grid.positions(set.len());
    for q in 0..set.len() {
        let Some(p) = set.predecessor(q) else {
            continue;
        };
        let s = grid.row_of(pos[p]);
        let t = grid.row_of(pos[q]);
        let target = s + 1;
        if t == target || t < s || target >= grid.rows() {
            continue;
        }
        if !set.is_valid_slot(q, target) {
            continue;
        }
        if set.prerequisites(q).any(|x| grid.row_of(pos[x]) >= target)
            || set.successors(q).any(|x| grid.row_of(pos[x]) <= target)
        {
            continue;
        }
        if let Some(cell) = exchange_cell(set, grid, target, t) {
            let from = pos[q];
            let displaced = grid.cells()[cell];
            grid.swap(from, cell);
            pos[q] = cell;
            if set.is_entity(displaced) {
                pos[displaced as usize] = from;
            }
            changed = true;
        }
    }
    changed
}

/// Cell of timeslot `slot` whose occupant can move to timeslot `to`:
/// the first filler, else the first entity without ordering relations.
fn exchange_cell(set: &EntitySet, grid: &Grid, slot: usize, to: usize) -> Option<usize> {
    let base = slot * grid.cols();
    let row = grid.row(slot);
    if let Some(c) = row.iter().position(|&g| !set.is_entity(g)) {
        return Some(base + c);
    }
    row.iter()
        .position(|&g| {
            let x = g as usize;
            !set.has_ordering(x) && set.is_valid_slot(x, to)
        })
        .map(|c| base + c)
}
