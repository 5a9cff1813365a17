//!
//! Backward algorithm definitions
//!
//! For a sequence `x[0], ..., x[n-1]`
//!
//! ```text
//! B[n-1][k] = t(k -> End)
//! B[i][k]   = \sum_{l} t(k -> l at i) e_l(x[i+1]) B[i+1][l]    (0 <= i < n-1)
//!
//! P(x) = \sum_{k} t(Begin -> k) e_k(x[0]) B[0][k]
//! ```
//!
//! `e_l(x[i])` includes the external weight of the sequence (see `emission_at`).
//!
//! Three sweeps compute this recurrence:
//!
//! * `backward_reference`: every pair of states, f64 table.
//! * `backward_pruned`: active states only, f64 rolling buffers, f32 table.
//!   Basic models only.
//! * `backward_general`: active states only, reads and writes the f32 table.
//!
use super::buffer::RollingBuffers;
use super::common::{emission_at, SequenceContext, StateGraph};
use super::shape::BasicModel;
use super::state_set::StateSet;
use super::table::{BackwardTable, DenseTable, LogScore, ReducedTable, Row, ScoreTable};
use crate::common::{Position, StateIndex};
use crate::error::{Result, TrellisError};
use crate::prob::Prob;
use log::{debug, trace};
use rayon::prelude::*;

///
/// Run the dense backward algorithm over all pairs of states.
///
/// This is the oracle of the other sweeps. If `parallel`, the states of
/// a position are computed in parallel.
///
pub fn backward_reference<M, Q>(model: &M, seq: &Q, parallel: bool) -> Result<DenseTable>
where
    M: StateGraph + Sync,
    Q: SequenceContext + Sync,
{
    let n = check_len(seq)?;
    let n_states = model.n_states();
    debug!(
        "backward_reference n_positions={} n_states={} parallel={}",
        n, n_states, parallel
    );
    let mut table = DenseTable::try_new(n, n_states)?;
    b_init(model, &mut table, n - 1);

    for i in (0..n - 1).rev() {
        let (row, next) = table.split_rows(i);
        let cell = |k: usize| b_cell_dense(model, seq, StateIndex::new(k), i, next);
        if parallel {
            row.as_mut_slice()
                .par_iter_mut()
                .enumerate()
                .for_each(|(k, x)| *x = cell(k));
        } else {
            for (k, x) in row.as_mut_slice().iter_mut().enumerate() {
                *x = cell(k);
            }
        }
    }

    let p = b_fold_initial(model, seq, |k| table.row(0)[k]);
    table.set_ending_posterior(p);
    debug!("backward_reference ending_posterior={}", p);
    Ok(table)
}

///
/// Run the pruned backward algorithm on a basic model.
///
/// Only states reachable backward from the ending states are visited.
/// Scores are accumulated in two f64 rolling buffers and written to the
/// f32 table, which is never read during the sweep.
///
pub fn backward_pruned<M, Q>(basic: &BasicModel<M>, seq: &Q) -> Result<ReducedTable>
where
    M: StateGraph,
    Q: SequenceContext,
{
    let model = basic.model();
    let n = check_len(seq)?;
    let n_states = model.n_states();
    debug!("backward_pruned n_positions={} n_states={}", n, n_states);
    let mut table = ReducedTable::try_new(n, n_states)?;
    let mut buffers = RollingBuffers::try_new(n_states)?;
    let mut current_states = StateSet::new(n_states);
    let mut next_states = StateSet::new(n_states);

    for state in model.ending_from().iter() {
        let p = model.end_transition(state);
        if !p.is_zero() {
            buffers.current_mut()[state] = p;
            next_states.insert(state);
        }
    }
    project(buffers.current(), &mut table, n - 1);

    for i in (1..n).rev() {
        std::mem::swap(&mut current_states, &mut next_states);
        next_states.clear();
        buffers.swap();
        trace!("position={} active={}", i, current_states.len());

        let (previous, current) = buffers.split();
        for state in current_states.iter() {
            let b = previous[state];
            if b.is_zero() {
                continue;
            }
            let e = emission_at(model, seq, state, i);
            if e.is_zero() {
                continue;
            }
            let from = model.predecessors(state);
            for parent in from.iter() {
                let t = model.transition(parent, state, i - 1);
                if t.is_zero() {
                    continue;
                }
                current[parent] += b * e * t;
            }
            next_states.union_with(from);
        }
        project(current, &mut table, i - 1);
    }

    // `current` holds the scores of position 0
    let p = b_fold_initial(model, seq, |k| buffers.current()[k]);
    table.set_ending_posterior(p);
    debug!("backward_pruned ending_posterior={}", p);
    Ok(table)
}

///
/// Run the pruned backward algorithm on any model, reading and writing
/// the f32 table directly instead of rolling f64 buffers.
///
pub fn backward_general<M, Q>(model: &M, seq: &Q) -> Result<ReducedTable>
where
    M: StateGraph,
    Q: SequenceContext,
{
    let n = check_len(seq)?;
    let n_states = model.n_states();
    debug!("backward_general n_positions={} n_states={}", n, n_states);
    let mut table = ReducedTable::try_new(n, n_states)?;
    let mut current_states = StateSet::new(n_states);
    let mut next_states = StateSet::new(n_states);

    for state in model.ending_from().iter() {
        let p = model.end_transition(state);
        if !p.is_zero() {
            table.set(n - 1, state, p);
            next_states.insert(state);
        }
    }

    for i in (1..n).rev() {
        std::mem::swap(&mut current_states, &mut next_states);
        next_states.clear();
        trace!("position={} active={}", i, current_states.len());

        for state in current_states.iter() {
            let b = table.score(i, state);
            if b.is_zero() {
                continue;
            }
            let e = emission_at(model, seq, state, i);
            if e.is_zero() {
                continue;
            }
            let from = model.predecessors(state);
            for parent in from.iter() {
                let t = model.transition(parent, state, i - 1);
                if t.is_zero() {
                    continue;
                }
                let acc = table.score(i - 1, parent) + b * e * t;
                table.set(i - 1, parent, acc);
            }
            next_states.union_with(from);
        }
    }

    let p = b_fold_initial(model, seq, |k| table.score(0, k));
    table.set_ending_posterior(p);
    debug!("backward_general ending_posterior={}", p);
    Ok(table)
}

//
// helpers
//

fn check_len<Q: SequenceContext + ?Sized>(seq: &Q) -> Result<usize> {
    match seq.len() {
        0 => Err(TrellisError::EmptySequence),
        n => Ok(n),
    }
}

///
/// Fill the last row by the transitions to the ending pseudo-state
///
/// ```text
/// B[n-1][k] = t(k -> End)
/// ```
///
fn b_init<M, T>(model: &M, table: &mut BackwardTable<T>, last: Position)
where
    M: StateGraph,
    T: LogScore,
{
    for state in model.ending_from().iter() {
        let p = model.end_transition(state);
        if !p.is_zero() {
            table.set(last, state, p);
        }
    }
}

///
/// Calculate a cell of the dense table from the next row
///
/// ```text
/// B[i][k] = \sum_{l} B[i+1][l] e_l(x[i+1]) t(k -> l at i)
/// ```
///
fn b_cell_dense<M, Q>(model: &M, seq: &Q, state: StateIndex, i: Position, next: &Row<Prob>) -> Prob
where
    M: StateGraph,
    Q: SequenceContext,
{
    next.iter()
        .filter_map(|(child, b)| {
            if b.is_zero() {
                return None;
            }
            let t = model.transition(state, child, i);
            let e = emission_at(model, seq, child, i + 1);
            if t.is_zero() || e.is_zero() {
                None
            } else {
                Some(b * e * t)
            }
        })
        .sum()
}

///
/// Fold the scores of position 0 through the initial pseudo-state
///
/// ```text
/// P(x) = \sum_{k} B[0][k] e_k(x[0]) t(Begin -> k)
/// ```
///
fn b_fold_initial<M, Q, F>(model: &M, seq: &Q, first: F) -> Prob
where
    M: StateGraph,
    Q: SequenceContext,
    F: Fn(StateIndex) -> Prob,
{
    (0..model.n_states())
        .map(StateIndex::new)
        .filter_map(|state| {
            let b = first(state);
            if b.is_zero() {
                return None;
            }
            let t = model.initial_transition(state);
            let e = emission_at(model, seq, state, 0);
            if t.is_zero() || e.is_zero() {
                None
            } else {
                Some(b * e * t)
            }
        })
        .sum()
}

///
/// Write the f64 row into the f32 table
///
fn project(row: &Row<Prob>, table: &mut ReducedTable, i: Position) {
    for (state, p) in row.iter() {
        if !p.is_zero() {
            table.set(i, state, p);
        }
    }
}
