//!
//! Table definitions
//!
//! ## BackwardTable
//!
//! the log prob assigned for each (position, state)
//!
//! `B[i][k]` = P(emits x[i+1:] | in state k at position i)
//!
//! Two precisions are used:
//!
//! * `DenseTable` stores `Prob` (f64). The reference tier.
//! * `ReducedTable` stores `ReducedProb` (f32). The production tier.
//!
use crate::common::{Position, StateIndex};
use crate::error::{Result, TrellisError};
use crate::prob::{Prob, ReducedProb};
use crate::vector::{try_alloc, DenseStorage, StateVec};

///
/// Storage form of a log probability in a table cell
///
pub trait LogScore: Copy + PartialEq + Send + Sync {
    fn store(p: Prob) -> Self;
    fn load(self) -> Prob;
}

impl LogScore for Prob {
    #[inline]
    fn store(p: Prob) -> Self {
        p
    }
    #[inline]
    fn load(self) -> Prob {
        self
    }
}

impl LogScore for ReducedProb {
    #[inline]
    fn store(p: Prob) -> Self {
        ReducedProb::from(p)
    }
    #[inline]
    fn load(self) -> Prob {
        Prob::from(self)
    }
}

///
/// Read access to a completed backward computation.
///
/// This is the interface consumed by posterior decoding.
///
pub trait ScoreTable {
    fn n_positions(&self) -> usize;
    fn n_states(&self) -> usize;
    ///
    /// `B[position][state]`, log-zero where unreachable
    fn score(&self, position: Position, state: StateIndex) -> Prob;
    ///
    /// total log likelihood of the sequence
    fn ending_posterior(&self) -> Prob;
    ///
    /// Maximum of `|log a - log b|` over all cells and the ending posterior.
    /// Infinite if the tables disagree on which cells are log-zero.
    fn max_log_diff<T: ScoreTable>(&self, other: &T) -> f64
    where
        Self: Sized,
    {
        assert_eq!(self.n_positions(), other.n_positions());
        assert_eq!(self.n_states(), other.n_states());
        let mut diff = self.ending_posterior().log_diff(other.ending_posterior());
        for i in 0..self.n_positions() {
            for k in 0..self.n_states() {
                let state = StateIndex::new(k);
                diff = diff.max(self.score(i, state).log_diff(other.score(i, state)));
            }
        }
        diff
    }
}

/// A row of the table, scores of all states at a position
pub type Row<T> = StateVec<DenseStorage<T>>;

///
/// Struct that stores the result of backward algorithm
/// for the given sequence
///
/// `rows.len()` equals to the length of the sequence and
/// `rows[i].len()` equals to the number of states.
///
#[derive(Debug, Clone)]
pub struct BackwardTable<T: LogScore> {
    rows: Vec<Row<T>>,
    ending_posterior: Prob,
}

/// Reference tier table
pub type DenseTable = BackwardTable<Prob>;

/// Production tier table
pub type ReducedTable = BackwardTable<ReducedProb>;

impl<T: LogScore> BackwardTable<T> {
    ///
    /// Allocate a table filled with log-zero.
    ///
    pub fn try_new(n_positions: usize, n_states: usize) -> Result<Self> {
        let n_cells = n_positions
            .checked_mul(n_states)
            .ok_or_else(|| TrellisError::out_of_memory("backward table", usize::MAX))?;
        log::debug!(
            "allocating backward table {}x{} ({} cells)",
            n_positions,
            n_states,
            n_cells
        );
        let mut rows = try_alloc("backward table", n_positions)?;
        for _ in 0..n_positions {
            rows.push(Row::try_new(n_states, T::store(Prob::zero()))?);
        }
        Ok(BackwardTable {
            rows,
            ending_posterior: Prob::zero(),
        })
    }
    pub fn row(&self, position: Position) -> &Row<T> {
        &self.rows[position]
    }
    ///
    /// `(rows[i] mutable, rows[i+1])` borrowed at the same time
    ///
    pub fn split_rows(&mut self, position: Position) -> (&mut Row<T>, &Row<T>) {
        let (head, tail) = self.rows.split_at_mut(position + 1);
        (&mut head[position], &tail[0])
    }
    #[inline]
    pub fn set(&mut self, position: Position, state: StateIndex, score: Prob) {
        self.rows[position][state] = T::store(score);
    }
    pub(crate) fn set_ending_posterior(&mut self, p: Prob) {
        self.ending_posterior = p;
    }
}

impl<T: LogScore> ScoreTable for BackwardTable<T> {
    fn n_positions(&self) -> usize {
        self.rows.len()
    }
    fn n_states(&self) -> usize {
        self.rows.first().map_or(0, |row| row.len())
    }
    #[inline]
    fn score(&self, position: Position, state: StateIndex) -> Prob {
        self.rows[position][state].load()
    }
    fn ending_posterior(&self) -> Prob {
        self.ending_posterior
    }
}

impl<T: LogScore> std::fmt::Display for BackwardTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        // Header
        write!(f, "pos")?;
        for k in 0..self.n_states() {
            write!(f, "\t{}", k)?;
        }
        writeln!(f)?;
        for (i, row) in self.rows.iter().enumerate() {
            write!(f, "{}", i)?;
            for &x in row.as_slice() {
                write!(f, "\t{:.4}", x.load().to_log_value())?;
            }
            writeln!(f)?;
        }
        writeln!(f, "ending\t{}", self.ending_posterior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::si;
    use crate::prob::p;

    #[test]
    fn table_new_is_zero() {
        let t = DenseTable::try_new(3, 2).unwrap();
        assert_eq!(t.n_positions(), 3);
        assert_eq!(t.n_states(), 2);
        for i in 0..3 {
            for k in 0..2 {
                assert!(t.score(i, si(k)).is_zero());
            }
        }
        assert!(t.ending_posterior().is_zero());
    }
    #[test]
    fn table_set_get_and_diff() {
        let mut t1 = DenseTable::try_new(2, 2).unwrap();
        let mut t2 = ReducedTable::try_new(2, 2).unwrap();
        t1.set(1, si(0), p(0.3));
        t2.set(1, si(0), p(0.3));
        assert_eq!(t1.score(1, si(0)), p(0.3));
        assert_abs_diff_eq!(t2.score(1, si(0)), p(0.3), epsilon = 1e-6);
        assert!(t1.max_log_diff(&t2) < 1e-6);

        t2.set(0, si(1), p(0.1));
        assert_eq!(t1.max_log_diff(&t2), f64::INFINITY);
        println!("{}", t1);
    }
    #[test]
    fn table_too_large() {
        let r = DenseTable::try_new(usize::MAX, 2);
        assert!(matches!(r, Err(TrellisError::OutOfMemory { .. })));
    }
}
