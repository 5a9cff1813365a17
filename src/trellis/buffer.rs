//!
//! Rolling score buffers of the pruned sweep
//!
use super::table::Row;
use crate::error::Result;
use crate::prob::Prob;

///
/// Owned pair of double precision rows.
///
/// One of them is `previous` (scores of position `i+1`, read only) and the
/// other is `current` (scores of position `i` being accumulated).
/// `swap` exchanges the roles by flipping an index, so no row is copied.
///
#[derive(Debug, Clone)]
pub struct RollingBuffers {
    rows: [Row<Prob>; 2],
    current: usize,
}

impl RollingBuffers {
    ///
    /// Two rows of `n_states` log-zeros
    ///
    pub fn try_new(n_states: usize) -> Result<RollingBuffers> {
        Ok(RollingBuffers {
            rows: [
                Row::try_new(n_states, Prob::zero())?,
                Row::try_new(n_states, Prob::zero())?,
            ],
            current: 0,
        })
    }
    pub fn current(&self) -> &Row<Prob> {
        &self.rows[self.current]
    }
    pub fn current_mut(&mut self) -> &mut Row<Prob> {
        &mut self.rows[self.current]
    }
    pub fn previous(&self) -> &Row<Prob> {
        &self.rows[1 - self.current]
    }
    ///
    /// `(previous, current)` borrowed at the same time
    ///
    pub fn split(&mut self) -> (&Row<Prob>, &mut Row<Prob>) {
        let (a, b) = self.rows.split_at_mut(1);
        if self.current == 0 {
            (&b[0], &mut a[0])
        } else {
            (&a[0], &mut b[0])
        }
    }
    ///
    /// The current row becomes previous, and the old previous row is
    /// cleared to log-zero and becomes current.
    ///
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
        self.rows[self.current].fill(Prob::zero());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::si;
    use crate::prob::p;

    #[test]
    fn rolling_swap() {
        let mut b = RollingBuffers::try_new(3).unwrap();
        b.current_mut()[si(1)] = p(0.5);
        b.swap();
        assert_eq!(b.previous()[si(1)], p(0.5));
        assert!(b.current()[si(1)].is_zero());
        {
            let (prev, cur) = b.split();
            cur[si(2)] = prev[si(1)] * p(0.5);
        }
        assert_abs_diff_eq!(b.current()[si(2)], p(0.25), epsilon = 1e-12);
        b.swap();
        // old previous is cleared
        assert!(b.current().iter().all(|(_, x)| x.is_zero()));
        assert_abs_diff_eq!(b.previous()[si(2)], p(0.25), epsilon = 1e-12);
    }
}
