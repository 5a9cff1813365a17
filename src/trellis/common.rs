//!
//! Collaborator interfaces consumed by the backward recursion
//!
//! * `StateGraph`: the model (states, transitions, emissions)
//! * `SequenceContext`: the observed sequence and its external weights
//!
use super::state_set::StateSet;
use crate::common::{Position, StateIndex, Symbol};
use crate::prob::Prob;

///
/// The model graph seen from the trellis.
///
/// All scores are in log space; `Prob::zero()` means "no such transition"
/// or "cannot emit".
///
pub trait StateGraph {
    ///
    /// The number of states, excluding the initial/ending pseudo-states.
    fn n_states(&self) -> usize;
    ///
    /// The model has neither higher-order emissions nor position-dependent
    /// transitions, so the pruned sweep can be used.
    fn is_basic(&self) -> bool;
    ///
    /// Transition score from the state to the ending pseudo-state.
    fn end_transition(&self, state: StateIndex) -> Prob;
    ///
    /// States having a defined transition to the ending pseudo-state.
    fn ending_from(&self) -> &StateSet;
    ///
    /// States having a defined transition into the state.
    fn predecessors(&self, state: StateIndex) -> &StateSet;
    ///
    /// Transition score of `from` at `position` to `to` at `position + 1`.
    fn transition(&self, from: StateIndex, to: StateIndex, position: Position) -> Prob;
    ///
    /// Transition score from the initial pseudo-state to the state at position 0.
    fn initial_transition(&self, to: StateIndex) -> Prob;
    ///
    /// Emission score of the state at the position of the sequence.
    fn emission<Q: SequenceContext + ?Sized>(
        &self,
        state: StateIndex,
        seq: &Q,
        position: Position,
    ) -> Prob;
}

///
/// The observed sequence seen from the trellis.
///
pub trait SequenceContext {
    ///
    /// The number of positions
    fn len(&self) -> usize;
    ///
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    ///
    /// Encoded symbol at the position
    fn symbol(&self, position: Position) -> Symbol;
    ///
    /// Some position has external weight overrides.
    fn has_external_weights(&self) -> bool;
    ///
    /// The position has external weight overrides.
    fn has_external_weights_at(&self, position: Position) -> bool;
    ///
    /// Log-space additive adjustment of the emission of the state at the position.
    /// `Prob::one()` means no adjustment.
    fn weight_override(&self, position: Position, state: StateIndex) -> Prob;
}

///
/// Emission of the state at the position, with the external weight
/// of the sequence applied if any.
///
/// Every recurrence evaluates emissions through this function.
///
#[inline]
pub fn emission_at<M, Q>(model: &M, seq: &Q, state: StateIndex, position: Position) -> Prob
where
    M: StateGraph + ?Sized,
    Q: SequenceContext + ?Sized,
{
    let e = model.emission(state, seq, position);
    if seq.has_external_weights() && seq.has_external_weights_at(position) {
        let w = seq.weight_override(position, state);
        if w.is_one() {
            e
        } else {
            e * w
        }
    } else {
        e
    }
}
