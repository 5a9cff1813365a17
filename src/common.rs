//!
//! Common types shared by the trellis engine
//!
pub use petgraph::graph::NodeIndex;

/// Index of a state in the model graph
pub type StateIndex = NodeIndex;

/// Index of a position in the observed sequence
pub type Position = usize;

/// Encoded symbol of the observed sequence (index into the alphabet)
pub type Symbol = u8;

///
/// short-hand of `StateIndex::new`
///
pub fn si(index: usize) -> StateIndex {
    NodeIndex::new(index)
}

