//!
//! Error types of the trellis engine
//!
use thiserror::Error;

/// Errors returned by the backward computation and its collaborators
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrellisError {
    /// Allocation of a table or a scratch buffer failed
    #[error("out of memory: cannot allocate {what} ({n_items} items)")]
    OutOfMemory { what: &'static str, n_items: usize },

    /// The pruned sweep was requested on a model that is not basic
    #[error("model shape mismatch: {0}")]
    ModelShapeMismatch(String),

    /// The observed sequence has no positions
    #[error("empty sequence")]
    EmptySequence,

    /// A byte of the input text is not in the alphabet
    #[error("unknown symbol {symbol:?} at position {position}")]
    UnknownSymbol { symbol: char, position: usize },

    /// The model definition is inconsistent
    #[error("invalid model: {0}")]
    InvalidModel(String),
}

impl TrellisError {
    pub fn out_of_memory(what: &'static str, n_items: usize) -> Self {
        TrellisError::OutOfMemory { what, n_items }
    }
    /// The caller can retry with another `Mode`
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TrellisError::ModelShapeMismatch(_))
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, TrellisError>;
