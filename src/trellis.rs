//!
//! Backward trellis of a state-graph HMM
//!
//! # Overview of calculation
//!
//! x = x[0],...,x[n-1] : observed symbols of length n
//!
//! Backward
//! B[i][k]
//!  = P(emits x[i+1:n] | in state k at position i) for 0<=i<n
//!
//! B[n-1][k] = t(k -> End)
//!
//! The total probability (ending posterior) is
//! P(x) = \sum_k t(Begin -> k) e_k(x[0]) B[0][k]
//!
//! All values are stored in log space (`Prob`).
//!
//! # Modules
//!
//! * `common`: collaborator traits (`StateGraph`, `SequenceContext`)
//! * `model`, `sequence`: concrete collaborators
//! * `shape`: basic/general classification
//! * `table`, `buffer`: storage of the scores
//! * `backward`: the recurrences
//! * `driver`: mode selection
//!
pub mod backward;
pub mod buffer;
pub mod common;
pub mod driver;
pub mod mocks;
pub mod model;
pub mod sequence;
pub mod shape;
pub mod state_set;
pub mod table;

pub use driver::{compute_backward, BackwardConfig, BackwardOutput, Mode};
pub use table::ScoreTable;
