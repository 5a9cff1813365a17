//!
//! globally-available parts
//!
pub use crate::common::{si, Position, StateIndex};
pub use crate::error::{Result, TrellisError};
pub use crate::prob::{lp, p, Prob};
pub use crate::trellis::common::{SequenceContext, StateGraph};
pub use crate::trellis::model::HmmModel;
pub use crate::trellis::sequence::EncodedSequence;
pub use crate::trellis::{compute_backward, BackwardConfig, BackwardOutput, Mode, ScoreTable};
