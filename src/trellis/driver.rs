//!
//! Entry point of the backward computation
//!
//! `compute_backward` decides the shape of the model once, selects the
//! sweep from `BackwardConfig::mode`, and returns the filled table.
//!
use super::backward::{backward_general, backward_pruned, backward_reference};
use super::common::{SequenceContext, StateGraph};
use super::shape::ModelShape;
use super::table::{DenseTable, ReducedTable, ScoreTable};
use crate::common::{Position, StateIndex};
use crate::error::{Result, TrellisError};
use crate::prob::Prob;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

///
/// Which recurrence to run
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// dense f64 sweep over all pairs of states
    Reference,
    /// rolling-buffer sweep over active states, basic models only
    Pruned,
    /// sweep over active states reading the f32 table, any model
    General,
    /// `Pruned` if the model is basic, `General` otherwise
    Auto,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Auto
    }
}

impl FromStr for Mode {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "reference" => Ok(Mode::Reference),
            "pruned" => Ok(Mode::Pruned),
            "general" => Ok(Mode::General),
            "auto" => Ok(Mode::Auto),
            _ => Err(format!(
                "unknown mode {:?} (reference, pruned, general, auto)",
                s
            )),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Mode::Reference => "reference",
            Mode::Pruned => "pruned",
            Mode::General => "general",
            Mode::Auto => "auto",
        };
        write!(f, "{}", s)
    }
}

///
/// Configuration of `compute_backward`
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BackwardConfig {
    pub mode: Mode,
    /// compute the states of a position in parallel (reference sweep only)
    #[serde(default)]
    pub parallel: bool,
}

impl BackwardConfig {
    pub fn new(mode: Mode) -> BackwardConfig {
        BackwardConfig {
            mode,
            parallel: false,
        }
    }
    pub fn parallel(mut self, parallel: bool) -> BackwardConfig {
        self.parallel = parallel;
        self
    }
}

///
/// Filled backward table, in the precision of the sweep that produced it
///
#[derive(Debug, Clone)]
pub enum BackwardOutput {
    Dense(DenseTable),
    Reduced(ReducedTable),
}

impl BackwardOutput {
    pub fn is_dense(&self) -> bool {
        matches!(self, BackwardOutput::Dense(_))
    }
}

impl ScoreTable for BackwardOutput {
    fn n_positions(&self) -> usize {
        match self {
            BackwardOutput::Dense(t) => t.n_positions(),
            BackwardOutput::Reduced(t) => t.n_positions(),
        }
    }
    fn n_states(&self) -> usize {
        match self {
            BackwardOutput::Dense(t) => t.n_states(),
            BackwardOutput::Reduced(t) => t.n_states(),
        }
    }
    fn score(&self, position: Position, state: StateIndex) -> Prob {
        match self {
            BackwardOutput::Dense(t) => t.score(position, state),
            BackwardOutput::Reduced(t) => t.score(position, state),
        }
    }
    fn ending_posterior(&self) -> Prob {
        match self {
            BackwardOutput::Dense(t) => t.ending_posterior(),
            BackwardOutput::Reduced(t) => t.ending_posterior(),
        }
    }
}

impl std::fmt::Display for BackwardOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BackwardOutput::Dense(t) => write!(f, "{}", t),
            BackwardOutput::Reduced(t) => write!(f, "{}", t),
        }
    }
}

///
/// Run the backward algorithm of the model on the sequence.
///
/// * `Mode::Pruned` on a non-basic model fails with
///   `TrellisError::ModelShapeMismatch` and no table is produced.
/// * An empty sequence fails with `TrellisError::EmptySequence`.
/// * A failed allocation fails with `TrellisError::OutOfMemory`.
///
/// Neither the model nor the sequence is modified.
///
pub fn compute_backward<M, Q>(model: &M, seq: &Q, config: &BackwardConfig) -> Result<BackwardOutput>
where
    M: StateGraph + Sync,
    Q: SequenceContext + Sync,
{
    let shape = ModelShape::classify(model);
    info!(
        "backward mode={} basic={} n_states={} n_positions={}",
        config.mode,
        shape.is_basic(),
        model.n_states(),
        seq.len()
    );
    match (config.mode, shape) {
        (Mode::Reference, _) => Ok(BackwardOutput::Dense(backward_reference(
            model,
            seq,
            config.parallel,
        )?)),
        (Mode::Pruned, ModelShape::Basic(basic)) | (Mode::Auto, ModelShape::Basic(basic)) => {
            Ok(BackwardOutput::Reduced(backward_pruned(&basic, seq)?))
        }
        (Mode::Pruned, ModelShape::General(_)) => {
            warn!("pruned backward requested on a non-basic model, use general or reference");
            Err(TrellisError::ModelShapeMismatch(
                "pruned backward requires a basic model".to_string(),
            ))
        }
        (Mode::General, shape) | (Mode::Auto, shape) => Ok(BackwardOutput::Reduced(
            backward_general(shape.model(), seq)?,
        )),
    }
}
