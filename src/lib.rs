//!
//! Backward algorithm of state-graph hidden Markov models in log space
//!
pub mod common;
pub mod error;
pub mod prelude;
pub mod prob;
pub mod trellis;
pub mod utils;
pub mod vector;

#[cfg(test)]
#[macro_use]
extern crate approx;
