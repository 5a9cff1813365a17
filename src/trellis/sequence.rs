//!
//! Encoded observation sequence with optional external weights
//!
use super::common::SequenceContext;
use crate::common::{Position, StateIndex, Symbol};
use crate::error::{Result, TrellisError};
use crate::prob::Prob;
use std::collections::BTreeMap;

///
/// Externally supplied per-position per-state log weights.
///
/// A weight is added (in log space) to the emission of the state at the
/// position. States not listed at a weighted position get `Prob::one()`.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalWeights(BTreeMap<Position, Vec<(StateIndex, Prob)>>);

impl ExternalWeights {
    pub fn new() -> ExternalWeights {
        ExternalWeights::default()
    }
    ///
    /// Set the weight of the state at the position, replacing a previous one.
    ///
    pub fn set(&mut self, position: Position, state: StateIndex, weight: Prob) {
        let row = self.0.entry(position).or_default();
        match row.iter_mut().find(|(s, _)| *s == state) {
            Some(entry) => entry.1 = weight,
            None => row.push((state, weight)),
        }
    }
    pub fn is_defined_at(&self, position: Position) -> bool {
        self.0.contains_key(&position)
    }
    pub fn get(&self, position: Position, state: StateIndex) -> Prob {
        self.0
            .get(&position)
            .and_then(|row| row.iter().find(|(s, _)| *s == state))
            .map(|(_, w)| *w)
            .unwrap_or_else(Prob::one)
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

///
/// Sequence of encoded symbols (indices into the alphabet)
///
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedSequence {
    symbols: Vec<Symbol>,
    weights: Option<ExternalWeights>,
}

impl EncodedSequence {
    pub fn new(symbols: Vec<Symbol>) -> EncodedSequence {
        EncodedSequence {
            symbols,
            weights: None,
        }
    }
    ///
    /// Encode the text by the position of each byte in `alphabet`.
    ///
    /// ```
    /// use hmmtrellis::trellis::sequence::EncodedSequence;
    /// let s = EncodedSequence::encode(b"GATC", b"ACGT").unwrap();
    /// assert_eq!(s.symbols(), &[2, 0, 3, 1]);
    /// ```
    pub fn encode(text: &[u8], alphabet: &[u8]) -> Result<EncodedSequence> {
        let symbols = text
            .iter()
            .enumerate()
            .map(|(position, &c)| {
                alphabet
                    .iter()
                    .position(|&a| a == c)
                    .map(|x| x as Symbol)
                    .ok_or(TrellisError::UnknownSymbol {
                        symbol: c as char,
                        position,
                    })
            })
            .collect::<Result<Vec<Symbol>>>()?;
        Ok(EncodedSequence::new(symbols))
    }
    ///
    /// Attach external weights. Empty weights are dropped.
    ///
    pub fn with_weights(mut self, weights: ExternalWeights) -> EncodedSequence {
        self.weights = if weights.is_empty() {
            None
        } else {
            Some(weights)
        };
        self
    }
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
    pub fn weights(&self) -> Option<&ExternalWeights> {
        self.weights.as_ref()
    }
}

impl SequenceContext for EncodedSequence {
    fn len(&self) -> usize {
        self.symbols.len()
    }
    fn symbol(&self, position: Position) -> Symbol {
        self.symbols[position]
    }
    fn has_external_weights(&self) -> bool {
        self.weights.is_some()
    }
    fn has_external_weights_at(&self, position: Position) -> bool {
        match &self.weights {
            Some(w) => w.is_defined_at(position),
            None => false,
        }
    }
    fn weight_override(&self, position: Position, state: StateIndex) -> Prob {
        match &self.weights {
            Some(w) => w.get(position, state),
            None => Prob::one(),
        }
    }
}
