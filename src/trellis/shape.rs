//!
//! Model shape classification
//!
//! The pruned sweep is only defined for basic models. `BasicModel` can only
//! be constructed from a model whose `is_basic()` holds, so the requirement
//! is checked once, when the shape is decided.
//!
use super::common::StateGraph;
use crate::error::{Result, TrellisError};

///
/// A model that has been checked to be basic.
///
#[derive(Debug)]
pub struct BasicModel<'a, M: StateGraph>(&'a M);

// derive would require `M: Clone`
impl<'a, M: StateGraph> Clone for BasicModel<'a, M> {
    fn clone(&self) -> Self {
        BasicModel(self.0)
    }
}
impl<'a, M: StateGraph> Copy for BasicModel<'a, M> {}

impl<'a, M: StateGraph> BasicModel<'a, M> {
    pub fn new(model: &'a M) -> Result<BasicModel<'a, M>> {
        if model.is_basic() {
            Ok(BasicModel(model))
        } else {
            Err(TrellisError::ModelShapeMismatch(
                "model is not basic; use the reference or general backward".to_string(),
            ))
        }
    }
    pub fn model(&self) -> &'a M {
        self.0
    }
}

impl<'a, M: StateGraph> std::ops::Deref for BasicModel<'a, M> {
    type Target = M;
    fn deref(&self) -> &M {
        self.0
    }
}

///
/// Shape of the model, decided once at the entry of the driver
///
#[derive(Debug)]
pub enum ModelShape<'a, M: StateGraph> {
    Basic(BasicModel<'a, M>),
    General(&'a M),
}

impl<'a, M: StateGraph> ModelShape<'a, M> {
    pub fn classify(model: &'a M) -> ModelShape<'a, M> {
        match BasicModel::new(model) {
            Ok(basic) => ModelShape::Basic(basic),
            Err(_) => ModelShape::General(model),
        }
    }
    pub fn model(&self) -> &'a M {
        match self {
            ModelShape::Basic(m) => m.model(),
            ModelShape::General(m) => *m,
        }
    }
    pub fn is_basic(&self) -> bool {
        matches!(self, ModelShape::Basic(_))
    }
}
