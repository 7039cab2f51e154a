//! # Sentiment Models
//!
//! Two independently trained sequence classifiers score every review. Each
//! is loaded once from a JSON weight artifact and then shared read-only by
//! all requests.
//!
//! ## Key Components
//!
//! - `SequenceScorer`: anything that maps one encoded sequence to a score in [0, 1]
//! - `RecurrentNetwork`: native Embedding → LSTM/SimpleRNN → Dense runtime
//! - `ModelRegistry`: lazy, at-most-once loading and paired scoring

mod artifact;
mod network;
mod registry;

pub use artifact::{DenseWeights, ModelArtifact, RecurrentWeights};
pub use network::{Activation, DenseLayer, GateActivation, RecurrentCell, RecurrentNetwork};
pub use registry::{FileModelLoader, ModelLoader, ModelRegistry, ScorePair};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tokenizer::EncodedSequence;

/// Architecture of a sentiment model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Lstm,
    #[serde(alias = "simple_rnn")]
    Rnn,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Lstm => write!(f, "LSTM"),
            ModelKind::Rnn => write!(f, "RNN"),
        }
    }
}

/// A loaded, reusable model.
///
/// Implementations must be deterministic and keep no state between calls;
/// whatever a call allocates is owned by that call.
pub trait SequenceScorer: Send + Sync {
    fn kind(&self) -> ModelKind;

    /// Scores one sequence of shape 1×500, returning a value in [0, 1].
    fn score(&self, sequence: &EncodedSequence) -> Result<f32>;
}
