use std::fmt;

use serde::{Deserialize, Serialize};

/// Scores strictly above this are positive
pub const DECISION_THRESHOLD: f32 = 0.5;

/// Binary sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "Positive"),
            Sentiment::Negative => write!(f, "Negative"),
        }
    }
}

/// One model's verdict on a review
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPrediction {
    pub sentiment: Sentiment,
    /// Distance toward the chosen side, always in [0.5, 1.0]
    pub confidence: f32,
    /// Raw model output in [0, 1]
    pub score: f32,
}

/// Both models' verdicts for one review
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub lstm: ModelPrediction,
    pub rnn: ModelPrediction,
}

/// Turns a raw score into a label and confidence.
///
/// A score of exactly 0.5 is Negative with confidence 0.5.
pub fn interpret(score: f32) -> ModelPrediction {
    if score > DECISION_THRESHOLD {
        ModelPrediction { sentiment: Sentiment::Positive, confidence: score, score }
    } else {
        ModelPrediction { sentiment: Sentiment::Negative, confidence: 1.0 - score, score }
    }
}
