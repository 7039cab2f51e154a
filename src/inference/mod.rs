//! # Inference Engine Module
//!
//! Drives one review through the pipeline:
//!
//! ```text
//! ensure loaded → encode → score with LSTM and RNN → interpret → Prediction
//! ```
//!
//! The engine starts cold. The first request fetches the vocabulary and loads
//! both models; every later request reuses them without locking.

mod engine;
mod prediction;

pub use engine::{EngineState, EngineStatus, InferenceEngine};
pub use prediction::{interpret, ModelPrediction, Prediction, Sentiment, DECISION_THRESHOLD};
