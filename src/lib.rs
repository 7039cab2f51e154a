//! # ReelSense
//!
//! Binary sentiment for movie reviews, served by two recurrent models (an
//! LSTM and a plain RNN) that score the same encoded review.
//!
//! ## Main Components
//!
//! - **vocabulary**: word → rank store, fetched once on first use
//! - **tokenizer**: text → fixed 500-id sequence
//! - **model**: native LSTM/RNN runtime and the lazily loaded registry
//! - **inference**: the single `predict` entrypoint
//! - **server**: axum HTTP surface
//! - **client**: HTTP client and interactive terminal front end
//!
//! ## Example Usage
//!
//! ```ignore
//! use reelsense::config::Settings;
//! use reelsense::inference::InferenceEngine;
//!
//! let settings = Settings::new()?;
//! let engine = InferenceEngine::from_settings(&settings)?;
//! let prediction = engine.predict("A wonderful, moving film").await?;
//! println!("LSTM says {}", prediction.lstm.sentiment);
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod inference;
pub mod model;
pub mod server;
pub mod tokenizer;
pub mod vocabulary;

pub use error::{Result, SentimentError};
pub use inference::{InferenceEngine, ModelPrediction, Prediction, Sentiment};
