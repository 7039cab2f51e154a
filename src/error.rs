use thiserror::Error;

/// Failures surfaced by the prediction pipeline.
///
/// None of these are retried inside a request. A later request is free to
/// attempt loading again because load state belongs to the process.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SentimentError {
    /// Vocabulary metadata could not be fetched or parsed
    #[error("Vocabulary unavailable: {0}")]
    VocabularyUnavailable(String),

    /// One or both model artifacts failed to load
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// A loaded model failed while scoring a sequence
    #[error("Inference failed: {0}")]
    InferenceFailure(String),

    /// Missing or empty review text
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SentimentError {
    /// Stable identifier used in error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            SentimentError::VocabularyUnavailable(_) => "vocabulary_unavailable",
            SentimentError::ModelUnavailable(_) => "model_unavailable",
            SentimentError::InferenceFailure(_) => "inference_failure",
            SentimentError::InvalidInput(_) => "invalid_input",
        }
    }
}

pub type Result<T> = std::result::Result<T, SentimentError>;
