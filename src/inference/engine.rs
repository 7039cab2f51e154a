use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::Settings;
use crate::error::{Result, SentimentError};
use crate::model::{FileModelLoader, ModelRegistry};
use crate::tokenizer::encode;
use crate::vocabulary::{source_from_location, Vocabulary, VocabularyStore};
use super::prediction::{interpret, Prediction};

/// Lifecycle of the engine; `Cold → Warm` happens at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Cold,
    Warm,
}

/// Load status, readable without triggering any loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub state: EngineState,
    pub vocabulary_loaded: bool,
    pub models_loaded: bool,
    /// When the engine became warm
    pub warm_since: Option<DateTime<Utc>>,
}

/// The single prediction entrypoint.
///
/// Owns the vocabulary store and model registry. Both are filled on the
/// first request and shared read-only afterwards.
pub struct InferenceEngine {
    vocabulary: VocabularyStore,
    models: ModelRegistry,
    warm_since: OnceLock<DateTime<Utc>>,
}

impl InferenceEngine {
    pub fn new(vocabulary: VocabularyStore, models: ModelRegistry) -> Self {
        Self {
            vocabulary,
            models,
            warm_since: OnceLock::new(),
        }
    }

    /// Builds a cold engine from settings. Nothing is fetched or loaded here.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let source = source_from_location(
            &settings.vocabulary.source,
            Duration::from_secs(settings.vocabulary.fetch_timeout_secs),
        )?;
        let loader = FileModelLoader::from_config(&settings.models);

        Ok(Self::new(
            VocabularyStore::new(source),
            ModelRegistry::new(Arc::new(loader)),
        ))
    }

    /// Loads the vocabulary, then both models. Idempotent.
    pub async fn ensure_loaded(&self) -> Result<&Vocabulary> {
        let vocabulary = self.vocabulary.ensure_loaded().await?;
        self.models.ensure_loaded().await?;

        if self.warm_since.get().is_none() {
            let since = *self.warm_since.get_or_init(Utc::now);
            info!("Engine is warm (since {})", since);
        }

        Ok(vocabulary)
    }

    /// Predicts the sentiment of `review` with both models.
    ///
    /// Loading is attempted before the input is checked, so an empty review
    /// on a cold engine still pays for loading and then fails with
    /// `InvalidInput`.
    pub async fn predict(&self, review: &str) -> Result<Prediction> {
        let span = info_span!("predict", request_id = %Uuid::new_v4());
        self.run_prediction(review).instrument(span).await
    }

    async fn run_prediction(&self, review: &str) -> Result<Prediction> {
        let started = Instant::now();
        let vocabulary = self.ensure_loaded().await?;

        if review.is_empty() {
            warn!("Rejected request without review text");
            return Err(SentimentError::InvalidInput("No review text provided".to_string()));
        }

        let sequence = encode(vocabulary, review);
        debug!("Encoded review into {} non-padding tokens", sequence.content_len());

        let scores = self.models.score_both(sequence).await?;
        let prediction = Prediction {
            lstm: interpret(scores.lstm),
            rnn: interpret(scores.rnn),
        };

        info!(
            lstm = scores.lstm,
            rnn = scores.rnn,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Prediction complete"
        );
        Ok(prediction)
    }

    pub fn state(&self) -> EngineState {
        if self.vocabulary.is_loaded() && self.models.is_loaded() {
            EngineState::Warm
        } else {
            EngineState::Cold
        }
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            state: self.state(),
            vocabulary_loaded: self.vocabulary.is_loaded(),
            models_loaded: self.models.is_loaded(),
            warm_since: self.warm_since.get().copied(),
        }
    }
}
