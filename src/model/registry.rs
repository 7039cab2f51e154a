use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::config::ModelConfig;
use crate::error::{Result, SentimentError};
use crate::tokenizer::EncodedSequence;
use super::artifact::ModelArtifact;
use super::{ModelKind, SequenceScorer};

/// Produces a scorer for each model slot.
///
/// Loading is blocking work; the registry runs it off the async runtime.
pub trait ModelLoader: Send + Sync {
    fn load(&self, kind: ModelKind) -> Result<Arc<dyn SequenceScorer>>;
}

/// Loads JSON artifacts from fixed paths.
pub struct FileModelLoader {
    lstm_path: PathBuf,
    rnn_path: PathBuf,
}

impl FileModelLoader {
    pub fn new(lstm_path: PathBuf, rnn_path: PathBuf) -> Self {
        Self { lstm_path, rnn_path }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(config.lstm_path(), config.rnn_path())
    }

    fn path_for(&self, kind: ModelKind) -> &PathBuf {
        match kind {
            ModelKind::Lstm => &self.lstm_path,
            ModelKind::Rnn => &self.rnn_path,
        }
    }
}

impl ModelLoader for FileModelLoader {
    fn load(&self, kind: ModelKind) -> Result<Arc<dyn SequenceScorer>> {
        let path = self.path_for(kind);
        info!("Loading {} model from {}", kind, path.display());

        let artifact = ModelArtifact::read(path)?;
        if artifact.architecture != kind {
            return Err(SentimentError::ModelUnavailable(format!(
                "{} holds a {} model, expected {}", path.display(), artifact.architecture, kind
            )));
        }

        let network = artifact.into_network()?;
        debug!("{} model ready: {} hidden units", kind, network.hidden_size());
        Ok(Arc::new(network))
    }
}

struct LoadedModels {
    lstm: Arc<dyn SequenceScorer>,
    rnn: Arc<dyn SequenceScorer>,
}

/// Raw scores from both models for one sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorePair {
    pub lstm: f32,
    pub rnn: f32,
}

/// Process-wide holder of the two sentiment models.
pub struct ModelRegistry {
    loader: Arc<dyn ModelLoader>,
    models: Arc<OnceCell<LoadedModels>>,
}

impl ModelRegistry {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            models: Arc::new(OnceCell::new()),
        }
    }

    /// Loads both models on the first call; later calls return immediately.
    ///
    /// Concurrent first callers wait for one load. The load runs in its own
    /// task, so a caller that is dropped mid-load does not abandon it. If
    /// either model fails the registry stays empty and the error is returned.
    pub async fn ensure_loaded(&self) -> Result<()> {
        if self.models.initialized() {
            return Ok(());
        }

        let models = Arc::clone(&self.models);
        let loader = Arc::clone(&self.loader);

        tokio::spawn(async move {
            models
                .get_or_try_init(|| load_models(loader))
                .await
                .map(|_| ())
        })
        .await
        .map_err(|e| SentimentError::ModelUnavailable(format!("Model loading task failed: {}", e)))?
    }

    pub fn is_loaded(&self) -> bool {
        self.models.initialized()
    }

    /// Scores `sequence` with both models.
    ///
    /// The two runs are independent and execute concurrently on the blocking
    /// pool; if either fails the whole call fails.
    pub async fn score_both(&self, sequence: EncodedSequence) -> Result<ScorePair> {
        let models = self.models.get().ok_or_else(|| {
            SentimentError::ModelUnavailable("Models not loaded".to_string())
        })?;

        let sequence = Arc::new(sequence);
        let (lstm, rnn) = tokio::try_join!(
            run_scorer(Arc::clone(&models.lstm), Arc::clone(&sequence)),
            run_scorer(Arc::clone(&models.rnn), Arc::clone(&sequence)),
        )?;

        Ok(ScorePair { lstm, rnn })
    }
}

async fn load_models(loader: Arc<dyn ModelLoader>) -> Result<LoadedModels> {
    let started = Instant::now();

    let loaded = tokio::task::spawn_blocking(move || -> Result<LoadedModels> {
        Ok(LoadedModels {
            lstm: loader.load(ModelKind::Lstm)?,
            rnn: loader.load(ModelKind::Rnn)?,
        })
    })
    .await
    .map_err(|e| SentimentError::ModelUnavailable(format!("Model loading task failed: {}", e)))?;

    match loaded {
        Ok(models) => {
            info!("Models loaded successfully in {:?}", started.elapsed());
            Ok(models)
        }
        Err(e) => {
            error!("Failed to load models: {}", e);
            Err(e)
        }
    }
}

/// Runs one scorer off the async runtime and checks that its output is a
/// probability.
async fn run_scorer(scorer: Arc<dyn SequenceScorer>, sequence: Arc<EncodedSequence>) -> Result<f32> {
    let kind = scorer.kind();
    let score = tokio::task::spawn_blocking(move || scorer.score(&sequence))
        .await
        .map_err(|e| SentimentError::InferenceFailure(format!("{} scoring task failed: {}", kind, e)))?
        .map_err(|e| match e {
            SentimentError::InferenceFailure(msg) => SentimentError::InferenceFailure(format!("{}: {}", kind, msg)),
            other => other,
        })?;

    if !score.is_finite() || !(0.0..=1.0).contains(&score) {
        return Err(SentimentError::InferenceFailure(format!(
            "{} produced an out-of-range score: {}", kind, score
        )));
    }

    Ok(score)
}
