//! # Vocabulary Store
//!
//! Holds the word → frequency-rank mapping the encoder reads from. The
//! mapping is fetched once per process, on first use, and is read-only
//! afterwards.

mod source;

pub use source::{source_from_location, FileVocabularySource, HttpVocabularySource, VocabularySource};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::error::{Result, SentimentError};

/// Word → rank mapping, rank 0 being the most frequent word.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: HashMap<String, u32>,
}

/// Accepted payload shapes: the metadata document carrying a `word_index`
/// object, or the bare mapping itself.
#[derive(Deserialize)]
#[serde(untagged)]
enum VocabularyPayload {
    Metadata { word_index: HashMap<String, u32> },
    Bare(HashMap<String, u32>),
}

impl Vocabulary {
    pub fn new(words: HashMap<String, u32>) -> Self {
        Self { words }
    }

    /// Parses a JSON vocabulary payload.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let payload: VocabularyPayload = serde_json::from_slice(bytes)
            .map_err(|e| SentimentError::VocabularyUnavailable(
                format!("Malformed vocabulary resource: {}", e)
            ))?;

        let words = match payload {
            VocabularyPayload::Metadata { word_index } => word_index,
            VocabularyPayload::Bare(words) => words,
        };

        if words.is_empty() {
            return Err(SentimentError::VocabularyUnavailable(
                "Vocabulary resource contains no words".to_string()
            ));
        }

        Ok(Self { words })
    }

    /// Rank of `word`, or `None` when the word is absent.
    pub fn lookup(&self, word: &str) -> Option<u32> {
        self.words.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(|(w, r)| (w.into(), r)).collect(),
        }
    }
}

/// Lazily populated, process-wide vocabulary.
pub struct VocabularyStore {
    source: Arc<dyn VocabularySource>,
    vocabulary: Arc<OnceCell<Vocabulary>>,
}

impl VocabularyStore {
    pub fn new(source: Box<dyn VocabularySource>) -> Self {
        Self {
            source: Arc::from(source),
            vocabulary: Arc::new(OnceCell::new()),
        }
    }

    /// Returns the vocabulary, fetching it on the first call.
    ///
    /// Concurrent first callers wait on a single fetch, which runs in its own
    /// task and completes even if every caller is dropped. A failed fetch
    /// leaves the store unloaded so a later call can try again.
    pub async fn ensure_loaded(&self) -> Result<&Vocabulary> {
        if let Some(vocabulary) = self.vocabulary.get() {
            return Ok(vocabulary);
        }

        let cell = Arc::clone(&self.vocabulary);
        let source = Arc::clone(&self.source);

        tokio::spawn(async move {
            cell.get_or_try_init(|| fetch_vocabulary(source.as_ref()))
                .await
                .map(|_| ())
        })
        .await
        .map_err(|e| SentimentError::VocabularyUnavailable(
            format!("Vocabulary loading task failed: {}", e)
        ))??;

        self.vocabulary.get().ok_or_else(|| SentimentError::VocabularyUnavailable(
            "Vocabulary not loaded".to_string()
        ))
    }

    /// Loaded vocabulary, without triggering a fetch.
    pub fn get(&self) -> Option<&Vocabulary> {
        self.vocabulary.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.vocabulary.initialized()
    }

    /// Rank of `word`; `None` when absent or when nothing is loaded yet.
    pub fn lookup(&self, word: &str) -> Option<u32> {
        self.get().and_then(|v| v.lookup(word))
    }
}

async fn fetch_vocabulary(source: &dyn VocabularySource) -> Result<Vocabulary> {
    let started = Instant::now();
    info!("Loading vocabulary from {}", source.describe());

    match source.fetch().await {
        Ok(vocabulary) => {
            info!(
                "Vocabulary loaded: {} words in {:?}",
                vocabulary.len(),
                started.elapsed()
            );
            Ok(vocabulary)
        }
        Err(e) => {
            error!("Failed to load vocabulary: {}", e);
            Err(e)
        }
    }
}
