use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{Result, SentimentError};
use super::Vocabulary;

/// Somewhere a vocabulary can be fetched from.
#[async_trait]
pub trait VocabularySource: Send + Sync {
    /// Fetch and parse the vocabulary.
    async fn fetch(&self) -> Result<Vocabulary>;

    /// Human-readable location, used in logs
    fn describe(&self) -> String;
}

/// Fetches the metadata resource over HTTP.
pub struct HttpVocabularySource {
    client: reqwest::Client,
    url: String,
}

impl HttpVocabularySource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SentimentError::VocabularyUnavailable(
                format!("Failed to build HTTP client: {}", e)
            ))?;

        Ok(Self { client, url: url.into() })
    }
}

#[async_trait]
impl VocabularySource for HttpVocabularySource {
    async fn fetch(&self) -> Result<Vocabulary> {
        info!("Fetching vocabulary from {}", self.url);

        let response = self.client.get(&self.url).send().await
            .map_err(|e| SentimentError::VocabularyUnavailable(
                format!("Request to {} failed: {}", self.url, e)
            ))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SentimentError::VocabularyUnavailable(
                format!("{} answered with status {}", self.url, status)
            ));
        }

        let body = response.bytes().await
            .map_err(|e| SentimentError::VocabularyUnavailable(
                format!("Failed to read body from {}: {}", self.url, e)
            ))?;
        debug!("Vocabulary payload: {} bytes", body.len());

        Vocabulary::from_json(&body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads the metadata resource from a local file.
pub struct FileVocabularySource {
    path: PathBuf,
}

impl FileVocabularySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl VocabularySource for FileVocabularySource {
    async fn fetch(&self) -> Result<Vocabulary> {
        info!("Reading vocabulary from {}", self.path.display());

        let bytes = tokio::fs::read(&self.path).await
            .map_err(|e| SentimentError::VocabularyUnavailable(
                format!("Failed to read {}: {}", self.path.display(), e)
            ))?;

        Vocabulary::from_json(&bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Picks a source for a configured location: http(s) URLs are fetched,
/// anything else is treated as a file path.
pub fn source_from_location(location: &str, timeout: Duration) -> Result<Box<dyn VocabularySource>> {
    let lower = location.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(Box::new(HttpVocabularySource::new(location, timeout)?))
    } else {
        Ok(Box::new(FileVocabularySource::new(location)))
    }
}
