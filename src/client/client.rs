use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use crate::inference::Prediction;
use crate::server::{ErrorResponse, HealthResponse, PredictRequest};

/// Why a client call failed.
///
/// `Unreachable` means the service never answered (deployment or network
/// problem); `Service` means it answered with an error (data or dependency
/// problem).
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Could not reach the inference service at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("The inference service returned an error ({status}): {error}")]
    Service {
        status: u16,
        error: String,
        details: Option<String>,
        kind: Option<String>,
    },

    #[error("Unexpected response from the inference service: {0}")]
    Decode(String),

    /// The local HTTP client could not be built
    #[error("Failed to set up the HTTP client: {0}")]
    Setup(String),
}

/// HTTP client for a running prediction server
#[derive(Clone)]
pub struct ReviewClient {
    client: Client,
    base_url: String,
}

impl ReviewClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one review for prediction
    pub async fn predict(&self, review: &str) -> Result<Prediction, ClientError> {
        let url = format!("{}/api/predict", self.base_url);
        let body = PredictRequest { review: Some(review.to_string()) };

        let response = self.client.post(&url).json(&body).send().await
            .map_err(|source| ClientError::Unreachable { url: url.clone(), source })?;

        if !response.status().is_success() {
            return Err(service_error(response).await);
        }

        response.json::<Prediction>().await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Fetches the load status of the service
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = format!("{}/health", self.base_url);

        let response = self.client.get(&url).send().await
            .map_err(|source| ClientError::Unreachable { url: url.clone(), source })?;

        if !response.status().is_success() {
            return Err(service_error(response).await);
        }

        response.json::<HealthResponse>().await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

async fn service_error(response: reqwest::Response) -> ClientError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) => ClientError::Service {
            status,
            error: body.error,
            details: body.details,
            kind: Some(body.kind),
        },
        Err(_) => ClientError::Service {
            status,
            error: if text.is_empty() { format!("HTTP {}", status) } else { text },
            details: None,
            kind: None,
        },
    }
}
