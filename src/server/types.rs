use serde::{Deserialize, Serialize};

use crate::inference::EngineStatus;

/// Request body for `POST /api/predict`
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PredictRequest {
    /// Review text; a missing field is treated like an empty one
    #[serde(default)]
    pub review: Option<String>,
}

/// Body of every failed response
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Machine-readable error kind
    pub kind: String,
}

/// Liveness answer for `GET /api/predict`
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

/// Answer for `GET /health`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(flatten)]
    pub engine: EngineStatus,
}
