use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{info, warn, error};

use crate::error::SentimentError;
use crate::inference::InferenceEngine;
use super::types::{ErrorResponse, HealthResponse, PredictRequest, StatusResponse};

impl IntoResponse for SentimentError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            SentimentError::InvalidInput(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: message.clone(),
                    details: None,
                    kind: self.kind().to_string(),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Failed to process prediction".to_string(),
                    details: Some(self.to_string()),
                    kind: self.kind().to_string(),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Returns a plain-text liveness string
pub async fn root() -> &'static str {
    "ReelSense is running!"
}

/// Predicts the sentiment of one review with both models
pub async fn predict(
    State(engine): State<Arc<InferenceEngine>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected malformed predict body: {}", rejection.body_text());
            let body = ErrorResponse {
                error: "Invalid request body".to_string(),
                details: Some(rejection.body_text()),
                kind: "invalid_input".to_string(),
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    let review = request.review.unwrap_or_default();
    info!("Predict endpoint called ({} chars)", review.chars().count());

    match engine.predict(&review).await {
        Ok(prediction) => (StatusCode::OK, Json(prediction)).into_response(),
        Err(e) => {
            error!("Prediction error: {}", e);
            e.into_response()
        }
    }
}

/// Liveness check for the prediction API. Never loads anything.
pub async fn predict_status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        message: "Prediction API is running".to_string(),
    })
}

/// Reports whether the vocabulary and models are loaded. Never loads anything.
pub async fn health(State(engine): State<Arc<InferenceEngine>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        engine: engine.status(),
    })
}
