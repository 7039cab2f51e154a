use std::sync::Arc;
use std::error::Error;
use tokio::net::TcpListener;
use axum::{Router, routing::get};
use tracing::info;

use crate::inference::InferenceEngine;
use super::routes;

/// Builds the HTTP routes around a shared engine
pub fn router(engine: Arc<InferenceEngine>) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/api/predict", get(routes::predict_status).post(routes::predict))
        .with_state(engine)
}

/// API Server for sentiment prediction requests
pub struct ApiServer {
    engine: Arc<InferenceEngine>,
    host: String,
    port: u16,
}

impl ApiServer {
    pub fn new(engine: InferenceEngine, host: String, port: u16) -> Self {
        info!("Creating new API server on {}:{}", host, port);
        Self {
            engine: Arc::new(engine),
            host,
            port,
        }
    }

    pub async fn start(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let app = router(Arc::clone(&self.engine));

        info!("Starting server on {}:{}", self.host, self.port);
        let listener = TcpListener::bind((self.host.as_str(), self.port)).await?;

        info!("Server started successfully; models load on the first prediction");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
