mod routes;
mod server;
pub mod types;

pub use server::{router, ApiServer};
pub use types::{ErrorResponse, HealthResponse, PredictRequest, StatusResponse};
