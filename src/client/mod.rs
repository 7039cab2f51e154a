mod client;
mod display;
mod session;

pub use client::{ClientError, ReviewClient};
pub use display::{display_error, display_prediction, prediction_table};
pub use session::review_loop;
