pub mod market;
pub mod weather;

pub use market::*;
pub use weather::*;

use thiserror::Error;

/// Failures while talking to an external data provider. Never surfaced to
/// the caller directly — every gateway substitutes its demo dataset instead.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Cannot reach provider at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Provider returned status {0}")]
    BadStatus(u16),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing failed: {0}")]
    ResponseParsing(String),
}

impl GatewayError {
    pub(crate) fn from_reqwest(err: reqwest::Error, base_url: &str, timeout_secs: u64) -> Self {
        if err.is_connect() {
            GatewayError::Connection(base_url.to_string())
        } else if err.is_timeout() {
            GatewayError::Timeout(timeout_secs)
        } else {
            GatewayError::HttpClient(err.to_string())
        }
    }
}
