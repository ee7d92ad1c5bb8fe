//! Error types for health checking operations

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while executing a probe
///
/// These never escape the probe boundary: each variant is classified into a
/// `ServiceStatus` and an error message on the resulting `ServiceResult`.
#[derive(Error, Debug)]
pub enum HealthError {
    /// The check did not complete within its bound
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// TCP connection failed
    #[error("connection failed: {0}")]
    Connect(#[from] std::io::Error),

    /// Host name could not be resolved
    #[error("name resolution failed: {0}")]
    Resolution(String),

    /// HTTP transport failure
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
}
