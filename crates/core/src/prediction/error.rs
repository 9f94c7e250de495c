//! Prediction service errors

use std::fmt;

/// Why a prediction-service call was discarded
///
/// Every variant is handled the same way by callers: use the local fallback.
/// The distinction only matters for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MlError {
    /// Built without the `ml` feature, or no HTTP client could be created
    ServiceDisabled,
    /// Connection refused, DNS failure, reset, ...
    Network(String),
    /// Request exceeded the configured timeout
    Timeout,
    /// Non-2xx response
    Status(u16),
    /// Body was not the expected JSON
    MalformedBody(String),
    /// Service answered `success: false`
    Unsuccessful,
}

impl fmt::Display for MlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlError::ServiceDisabled => write!(f, "Prediction service disabled"),
            MlError::Network(msg) => write!(f, "Network error: {msg}"),
            MlError::Timeout => write!(f, "Prediction service timed out"),
            MlError::Status(code) => write!(f, "Prediction service returned HTTP {code}"),
            MlError::MalformedBody(msg) => write!(f, "Malformed response: {msg}"),
            MlError::Unsuccessful => write!(f, "Prediction service reported failure"),
        }
    }
}

impl std::error::Error for MlError {}
