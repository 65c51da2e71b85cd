//! Error types for the Sensorium engine

use thiserror::Error;

/// Errors that can surface at the engine's embedding edges.
///
/// Sensor-data failures never appear here: a malformed event is silently
/// skipped and a failed consent call folds into that capability's denial.
/// These variants cover the genuine failure paths of the JSON surfaces and
/// the host transport.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to parse raw sensor event: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Consent request failed: {0}")]
    ConsentRequestFailed(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Unknown sensor channel: {0}")]
    UnsupportedChannel(String),
}
