// Typed errors with thiserror. Token decoding failures stay internal; host-facing ones become JS strings.

use thiserror::Error;

/// Why a single token decoding strategy rejected a token.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Decoded token is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Decoded token is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decoded token is JSON but not an object")]
    NotAnObject,
}

/// Errors surfaced to the host.
#[derive(Error, Debug)]
pub enum ClockError {
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Invalid config selection: {0}")]
    InvalidSelection(String),

    #[error("Invalid UTC offset: {minutes} minutes")]
    InvalidUtcOffset { minutes: i32 },

    #[error("Invalid timestamp: {0} ms since epoch")]
    InvalidTimestamp(f64),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ClockError {
    fn from(err: serde_json::Error) -> Self {
        ClockError::Serialization(err.to_string())
    }
}
