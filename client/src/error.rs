use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use thiserror::Error;

/// Error taxonomy shared with the server, encoded as an integer on the
/// wire. `Unauthorized` is the sentinel that triggers the one-shot
/// refresh-and-retry protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum ErrorCode {
    ServerError = 0,
    InvalidRequest = 1,
    Duplicate = 2,
    WeakPassword = 3,
    Unauthorized = 4,
}

/// Error value surfaced across the whole public contract. The serde field
/// names match the server's JSON error bodies.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message} ({code:?})")]
pub struct AurumError {
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Code")]
    pub code: ErrorCode,
}

impl AurumError {
    pub fn new(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(message, ErrorCode::Unauthorized)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(message, ErrorCode::ServerError)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.code == ErrorCode::Unauthorized
    }
}
