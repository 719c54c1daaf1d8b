//! Response envelopes shared by every endpoint.

use serde::{Deserialize, Serialize};

/// Error payload returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short human-readable summary.
    pub error: String,
    /// Human-readable cause.
    pub details: String,
}

impl ErrorBody {
    /// Creates an error body from a summary and its details.
    #[must_use]
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

/// Acknowledgement payload, e.g. for a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    /// Acknowledgement text.
    pub message: String,
}

impl MessageBody {
    /// Creates an acknowledgement with the given text.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
