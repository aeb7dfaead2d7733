use thiserror::Error;

/// Failure reported by a host bridge implementation.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// Error raised by a host SDK, with the SDK's own code
    #[error("Platform error {code}: {message}")]
    Platform { code: String, message: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Invalid payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BridgeError {
    /// Shorthand for errors surfaced by a host SDK with its own error code.
    pub fn platform(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Platform {
            code: code.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
