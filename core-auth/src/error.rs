use crate::types::{AuthFailure, AuthFailureKind, ProviderKind};
use bridge_traits::BridgeError;
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Message returned whenever the user dismisses a provider flow.
pub const SIGN_IN_ABORTED_MESSAGE: &str = "Sign in aborted by user";

/// Message returned when the backend accepted a credential but produced no user.
pub const MISSING_IDENTITY_MESSAGE: &str = "Sign in failed: no user was returned";

/// Message returned when a sign-in is attempted while another is running.
pub const SIGN_IN_IN_PROGRESS_MESSAGE: &str = "A sign in is already in progress";

/// Backend-side failure categories.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BackendErrorCode {
    /// The provider token was rejected (malformed, expired, wrong audience)
    InvalidCredential,
    UserDisabled,
    /// The email is already linked to a different provider
    AccountExistsWithDifferentCredential,
    /// The provider is not enabled for this project
    OperationNotAllowed,
    Network,
    PermissionDenied,
    Other(String),
}

impl fmt::Display for BackendErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendErrorCode::InvalidCredential => f.write_str("invalid-credential"),
            BackendErrorCode::UserDisabled => f.write_str("user-disabled"),
            BackendErrorCode::AccountExistsWithDifferentCredential => {
                f.write_str("account-exists-with-different-credential")
            }
            BackendErrorCode::OperationNotAllowed => f.write_str("operation-not-allowed"),
            BackendErrorCode::Network => f.write_str("network-request-failed"),
            BackendErrorCode::PermissionDenied => f.write_str("permission-denied"),
            BackendErrorCode::Other(code) => f.write_str(code),
        }
    }
}

/// Error raised by the backend auth client or the profile store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("backend error [{code}]: {}", .message.as_deref().unwrap_or("<no message>"))]
pub struct BackendError {
    pub code: BackendErrorCode,
    pub message: Option<String>,
}

impl BackendError {
    pub fn new(code: BackendErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    pub fn without_message(code: BackendErrorCode) -> Self {
        Self {
            code,
            message: None,
        }
    }

    /// The message, unless it is missing or blank.
    pub fn user_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

/// Everything that can end a sign-in attempt early.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Sign in aborted by user")]
    ProviderAborted,

    #[error("{provider} sign in failed: {}", .reason.as_deref().unwrap_or("no reason given"))]
    Provider {
        provider: ProviderKind,
        reason: Option<String>,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("{0}")]
    Domain(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AuthError {
    /// Wraps a host SDK failure. The bridge detail is logged but not shown
    /// to the user.
    pub fn from_bridge(provider: ProviderKind, error: BridgeError) -> Self {
        warn!(provider = %provider, error = %error, "Identity provider SDK call failed");
        AuthError::Provider {
            provider,
            reason: None,
        }
    }

    pub fn kind(&self) -> AuthFailureKind {
        match self {
            AuthError::ProviderAborted => AuthFailureKind::ProviderAborted,
            AuthError::Provider { .. } => AuthFailureKind::ProviderError,
            AuthError::Backend(_) => AuthFailureKind::BackendAuth,
            AuthError::Domain(_) => AuthFailureKind::Domain,
            AuthError::Unexpected(_) => AuthFailureKind::Unknown,
        }
    }

    /// Message shown to the user; `generic` fills in when the error has none.
    pub fn user_message(&self, generic: &str) -> String {
        let specific = match self {
            AuthError::ProviderAborted => Some(SIGN_IN_ABORTED_MESSAGE),
            AuthError::Provider { reason, .. } => {
                reason.as_deref().map(str::trim).filter(|r| !r.is_empty())
            }
            AuthError::Backend(err) => err.user_message(),
            AuthError::Domain(message) => Some(message.as_str()),
            AuthError::Unexpected(_) => None,
        };

        specific.unwrap_or(generic).to_string()
    }

    pub fn to_failure(&self, generic: &str) -> AuthFailure {
        AuthFailure {
            kind: self.kind(),
            message: self.user_message(generic),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
