//! Error types for the Firebase backend

use bridge_traits::error::BridgeError;
use core_auth::{BackendError, BackendErrorCode};
use thiserror::Error;

const INVALID_CREDENTIAL_MESSAGE: &str =
    "The supplied auth credential is malformed or has expired.";
const USER_DISABLED_MESSAGE: &str = "The user account has been disabled by an administrator.";
const ACCOUNT_EXISTS_MESSAGE: &str = "An account already exists with the same email address \
     but different sign-in credentials. Sign in using a provider associated with this email address.";
const OPERATION_NOT_ALLOWED_MESSAGE: &str =
    "The given sign-in provider is disabled for this Firebase project.";
const NETWORK_MESSAGE: &str =
    "Network error (such as timeout, interrupted connection or unreachable host) has occurred.";
const PERMISSION_DENIED_MESSAGE: &str = "Missing or insufficient permissions.";
const SESSION_EXPIRED_MESSAGE: &str =
    "The user's credential is no longer valid. The user must sign in again.";
const TOO_MANY_ATTEMPTS_MESSAGE: &str =
    "We have blocked all requests from this device due to unusual activity. Try again later.";
const NOT_SIGNED_IN_MESSAGE: &str = "No user is currently signed in.";

/// Firebase backend errors
#[derive(Error, Debug)]
pub enum FirebaseError {
    #[error("Invalid Firebase configuration: {0}")]
    Config(String),

    /// Identity Toolkit rejected the request. `code` is the upper-case
    /// error code from the response envelope.
    #[error("Identity Toolkit error (status {status}): {code}")]
    IdentityToolkit {
        status: u16,
        code: String,
        detail: Option<String>,
    },

    #[error("Firestore error (status {status}): {code}")]
    Firestore {
        status: u16,
        code: String,
        message: Option<String>,
    },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("No user is signed in")]
    NotSignedIn,

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Result type for Firebase operations
pub type Result<T> = std::result::Result<T, FirebaseError>;

impl FirebaseError {
    /// Builds an Identity Toolkit error from a raw `"CODE : detail"` message.
    pub fn identity_toolkit(status: u16, raw: &str) -> Self {
        let (code, detail) = match raw.split_once(':') {
            Some((code, detail)) => (code.trim(), Some(detail.trim())),
            None => (raw.trim(), None),
        };

        FirebaseError::IdentityToolkit {
            status,
            code: code.to_string(),
            detail: detail.filter(|d| !d.is_empty()).map(str::to_string),
        }
    }
}

fn classify_identity_toolkit(code: &str, detail: Option<String>) -> BackendError {
    match code {
        "INVALID_IDP_RESPONSE" | "INVALID_CREDENTIAL" | "INVALID_ID_TOKEN"
        | "INVALID_IDENTIFIER" | "MISSING_OR_INVALID_NONCE" => {
            BackendError::new(BackendErrorCode::InvalidCredential, INVALID_CREDENTIAL_MESSAGE)
        }
        "USER_DISABLED" => BackendError::new(BackendErrorCode::UserDisabled, USER_DISABLED_MESSAGE),
        "FEDERATED_USER_ID_ALREADY_LINKED" | "EMAIL_EXISTS" | "NEED_CONFIRMATION" => {
            BackendError::new(
                BackendErrorCode::AccountExistsWithDifferentCredential,
                ACCOUNT_EXISTS_MESSAGE,
            )
        }
        "OPERATION_NOT_ALLOWED" => BackendError::new(
            BackendErrorCode::OperationNotAllowed,
            OPERATION_NOT_ALLOWED_MESSAGE,
        ),
        "PERMISSION_DENIED" => {
            BackendError::new(BackendErrorCode::PermissionDenied, PERMISSION_DENIED_MESSAGE)
        }
        "TOKEN_EXPIRED" | "USER_NOT_FOUND" | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => {
            BackendError::new(BackendErrorCode::Other(code.to_string()), SESSION_EXPIRED_MESSAGE)
        }
        "TOO_MANY_ATTEMPTS_TRY_LATER" => BackendError::new(
            BackendErrorCode::Other(code.to_string()),
            TOO_MANY_ATTEMPTS_MESSAGE,
        ),
        other => BackendError {
            code: BackendErrorCode::Other(other.to_string()),
            message: detail,
        },
    }
}

fn classify_firestore(status: &str, message: Option<String>) -> BackendError {
    match status {
        "PERMISSION_DENIED" | "UNAUTHENTICATED" => {
            BackendError::new(BackendErrorCode::PermissionDenied, PERMISSION_DENIED_MESSAGE)
        }
        "UNAVAILABLE" | "DEADLINE_EXCEEDED" => {
            BackendError::new(BackendErrorCode::Network, NETWORK_MESSAGE)
        }
        other => BackendError {
            code: BackendErrorCode::Other(other.to_string()),
            message,
        },
    }
}

impl From<FirebaseError> for BackendError {
    fn from(error: FirebaseError) -> Self {
        match error {
            FirebaseError::IdentityToolkit { code, detail, .. } => {
                classify_identity_toolkit(&code, detail)
            }
            FirebaseError::Firestore { code, message, .. } => classify_firestore(&code, message),
            FirebaseError::Bridge(BridgeError::Serialization(_)) | FirebaseError::Parse(_) => {
                BackendError::without_message(BackendErrorCode::Other("INTERNAL_ERROR".to_string()))
            }
            FirebaseError::Bridge(_) => {
                BackendError::new(BackendErrorCode::Network, NETWORK_MESSAGE)
            }
            FirebaseError::NotSignedIn => BackendError::new(
                BackendErrorCode::Other("NO_CURRENT_USER".to_string()),
                NOT_SIGNED_IN_MESSAGE,
            ),
            FirebaseError::Config(_) => {
                BackendError::without_message(BackendErrorCode::Other("INVALID_CONFIG".to_string()))
            }
        }
    }
}
