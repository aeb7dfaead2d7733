//! Identity Provider SDK Abstractions
//!
//! The interactive sign-in UIs of Google and Apple live in the host
//! application. These traits are the narrow surface the core needs from them:
//! run the flow, hand back tokens, report cancellation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Account selected in the Google account picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleAccount {
    /// Google account id (`sub`)
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Authentication tokens of a signed-in Google account.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct GoogleAuthentication {
    pub id_token: Option<String>,
    pub access_token: Option<String>,
}

impl fmt::Debug for GoogleAuthentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleAuthentication")
            .field("id_token", &self.id_token.as_ref().map(|_| "[REDACTED]"))
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Platform Google Sign-In SDK.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::identity::GoogleSignInSdk;
///
/// async fn tokens(sdk: &dyn GoogleSignInSdk) -> Result<Option<GoogleAuthentication>> {
///     match sdk.sign_in().await? {
///         Some(account) => Ok(Some(sdk.authentication(&account).await?)),
///         None => Ok(None), // user dismissed the picker
///     }
/// }
/// ```
#[async_trait]
pub trait GoogleSignInSdk: Send + Sync {
    /// Show the interactive account picker.
    ///
    /// Returns `Ok(None)` when the user dismisses it; that is not an error.
    async fn sign_in(&self) -> Result<Option<GoogleAccount>>;

    /// Fetch the tokens for an account returned by [`sign_in`](Self::sign_in).
    async fn authentication(&self, account: &GoogleAccount) -> Result<GoogleAuthentication>;

    /// Whether the SDK currently holds a Google session.
    async fn is_signed_in(&self) -> Result<bool>;

    /// Drop the Google session.
    async fn sign_out(&self) -> Result<()>;
}

/// Scopes that can be requested from Sign in with Apple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppleScope {
    Email,
    FullName,
}

/// Name components Apple returns on the first authorization only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonNameComponents {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

/// Credential returned by a successful Apple authorization.
#[derive(Clone, PartialEq, Eq)]
pub struct AppleIdCredential {
    /// Stable Apple user identifier
    pub user: String,
    /// JWT identity token
    pub identity_token: Option<String>,
    /// Short-lived authorization code
    pub authorization_code: Option<String>,
    pub email: Option<String>,
    /// Present only when [`AppleScope::FullName`] was granted
    pub full_name: Option<PersonNameComponents>,
}

impl fmt::Debug for AppleIdCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppleIdCredential")
            .field("user", &self.user)
            .field(
                "identity_token",
                &self.identity_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "authorization_code",
                &self.authorization_code.as_ref().map(|_| "[REDACTED]"),
            )
            .field("full_name", &self.full_name)
            .finish()
    }
}

/// Terminal status of an Apple authorization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppleAuthorizationStatus {
    Authorized(AppleIdCredential),
    /// The user dismissed the sheet
    Cancelled,
    Error {
        code: Option<i64>,
        localized_description: Option<String>,
    },
    /// A status the host could not map to the cases above
    Unrecognized(String),
}

/// Platform Sign in with Apple SDK.
#[async_trait]
pub trait AppleSignInSdk: Send + Sync {
    /// Whether Sign in with Apple can run on this device.
    async fn is_available(&self) -> bool {
        true
    }

    /// Run the authorization sheet for the given scopes.
    async fn request_authorization(&self, scopes: &[AppleScope])
        -> Result<AppleAuthorizationStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_authentication_debug_redacts_tokens() {
        let auth = GoogleAuthentication {
            id_token: Some("eyJhbGciOi".to_string()),
            access_token: None,
        };

        let debug = format!("{:?}", auth);
        assert!(!debug.contains("eyJhbGciOi"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("None"));
    }

    #[test]
    fn test_apple_credential_debug_redacts_tokens() {
        let credential = AppleIdCredential {
            user: "001234.abcd".to_string(),
            identity_token: Some("identity-jwt".to_string()),
            authorization_code: Some("auth-code".to_string()),
            email: None,
            full_name: None,
        };

        let debug = format!("{:?}", credential);
        assert!(debug.contains("001234.abcd"));
        assert!(!debug.contains("identity-jwt"));
        assert!(!debug.contains("auth-code"));
    }

    #[test]
    fn test_apple_scope_serialization() {
        let json = serde_json::to_string(&[AppleScope::Email, AppleScope::FullName]).unwrap();
        assert_eq!(json, r#"["email","full_name"]"#);
    }
}
