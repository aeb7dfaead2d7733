use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported federated identity providers.
///
/// # Examples
///
/// ```
/// use core_auth::ProviderKind;
///
/// let provider = ProviderKind::Apple;
/// assert_eq!(provider.display_name(), "Apple");
/// assert_eq!(provider.provider_id(), "apple.com");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderKind {
    Google,
    Apple,
}

impl ProviderKind {
    /// Human-readable name used in events and logs
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Google => "Google",
            ProviderKind::Apple => "Apple",
        }
    }

    /// Provider id understood by the identity backend
    pub fn provider_id(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google.com",
            ProviderKind::Apple => "apple.com",
        }
    }

    /// Stable identifier for configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::Apple => "apple",
        }
    }

    /// Parse a provider from its identifier or backend provider id
    ///
    /// ```
    /// use core_auth::ProviderKind;
    ///
    /// assert_eq!(ProviderKind::parse("google.com"), Some(ProviderKind::Google));
    /// assert_eq!(ProviderKind::parse("Apple"), Some(ProviderKind::Apple));
    /// assert_eq!(ProviderKind::parse("github"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "google" | "google.com" => Some(ProviderKind::Google),
            "apple" | "apple.com" => Some(ProviderKind::Apple),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The authenticated principal as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Backend user id
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            display_name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Token bundle issued by an identity provider.
///
/// Moved into the backend exchange and never cloned or persisted. At least
/// one of the two tokens is always present.
///
/// # Security
///
/// The `Debug` implementation redacts both tokens.
pub struct ProviderCredential {
    provider: ProviderKind,
    id_token: Option<String>,
    access_token: Option<String>,
}

impl ProviderCredential {
    /// Returns `None` when the provider handed back no token at all.
    ///
    /// ```
    /// use core_auth::{ProviderCredential, ProviderKind};
    ///
    /// assert!(ProviderCredential::new(ProviderKind::Google, None, None).is_none());
    ///
    /// let credential =
    ///     ProviderCredential::new(ProviderKind::Google, Some("id".into()), None).unwrap();
    /// assert_eq!(credential.id_token(), Some("id"));
    /// ```
    pub fn new(
        provider: ProviderKind,
        id_token: Option<String>,
        access_token: Option<String>,
    ) -> Option<Self> {
        let id_token = id_token.filter(|t| !t.is_empty());
        let access_token = access_token.filter(|t| !t.is_empty());

        if id_token.is_none() && access_token.is_none() {
            return None;
        }

        Some(Self {
            provider,
            id_token,
            access_token,
        })
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref()
    }

    /// OAuth access token (Google) or authorization code (Apple)
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

impl fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredential")
            .field("provider", &self.provider)
            .field("id_token", &self.id_token.as_ref().map(|_| "[REDACTED]"))
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// A credential together with what the provider told us about the user.
#[derive(Debug)]
pub struct ProviderAuthorization {
    pub credential: ProviderCredential,
    /// Set only when the provider supplied a complete name to apply to the
    /// backend session (Apple, first authorization).
    pub display_name: Option<String>,
}

impl ProviderAuthorization {
    pub fn new(credential: ProviderCredential) -> Self {
        Self {
            credential,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// How an interactive provider flow ended.
#[derive(Debug)]
pub enum ProviderOutcome {
    Authorized(ProviderAuthorization),
    /// The user dismissed the provider UI
    Cancelled,
    /// The provider reported a failure, optionally with a localized reason
    Failed { reason: Option<String> },
}

/// Classification carried by a failed [`AuthResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailureKind {
    ProviderAborted,
    ProviderError,
    BackendAuth,
    Domain,
    Unknown,
}

impl AuthFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthFailureKind::ProviderAborted => "provider_aborted",
            AuthFailureKind::ProviderError => "provider_error",
            AuthFailureKind::BackendAuth => "backend_auth",
            AuthFailureKind::Domain => "domain",
            AuthFailureKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AuthFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFailure {
    pub kind: AuthFailureKind,
    /// Human-readable, safe to show to the user
    pub message: String,
}

/// Outcome of a sign-in attempt.
///
/// # Examples
///
/// ```
/// use core_auth::{AuthFailure, AuthFailureKind, AuthResult};
///
/// let result = AuthResult::Failure(AuthFailure {
///     kind: AuthFailureKind::ProviderAborted,
///     message: "Sign in aborted by user".to_string(),
/// });
///
/// assert!(!result.is_success());
/// assert_eq!(result.message(), Some("Sign in aborted by user"));
/// ```
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuthResult {
    Success,
    Failure(AuthFailure),
}

impl AuthResult {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthResult::Success)
    }

    pub fn failure(&self) -> Option<&AuthFailure> {
        match self {
            AuthResult::Success => None,
            AuthResult::Failure(failure) => Some(failure),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.failure().map(|f| f.message.as_str())
    }

    pub fn kind(&self) -> Option<AuthFailureKind> {
        self.failure().map(|f| f.kind)
    }
}

/// User profile document, keyed by [`Identity::id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl From<&Identity> for ProfileRecord {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
        }
    }
}
