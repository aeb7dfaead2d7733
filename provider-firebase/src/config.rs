//! Firebase project settings.

use crate::error::{FirebaseError, Result};
use std::time::Duration;

pub const DEFAULT_IDENTITY_TOOLKIT_BASE: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_FIRESTORE_BASE: &str = "https://firestore.googleapis.com";
pub const DEFAULT_DATABASE_ID: &str = "(default)";
pub const DEFAULT_REQUEST_URI: &str = "http://localhost";
pub const DEFAULT_PROFILE_COLLECTION: &str = "users";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for a Firebase project.
///
/// ```
/// use provider_firebase::FirebaseConfig;
///
/// let config = FirebaseConfig::builder("web-api-key", "my-project")
///     .profile_collection("profiles")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.database_id, "(default)");
/// assert_eq!(config.profile_collection, "profiles");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseConfig {
    /// Web API key of the project
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    /// Continue URI sent with IdP sign-ins
    pub request_uri: String,
    /// Firestore collection holding one document per user
    pub profile_collection: String,
    pub identity_toolkit_base: String,
    pub firestore_base: String,
    pub request_timeout: Duration,
}

impl FirebaseConfig {
    pub fn builder(
        api_key: impl Into<String>,
        project_id: impl Into<String>,
    ) -> FirebaseConfigBuilder {
        FirebaseConfigBuilder {
            api_key: api_key.into(),
            project_id: project_id.into(),
            database_id: None,
            request_uri: None,
            profile_collection: None,
            identity_toolkit_base: None,
            firestore_base: None,
            request_timeout: None,
        }
    }

    /// Reads `FIREBASE_API_KEY`, `FIREBASE_PROJECT_ID` and the optional
    /// `FIREBASE_PROFILE_COLLECTION`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("FIREBASE_API_KEY")
            .ok_or_else(|| FirebaseError::Config("FIREBASE_API_KEY is not set".to_string()))?;
        let project_id = lookup("FIREBASE_PROJECT_ID")
            .ok_or_else(|| FirebaseError::Config("FIREBASE_PROJECT_ID is not set".to_string()))?;

        let mut builder = Self::builder(api_key, project_id);
        if let Some(collection) = lookup("FIREBASE_PROFILE_COLLECTION") {
            builder = builder.profile_collection(collection);
        }

        builder.build()
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("api_key", &self.api_key),
            ("project_id", &self.project_id),
            ("database_id", &self.database_id),
            ("request_uri", &self.request_uri),
            ("profile_collection", &self.profile_collection),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(FirebaseError::Config(format!("{} cannot be empty", name)));
            }
        }

        if self.profile_collection.contains('/') {
            return Err(FirebaseError::Config(
                "profile_collection must be a top-level collection id".to_string(),
            ));
        }

        for (name, base) in [
            ("identity_toolkit_base", &self.identity_toolkit_base),
            ("firestore_base", &self.firestore_base),
        ] {
            if !(base.starts_with("https://") || base.starts_with("http://")) {
                return Err(FirebaseError::Config(format!(
                    "{} must be an http(s) URL",
                    name
                )));
            }
        }

        if self.request_timeout.is_zero() {
            return Err(FirebaseError::Config(
                "request_timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Identity Toolkit endpoint for `method`, keyed with the API key.
    pub(crate) fn identity_toolkit_url(&self, method: &str) -> String {
        format!(
            "{}/v1/accounts:{}?key={}",
            self.identity_toolkit_base.trim_end_matches('/'),
            method,
            urlencoding::encode(&self.api_key)
        )
    }

    /// Firestore document path for the profile of `user_id`.
    pub(crate) fn profile_document_url(&self, user_id: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/{}/documents/{}/{}",
            self.firestore_base.trim_end_matches('/'),
            self.project_id,
            self.database_id,
            self.profile_collection,
            urlencoding::encode(user_id)
        )
    }
}

#[derive(Debug)]
pub struct FirebaseConfigBuilder {
    api_key: String,
    project_id: String,
    database_id: Option<String>,
    request_uri: Option<String>,
    profile_collection: Option<String>,
    identity_toolkit_base: Option<String>,
    firestore_base: Option<String>,
    request_timeout: Option<Duration>,
}

impl FirebaseConfigBuilder {
    pub fn database_id(mut self, id: impl Into<String>) -> Self {
        self.database_id = Some(id.into());
        self
    }

    pub fn request_uri(mut self, uri: impl Into<String>) -> Self {
        self.request_uri = Some(uri.into());
        self
    }

    pub fn profile_collection(mut self, collection: impl Into<String>) -> Self {
        self.profile_collection = Some(collection.into());
        self
    }

    /// Overrides the Identity Toolkit host, e.g. for the Auth emulator.
    pub fn identity_toolkit_base(mut self, base: impl Into<String>) -> Self {
        self.identity_toolkit_base = Some(base.into());
        self
    }

    pub fn firestore_base(mut self, base: impl Into<String>) -> Self {
        self.firestore_base = Some(base.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<FirebaseConfig> {
        let config = FirebaseConfig {
            api_key: self.api_key,
            project_id: self.project_id,
            database_id: self
                .database_id
                .unwrap_or_else(|| DEFAULT_DATABASE_ID.to_string()),
            request_uri: self
                .request_uri
                .unwrap_or_else(|| DEFAULT_REQUEST_URI.to_string()),
            profile_collection: self
                .profile_collection
                .unwrap_or_else(|| DEFAULT_PROFILE_COLLECTION.to_string()),
            identity_toolkit_base: self
                .identity_toolkit_base
                .unwrap_or_else(|| DEFAULT_IDENTITY_TOOLKIT_BASE.to_string()),
            firestore_base: self
                .firestore_base
                .unwrap_or_else(|| DEFAULT_FIRESTORE_BASE.to_string()),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        };

        config.validate()?;
        Ok(config)
    }
}
