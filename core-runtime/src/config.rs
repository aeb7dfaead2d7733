//! # Auth Configuration
//!
//! Settings for the sign-in gateway, built with a fail-fast builder.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::AuthConfig;
//! use bridge_traits::AppleScope;
//!
//! let config = AuthConfig::builder()
//!     .generic_failure_message("Something went wrong")
//!     .apple_scopes(vec![AppleScope::Email])
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.event_buffer_size, 100);
//! ```
//!
//! ## Environment
//!
//! [`AuthConfig::from_env`] reads:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `FEDAUTH_GENERIC_FAILURE_MESSAGE` | Fallback message for failures without a usable reason |
//! | `FEDAUTH_APPLE_SCOPES` | Comma separated: `email`, `full_name` |
//! | `FEDAUTH_EVENT_BUFFER` | Event bus capacity |
//! | `FEDAUTH_ALLOW_CONCURRENT_SIGN_IN` | `true` to let sign-in attempts overlap |

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::AppleScope;

/// Message used whenever a failure carries no usable reason of its own.
pub const DEFAULT_GENERIC_FAILURE_MESSAGE: &str = "An unknown error occurred";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub generic_failure_message: String,

    /// Scopes requested from Sign in with Apple.
    pub apple_scopes: Vec<AppleScope>,

    pub event_buffer_size: usize,

    /// When false, a sign-in started while another is in flight fails
    /// immediately instead of running a second provider flow.
    pub allow_concurrent_sign_in: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            generic_failure_message: DEFAULT_GENERIC_FAILURE_MESSAGE.to_string(),
            apple_scopes: vec![AppleScope::Email, AppleScope::FullName],
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            allow_concurrent_sign_in: false,
        }
    }
}

impl AuthConfig {
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder::default()
    }

    /// Builds a config from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(message) = lookup("FEDAUTH_GENERIC_FAILURE_MESSAGE") {
            builder = builder.generic_failure_message(message);
        }

        if let Some(scopes) = lookup("FEDAUTH_APPLE_SCOPES") {
            builder = builder.apple_scopes(parse_apple_scopes(&scopes)?);
        }

        if let Some(size) = lookup("FEDAUTH_EVENT_BUFFER") {
            let size = size.trim().parse::<usize>().map_err(|e| {
                Error::Config(format!("FEDAUTH_EVENT_BUFFER must be a number: {}", e))
            })?;
            builder = builder.event_buffer_size(size);
        }

        if let Some(flag) = lookup("FEDAUTH_ALLOW_CONCURRENT_SIGN_IN") {
            let allow = flag.trim().parse::<bool>().map_err(|e| {
                Error::Config(format!(
                    "FEDAUTH_ALLOW_CONCURRENT_SIGN_IN must be true or false: {}",
                    e
                ))
            })?;
            builder = builder.allow_concurrent_sign_in(allow);
        }

        builder.build()
    }

    pub fn validate(&self) -> Result<()> {
        if self.generic_failure_message.trim().is_empty() {
            return Err(Error::Config(
                "Generic failure message cannot be empty".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than zero".to_string(),
            ));
        }

        for (index, scope) in self.apple_scopes.iter().enumerate() {
            if self.apple_scopes[..index].contains(scope) {
                return Err(Error::Config(format!(
                    "Apple scope {:?} is listed more than once",
                    scope
                )));
            }
        }

        Ok(())
    }
}

fn parse_apple_scopes(raw: &str) -> Result<Vec<AppleScope>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.to_lowercase().as_str() {
            "email" => Ok(AppleScope::Email),
            "full_name" | "fullname" | "name" => Ok(AppleScope::FullName),
            other => Err(Error::Config(format!("Unknown Apple scope: {}", other))),
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct AuthConfigBuilder {
    generic_failure_message: Option<String>,
    apple_scopes: Option<Vec<AppleScope>>,
    event_buffer_size: Option<usize>,
    allow_concurrent_sign_in: Option<bool>,
}

impl AuthConfigBuilder {
    pub fn generic_failure_message(mut self, message: impl Into<String>) -> Self {
        self.generic_failure_message = Some(message.into());
        self
    }

    pub fn apple_scopes(mut self, scopes: Vec<AppleScope>) -> Self {
        self.apple_scopes = Some(scopes);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    pub fn allow_concurrent_sign_in(mut self, allow: bool) -> Self {
        self.allow_concurrent_sign_in = Some(allow);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<AuthConfig> {
        let defaults = AuthConfig::default();

        let config = AuthConfig {
            generic_failure_message: self
                .generic_failure_message
                .unwrap_or(defaults.generic_failure_message),
            apple_scopes: self.apple_scopes.unwrap_or(defaults.apple_scopes),
            event_buffer_size: self.event_buffer_size.unwrap_or(defaults.event_buffer_size),
            allow_concurrent_sign_in: self
                .allow_concurrent_sign_in
                .unwrap_or(defaults.allow_concurrent_sign_in),
        };

        config.validate()?;

        Ok(config)
    }
}
