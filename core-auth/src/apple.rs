//! Sign in with Apple adapter.

use crate::error::{AuthError, Result};
use crate::provider::IdentityProviderAdapter;
use crate::types::{ProviderAuthorization, ProviderCredential, ProviderKind, ProviderOutcome};
use async_trait::async_trait;
use bridge_traits::{AppleAuthorizationStatus, AppleIdCredential, AppleScope, AppleSignInSdk};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

const UNAVAILABLE_REASON: &str = "Sign in with Apple is not available on this device";

pub struct AppleIdentityAdapter {
    sdk: Arc<dyn AppleSignInSdk>,
    scopes: Vec<AppleScope>,
}

impl AppleIdentityAdapter {
    pub fn new(sdk: Arc<dyn AppleSignInSdk>, scopes: Vec<AppleScope>) -> Self {
        Self { sdk, scopes }
    }

    pub fn scopes(&self) -> &[AppleScope] {
        &self.scopes
    }

    fn requested(&self, scope: AppleScope) -> bool {
        self.scopes.contains(&scope)
    }

    fn authorized(&self, apple: AppleIdCredential) -> Result<ProviderOutcome> {
        let display_name = if self.requested(AppleScope::FullName) {
            apple.full_name.as_ref().and_then(|name| {
                let given = name.given_name.as_deref().map(str::trim).unwrap_or("");
                let family = name.family_name.as_deref().map(str::trim).unwrap_or("");
                // Only a complete name is applied to the session.
                (!given.is_empty() && !family.is_empty()).then(|| format!("{} {}", given, family))
            })
        } else {
            None
        };

        let credential = ProviderCredential::new(
            ProviderKind::Apple,
            apple.identity_token,
            apple.authorization_code,
        )
        .ok_or_else(|| {
            warn!("Apple authorization carried no identity token or code");
            AuthError::Provider {
                provider: ProviderKind::Apple,
                reason: None,
            }
        })?;

        let mut authorization = ProviderAuthorization::new(credential);
        if let Some(name) = display_name {
            authorization = authorization.with_display_name(name);
        }

        Ok(ProviderOutcome::Authorized(authorization))
    }
}

#[async_trait]
impl IdentityProviderAdapter for AppleIdentityAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Apple
    }

    #[instrument(skip(self), fields(scopes = ?self.scopes))]
    async fn authorize(&self) -> Result<ProviderOutcome> {
        if !self.sdk.is_available().await {
            warn!("Sign in with Apple unavailable");
            return Ok(ProviderOutcome::Failed {
                reason: Some(UNAVAILABLE_REASON.to_string()),
            });
        }

        let status = self
            .sdk
            .request_authorization(&self.scopes)
            .await
            .map_err(|e| AuthError::from_bridge(ProviderKind::Apple, e))?;

        match status {
            AppleAuthorizationStatus::Authorized(apple) => self.authorized(apple),
            AppleAuthorizationStatus::Cancelled => {
                debug!("Apple authorization cancelled");
                Ok(ProviderOutcome::Cancelled)
            }
            AppleAuthorizationStatus::Error {
                code,
                localized_description,
            } => {
                warn!(code = ?code, "Apple authorization failed");
                Ok(ProviderOutcome::Failed {
                    reason: localized_description,
                })
            }
            AppleAuthorizationStatus::Unrecognized(status) => {
                error!(status = %status, "Unhandled Apple authorization status");
                Err(AuthError::Unexpected(format!(
                    "unhandled Apple authorization status: {}",
                    status
                )))
            }
        }
    }
}
