//! Google Sign-In adapter.

use crate::error::{AuthError, Result};
use crate::provider::IdentityProviderAdapter;
use crate::types::{ProviderAuthorization, ProviderCredential, ProviderKind, ProviderOutcome};
use async_trait::async_trait;
use bridge_traits::GoogleSignInSdk;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Wraps the host's Google Sign-In SDK.
pub struct GoogleIdentityAdapter {
    sdk: Arc<dyn GoogleSignInSdk>,
}

impl GoogleIdentityAdapter {
    pub fn new(sdk: Arc<dyn GoogleSignInSdk>) -> Self {
        Self { sdk }
    }

    /// Presents the account picker and fetches tokens for the chosen account.
    ///
    /// Returns `Ok(None)` when the user dismissed the picker.
    #[instrument(skip(self))]
    pub async fn sign_in_with_google(&self) -> Result<Option<ProviderCredential>> {
        let account = match self
            .sdk
            .sign_in()
            .await
            .map_err(|e| AuthError::from_bridge(ProviderKind::Google, e))?
        {
            Some(account) => account,
            None => {
                debug!("Google account picker dismissed");
                return Ok(None);
            }
        };

        let authentication = self
            .sdk
            .authentication(&account)
            .await
            .map_err(|e| AuthError::from_bridge(ProviderKind::Google, e))?;

        let credential = ProviderCredential::new(
            ProviderKind::Google,
            authentication.id_token,
            authentication.access_token,
        );

        match credential {
            Some(credential) => Ok(Some(credential)),
            None => {
                warn!("Google account returned no tokens");
                Err(AuthError::Provider {
                    provider: ProviderKind::Google,
                    reason: None,
                })
            }
        }
    }
}

#[async_trait]
impl IdentityProviderAdapter for GoogleIdentityAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    async fn authorize(&self) -> Result<ProviderOutcome> {
        Ok(match self.sign_in_with_google().await? {
            Some(credential) => ProviderOutcome::Authorized(ProviderAuthorization::new(credential)),
            None => ProviderOutcome::Cancelled,
        })
    }

    async fn sign_out(&self) -> Result<()> {
        let signed_in = self
            .sdk
            .is_signed_in()
            .await
            .map_err(|e| AuthError::from_bridge(ProviderKind::Google, e))?;

        if !signed_in {
            return Ok(());
        }

        self.sdk
            .sign_out()
            .await
            .map_err(|e| AuthError::from_bridge(ProviderKind::Google, e))
    }
}
