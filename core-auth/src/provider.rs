use crate::error::Result;
use crate::types::{ProviderKind, ProviderOutcome};
use async_trait::async_trait;

/// An interactive identity provider flow the gateway can drive.
///
/// Implementations translate a host SDK into a [`ProviderOutcome`]. User
/// cancellation and provider-reported failures are outcomes, not errors;
/// `Err` is reserved for the SDK call itself failing.
#[async_trait]
pub trait IdentityProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Runs the provider UI and returns how it ended.
    async fn authorize(&self) -> Result<ProviderOutcome>;

    /// Clears any provider-side session. Providers without one do nothing.
    async fn sign_out(&self) -> Result<()> {
        Ok(())
    }
}
