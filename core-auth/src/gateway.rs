//! # Auth Gateway
//!
//! Single entry point the UI layer calls to sign users in and out.
//!
//! ## Overview
//!
//! The `AuthGateway` runs an interactive identity provider flow, exchanges
//! the resulting credential with the identity backend, applies a provider
//! supplied display name, and upserts the user's profile record. Every
//! failure along the way comes back as an [`AuthResult::Failure`] carrying a
//! message that is safe to show; nothing escapes the sign-in entry points,
//! panics included.
//!
//! Providers are registered by [`ProviderKind`], so adding one never touches
//! the gateway itself.
//!
//! ## Usage
//!
//! ```no_run
//! use core_auth::{AuthGateway, BackendAuthClient, ProfileStore};
//! use core_runtime::config::AuthConfig;
//! use bridge_traits::{AppleSignInSdk, GoogleSignInSdk};
//! use std::sync::Arc;
//! use tokio_stream::StreamExt;
//!
//! # async fn run(
//! #     backend: Arc<dyn BackendAuthClient>,
//! #     profiles: Arc<dyn ProfileStore>,
//! #     google: Arc<dyn GoogleSignInSdk>,
//! #     apple: Arc<dyn AppleSignInSdk>,
//! # ) {
//! let gateway = AuthGateway::new(backend, profiles, AuthConfig::default())
//!     .with_google_sdk(google)
//!     .with_apple_sdk(apple);
//!
//! let mut users = gateway.current_user();
//! tokio::spawn(async move {
//!     while let Some(user) = users.next().await {
//!         println!("session: {:?}", user.map(|u| u.id));
//!     }
//! });
//!
//! let result = gateway.sign_in_with_google().await;
//! if let Some(message) = result.message() {
//!     eprintln!("{}", message);
//! }
//! # }
//! ```

use crate::apple::AppleIdentityAdapter;
use crate::backend::{BackendAuthClient, ProfileStore, SessionSubscription};
use crate::error::{AuthError, Result, MISSING_IDENTITY_MESSAGE, SIGN_IN_IN_PROGRESS_MESSAGE};
use crate::google::GoogleIdentityAdapter;
use crate::provider::IdentityProviderAdapter;
use crate::types::{
    AuthFailureKind, AuthResult, Identity, ProfileRecord, ProviderAuthorization, ProviderKind,
    ProviderOutcome,
};
use bridge_traits::{AppleSignInSdk, GoogleSignInSdk};
use core_runtime::config::AuthConfig;
use core_runtime::events::{AuthEvent, EventBus};
use core_runtime::logging::redact_email;
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, info, instrument, warn};

/// Stream of session states returned by [`AuthGateway::current_user`].
pub type SessionStream = Pin<Box<dyn Stream<Item = Option<Identity>> + Send>>;

/// Orchestrates provider flows, the backend exchange and the profile upsert.
pub struct AuthGateway {
    providers: HashMap<ProviderKind, Arc<dyn IdentityProviderAdapter>>,
    backend: Arc<dyn BackendAuthClient>,
    profiles: Arc<dyn ProfileStore>,
    event_bus: EventBus,
    config: AuthConfig,
    /// Provider of the attempt currently running, if any
    in_flight: Mutex<Option<ProviderKind>>,
}

/// Clears the in-flight slot when the attempt ends, however it ends.
struct InFlightGuard<'a> {
    slot: Option<&'a Mutex<Option<ProviderKind>>>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot {
            *slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        }
    }
}

impl AuthGateway {
    /// Creates a gateway with no providers registered.
    pub fn new(
        backend: Arc<dyn BackendAuthClient>,
        profiles: Arc<dyn ProfileStore>,
        config: AuthConfig,
    ) -> Self {
        let event_bus = EventBus::new(config.event_buffer_size);

        Self {
            providers: HashMap::new(),
            backend,
            profiles,
            event_bus,
            config,
            in_flight: Mutex::new(None),
        }
    }

    /// Publishes events on a shared bus instead of the gateway's own.
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = event_bus;
        self
    }

    pub fn with_provider(mut self, adapter: Arc<dyn IdentityProviderAdapter>) -> Self {
        self.register_provider(adapter);
        self
    }

    /// Registers an adapter under its [`ProviderKind`], returning the one it replaced.
    pub fn register_provider(
        &mut self,
        adapter: Arc<dyn IdentityProviderAdapter>,
    ) -> Option<Arc<dyn IdentityProviderAdapter>> {
        let kind = adapter.kind();
        debug!(provider = %kind, "Registering identity provider");
        self.providers.insert(kind, adapter)
    }

    pub fn with_google_sdk(self, sdk: Arc<dyn GoogleSignInSdk>) -> Self {
        self.with_provider(Arc::new(GoogleIdentityAdapter::new(sdk)))
    }

    /// Registers Sign in with Apple with the scopes from the gateway config.
    pub fn with_apple_sdk(self, sdk: Arc<dyn AppleSignInSdk>) -> Self {
        let scopes = self.config.apple_scopes.clone();
        self.with_provider(Arc::new(AppleIdentityAdapter::new(sdk, scopes)))
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Registered providers in a stable order.
    pub fn providers(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<_> = self.providers.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Stream of the backend session.
    ///
    /// Each call returns a fresh stream that yields the current state first,
    /// then one element per session change, in order. It never ends while the
    /// backend client is alive.
    pub fn current_user(&self) -> SessionStream {
        let SessionSubscription { current, changes } = self.backend.session();

        let changes = BroadcastStream::new(changes).filter_map(|change| match change {
            Ok(identity) => Some(identity),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "Session subscriber fell behind, transitions dropped");
                None
            }
        });

        Box::pin(tokio_stream::once(current).chain(changes))
    }

    /// Snapshot of the signed-in identity.
    pub fn current_identity(&self) -> Option<Identity> {
        self.backend.session().current
    }

    pub async fn sign_in_with_google(&self) -> AuthResult {
        self.sign_in(ProviderKind::Google).await
    }

    pub async fn sign_in_with_apple(&self) -> AuthResult {
        self.sign_in(ProviderKind::Apple).await
    }

    /// Runs a complete sign-in with the given provider.
    ///
    /// Never fails: every error, and any panic raised by a collaborator, is
    /// normalized into [`AuthResult::Failure`].
    #[instrument(skip(self), fields(provider = %provider))]
    pub async fn sign_in(&self, provider: ProviderKind) -> AuthResult {
        let _guard = match self.begin_attempt(provider) {
            Ok(guard) => guard,
            Err(active) => {
                warn!(active = %active, "Sign in rejected, another attempt is in flight");
                return self.fail(
                    provider,
                    AuthError::Domain(SIGN_IN_IN_PROGRESS_MESSAGE.to_string()),
                );
            }
        };

        info!("Starting sign in");
        let _ = self.event_bus.emit(AuthEvent::SigningIn {
            provider: provider.display_name().to_string(),
        });

        let attempt = AssertUnwindSafe(self.run_sign_in(provider))
            .catch_unwind()
            .await;

        match attempt {
            Ok(Ok(identity)) => {
                info!(
                    user_id = %identity.id,
                    email = %identity.email.as_deref().map(redact_email).unwrap_or_default(),
                    "Sign in succeeded"
                );
                let _ = self.event_bus.emit(AuthEvent::SignedIn {
                    user_id: identity.id,
                    provider: provider.display_name().to_string(),
                });
                AuthResult::Success
            }
            Ok(Err(err)) => self.fail(provider, err),
            Err(payload) => {
                let detail = panic_detail(payload.as_ref());
                error!(panic = %detail, "Sign in panicked");
                self.fail(provider, AuthError::Unexpected(detail))
            }
        }
    }

    /// Signs out of every registered provider, then of the backend.
    ///
    /// Provider failures are logged and skipped; only a backend failure is
    /// returned.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<()> {
        let user_id = self.current_identity().map(|identity| identity.id);

        for kind in self.providers() {
            if let Some(adapter) = self.providers.get(&kind) {
                if let Err(err) = adapter.sign_out().await {
                    warn!(provider = %kind, error = %err, "Provider sign out failed");
                }
            }
        }

        if let Err(err) = self.backend.sign_out().await {
            error!(error = %err, "Backend sign out failed");
            return Err(err.into());
        }

        info!("Signed out");
        let _ = self.event_bus.emit(AuthEvent::SignedOut { user_id });
        Ok(())
    }

    fn begin_attempt(
        &self,
        provider: ProviderKind,
    ) -> std::result::Result<InFlightGuard<'_>, ProviderKind> {
        if self.config.allow_concurrent_sign_in {
            return Ok(InFlightGuard { slot: None });
        }

        let mut slot = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(active) = *slot {
            return Err(active);
        }

        *slot = Some(provider);
        Ok(InFlightGuard {
            slot: Some(&self.in_flight),
        })
    }

    async fn run_sign_in(&self, provider: ProviderKind) -> Result<Identity> {
        let adapter = self.providers.get(&provider).cloned().ok_or_else(|| {
            AuthError::Domain(format!("{} sign in is not available", provider))
        })?;

        let ProviderAuthorization {
            credential,
            display_name,
        } = match adapter.authorize().await? {
            ProviderOutcome::Authorized(authorization) => authorization,
            ProviderOutcome::Cancelled => return Err(AuthError::ProviderAborted),
            ProviderOutcome::Failed { reason } => {
                return Err(AuthError::Provider { provider, reason })
            }
        };

        debug!("Exchanging provider credential with backend");
        let identity = self
            .backend
            .sign_in_with_credential(credential)
            .await?
            .ok_or_else(|| AuthError::Domain(MISSING_IDENTITY_MESSAGE.to_string()))?;

        let identity = match display_name {
            Some(name) => {
                debug!("Applying provider display name");
                self.backend.update_display_name(&name).await?
            }
            None => identity,
        };

        self.profiles.upsert(&ProfileRecord::from(&identity)).await?;
        debug!(user_id = %identity.id, "Profile record stored");

        Ok(identity)
    }

    fn fail(&self, provider: ProviderKind, err: AuthError) -> AuthResult {
        let failure = err.to_failure(&self.config.generic_failure_message);

        match failure.kind {
            AuthFailureKind::ProviderAborted => info!("Sign in aborted by user"),
            AuthFailureKind::Unknown => error!(error = %err, "Sign in failed"),
            _ => warn!(kind = %failure.kind, error = %err, "Sign in failed"),
        }

        let _ = self.event_bus.emit(AuthEvent::SignInFailed {
            provider: provider.display_name().to_string(),
            kind: failure.kind.as_str().to_string(),
            message: failure.message.clone(),
        });

        AuthResult::Failure(failure)
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

impl fmt::Debug for AuthGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGateway")
            .field("providers", &self.providers())
            .field("event_bus", &self.event_bus)
            .field("config", &self.config)
            .finish()
    }
}
