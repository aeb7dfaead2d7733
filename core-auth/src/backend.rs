use crate::error::BackendError;
use crate::types::{Identity, ProfileRecord, ProviderCredential};
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast;

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Transitions a subscriber may fall behind by before it starts losing them.
pub const DEFAULT_SESSION_CAPACITY: usize = 32;

/// The identity backend that turns provider credentials into a session.
#[async_trait]
pub trait BackendAuthClient: Send + Sync {
    /// Exchanges a provider credential for a backend session.
    ///
    /// `Ok(None)` means the backend accepted the request but produced no user.
    async fn sign_in_with_credential(
        &self,
        credential: ProviderCredential,
    ) -> BackendResult<Option<Identity>>;

    /// Sets the display name of the signed-in user and returns the updated identity.
    ///
    /// This is not a session transition and is not published to subscribers.
    async fn update_display_name(&self, display_name: &str) -> BackendResult<Identity>;

    /// Current session plus a receiver for every later transition.
    fn session(&self) -> SessionSubscription;

    async fn sign_out(&self) -> BackendResult<()>;
}

/// Document store holding one profile record per user.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Creates or merges the record keyed by `record.id`.
    async fn upsert(&self, record: &ProfileRecord) -> BackendResult<()>;
}

/// Session state at subscription time and the transitions that follow it.
#[derive(Debug)]
pub struct SessionSubscription {
    pub current: Option<Identity>,
    pub changes: broadcast::Receiver<Option<Identity>>,
}

/// Session state shared by a backend client and its subscribers.
///
/// Every transition is queued for every subscriber, so a slow reader sees
/// sign-in and sign-out in order instead of only the latest state.
#[derive(Debug)]
pub struct SessionChannel {
    state: Mutex<Option<Identity>>,
    changes: broadcast::Sender<Option<Identity>>,
}

impl SessionChannel {
    pub fn new(capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(capacity.max(1));

        Self {
            state: Mutex::new(None),
            changes,
        }
    }

    pub fn current(&self) -> Option<Identity> {
        self.lock().clone()
    }

    pub fn subscribe(&self) -> SessionSubscription {
        let state = self.lock();

        SessionSubscription {
            current: state.clone(),
            changes: self.changes.subscribe(),
        }
    }

    /// Publishes `identity` unless it equals the current session.
    ///
    /// Returns whether a transition was sent.
    pub fn publish(&self, identity: Option<Identity>) -> bool {
        let mut state = self.lock();
        if *state == identity {
            return false;
        }

        *state = identity.clone();
        // No receivers is fine; the state is still recorded.
        let _ = self.changes.send(identity);
        true
    }

    /// Replaces the signed-in identity without notifying subscribers.
    ///
    /// Does nothing when no one is signed in.
    pub fn refresh(&self, identity: Identity) {
        if let Some(current) = self.lock().as_mut() {
            *current = identity;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Identity>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SessionChannel {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> Identity {
        Identity {
            id: "uid-1".to_string(),
            email: Some("ada@example.com".to_string()),
            display_name: None,
        }
    }

    #[test]
    fn test_slow_subscriber_sees_every_transition() {
        let channel = SessionChannel::default();
        let mut subscription = channel.subscribe();
        assert_eq!(subscription.current, None);

        assert!(channel.publish(Some(ada())));
        assert!(channel.publish(None));

        assert_eq!(subscription.changes.try_recv().unwrap(), Some(ada()));
        assert_eq!(subscription.changes.try_recv().unwrap(), None);
        assert!(subscription.changes.try_recv().is_err());
    }

    #[test]
    fn test_duplicate_state_is_not_published() {
        let channel = SessionChannel::default();
        let mut subscription = channel.subscribe();

        assert!(channel.publish(Some(ada())));
        assert!(!channel.publish(Some(ada())));
        assert!(!channel.publish(Some(ada())));

        assert_eq!(subscription.changes.try_recv().unwrap(), Some(ada()));
        assert!(subscription.changes.try_recv().is_err());
    }

    #[test]
    fn test_refresh_is_silent() {
        let channel = SessionChannel::default();
        channel.publish(Some(ada()));
        let mut subscription = channel.subscribe();

        let renamed = Identity {
            display_name: Some("Ada Lovelace".to_string()),
            ..ada()
        };
        channel.refresh(renamed.clone());

        assert_eq!(channel.current(), Some(renamed));
        assert!(subscription.changes.try_recv().is_err());
    }

    #[test]
    fn test_refresh_without_session_is_ignored() {
        let channel = SessionChannel::default();
        channel.refresh(ada());
        assert_eq!(channel.current(), None);
    }

    #[test]
    fn test_late_subscriber_starts_from_current() {
        let channel = SessionChannel::new(0);
        channel.publish(Some(ada()));

        let mut subscription = channel.subscribe();
        assert_eq!(subscription.current, Some(ada()));
        assert!(subscription.changes.try_recv().is_err());
    }
}
