//! # Event Bus System
//!
//! Broadcast channel of sign-in lifecycle events.
//!
//! ## Overview
//!
//! The gateway publishes an [`AuthEvent`] for every step of a sign-in attempt
//! and for sign-out. Hosts subscribe to drive analytics, toasts or audit logs
//! without coupling to the gateway's return values. Events are fire-and-forget:
//! emitting with no subscribers is not an error for the publisher.
//!
//! Session *state* (who is signed in) is not carried here; that is the
//! gateway's `current_user()` stream, which replays the latest value to late
//! subscribers. The event bus does not replay.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{AuthEvent, EventBus};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(16);
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus.emit(AuthEvent::SigningIn { provider: "Google".to_string() }).ok();
//!
//! let event = subscriber.recv().await.unwrap();
//! assert_eq!(event.description(), "Sign in in progress");
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that fall further behind receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Events related to sign-in and sign-out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// A provider flow was started.
    SigningIn {
        /// Provider display name (e.g. "Google", "Apple").
        provider: String,
    },
    /// The backend accepted the credential and the profile was stored.
    SignedIn {
        /// Backend user id.
        user_id: String,
        provider: String,
    },
    /// The attempt ended in a failure result.
    SignInFailed {
        provider: String,
        /// Failure classification (e.g. "provider_aborted").
        kind: String,
        /// The message returned to the caller.
        message: String,
    },
    /// Backend session was cleared.
    SignedOut {
        /// User id of the session that ended, if one was active.
        user_id: Option<String>,
    },
}

impl AuthEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            AuthEvent::SigningIn { .. } => "Sign in in progress",
            AuthEvent::SignedIn { .. } => "User signed in successfully",
            AuthEvent::SignInFailed { .. } => "Sign in failed",
            AuthEvent::SignedOut { .. } => "User signed out",
        }
    }

    /// Returns the severity level of the event.
    ///
    /// A user dismissing the provider sheet is routine and only a warning.
    pub fn severity(&self) -> EventSeverity {
        match self {
            AuthEvent::SignInFailed { kind, .. } if kind == "provider_aborted" => {
                EventSeverity::Warning
            }
            AuthEvent::SignInFailed { .. } => EventSeverity::Error,
            AuthEvent::SignedIn { .. } | AuthEvent::SignedOut { .. } => EventSeverity::Info,
            AuthEvent::SigningIn { .. } => EventSeverity::Debug,
        }
    }
}

/// Central event bus for broadcasting auth events.
///
/// Cloning is cheap; all clones publish into the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AuthEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// A zero capacity is bumped to one since broadcast channels reject it.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are no active subscribers.
    pub fn emit(&self, event: AuthEvent) -> Result<usize, SendError<AuthEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber that receives all future events.
    pub fn subscribe(&self) -> Receiver<AuthEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

type EventFilter = Box<dyn Fn(&AuthEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{AuthEvent, EventBus, EventSeverity, EventStream};
///
/// let event_bus = EventBus::new(16);
/// let failures = EventStream::new(event_bus.subscribe())
///     .filter(|event| event.severity() >= EventSeverity::Error);
/// ```
pub struct EventStream {
    receiver: Receiver<AuthEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<AuthEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv()` / `try_recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&AuthEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &AuthEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` if the subscriber fell behind by `n` events,
    /// `RecvError::Closed` once every `EventBus` clone is dropped.
    pub async fn recv(&mut self) -> Result<AuthEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive a matching event without waiting.
    pub fn try_recv(&mut self) -> Option<Result<AuthEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
