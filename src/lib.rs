//! Workspace facade crate.
//!
//! Host applications depend on `fedauth` and enable the documented features
//! instead of wiring each workspace crate individually:
//!
//! - `desktop` re-exports the reqwest-backed bridge implementations.
//! - `firebase` re-exports the Identity Toolkit / Firestore backend.
//!
//! The sign-in facade itself lives in [`auth`] and is always available.

pub use bridge_traits as bridge;
pub use core_auth as auth;
pub use core_runtime as runtime;

#[cfg(feature = "desktop")]
pub use bridge_desktop as desktop;

#[cfg(feature = "firebase")]
pub use provider_firebase as firebase;

pub use core_auth::{AuthGateway, AuthResult, Identity, ProviderKind};
