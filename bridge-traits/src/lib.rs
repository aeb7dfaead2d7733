//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the sign-in core and the
//! platform-specific pieces it cannot drive itself. Interactive identity
//! provider SDKs (Google Sign-In, Sign in with Apple) only exist inside the
//! host application, so the core talks to them through the traits below and
//! tests substitute deterministic fakes.
//!
//! ## Traits
//!
//! ### Identity providers
//! - [`GoogleSignInSdk`](identity::GoogleSignInSdk) - Interactive Google account picker
//! - [`AppleSignInSdk`](identity::AppleSignInSdk) - `ASAuthorizationController` style flow
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with retry
//!
//! ### Utilities
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop` (HTTP only) | ✅ Available |
//! | iOS      | Host app (Google + Apple SDKs) | 📋 Planned |
//! | Android  | Host app (Google SDK) | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Host
//! implementations should convert platform-specific errors with
//! [`BridgeError::platform`](error::BridgeError::platform) so the original
//! code survives into logs.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so the core can hold them
//! behind `Arc<dyn Trait>` across async tasks.

pub mod error;
pub mod http;
pub mod identity;
pub mod log;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use identity::{
    AppleAuthorizationStatus, AppleIdCredential, AppleScope, AppleSignInSdk, GoogleAccount,
    GoogleAuthentication, GoogleSignInSdk, PersonNameComponents,
};
pub use log::{LogEntry, LogLevel, LoggerSink};
