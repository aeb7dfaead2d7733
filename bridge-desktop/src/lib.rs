//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! Desktop hosts have no native Google or Apple sign-in SDK, so this crate
//! only ships the networking seam:
//! - `HttpClient` using `reqwest`
//!
//! The interactive identity SDK traits are implemented by the host
//! application that embeds the core.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use provider_firebase::{FirebaseAuthClient, FirebaseConfig};
//! use std::sync::Arc;
//!
//! let http = Arc::new(ReqwestHttpClient::new()?);
//! let backend = FirebaseAuthClient::new(http, FirebaseConfig::from_env()?);
//! ```

mod http;

pub use http::ReqwestHttpClient;
