//! # Firebase Backend
//!
//! Implements `BackendAuthClient` and `ProfileStore` over the Firebase REST APIs.
//!
//! ## Overview
//!
//! This module provides:
//! - Credential exchange through Identity Toolkit `accounts:signInWithIdp`
//! - Display name updates through `accounts:update`
//! - Profile documents in Cloud Firestore, written with an update mask
//! - Classification of REST error envelopes into `BackendErrorCode`s
//!
//! All traffic goes through the host `HttpClient`, so the same code runs on
//! every platform and tests substitute a mock transport.

pub mod auth;
pub mod config;
pub mod error;
pub mod firestore;
pub mod types;

pub use auth::{FirebaseAuthClient, IdTokenSource};
pub use config::FirebaseConfig;
pub use error::{FirebaseError, Result};
pub use firestore::FirestoreProfileStore;

use bridge_traits::http::HttpClient;
use std::sync::Arc;

/// Builds an auth client and a profile store sharing one session.
///
/// ```
/// use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
/// use provider_firebase::{firebase_backend, FirebaseConfig};
/// use std::sync::Arc;
///
/// # struct Offline;
/// # #[async_trait::async_trait]
/// # impl HttpClient for Offline {
/// #     async fn execute(&self, _: HttpRequest) -> bridge_traits::error::Result<HttpResponse> {
/// #         Err(bridge_traits::BridgeError::NotAvailable("offline".into()))
/// #     }
/// # }
/// let config = FirebaseConfig::builder("web-api-key", "my-project").build().unwrap();
/// let (auth, profiles) = firebase_backend(Arc::new(Offline), config);
/// ```
pub fn firebase_backend(
    http_client: Arc<dyn HttpClient>,
    config: FirebaseConfig,
) -> (Arc<FirebaseAuthClient>, Arc<FirestoreProfileStore>) {
    let auth = Arc::new(FirebaseAuthClient::new(http_client.clone(), config.clone()));
    let profiles = Arc::new(FirestoreProfileStore::new(
        http_client,
        config,
        auth.clone(),
    ));

    (auth, profiles)
}
