//! # Authentication Module
//!
//! Federated sign-in gateway with pluggable identity providers.
//!
//! ## Overview
//!
//! This crate signs a user in through a third-party identity provider
//! (Google, Apple), exchanges the provider credential with an identity
//! backend, and keeps a profile record for the user in a document store. UI
//! layers only ever see an [`AuthResult`] and a live stream of the signed-in
//! [`Identity`].
//!
//! ## Features
//!
//! - Google and Apple adapters over host SDK traits from `bridge-traits`
//! - Provider registry keyed by [`ProviderKind`]
//! - Backend and profile store behind traits, see `provider-firebase`
//! - Uniform failure mapping with a configurable generic message
//! - Auth event emission on the runtime event bus

pub mod apple;
pub mod backend;
pub mod error;
pub mod gateway;
pub mod google;
pub mod provider;
pub mod types;

pub use apple::AppleIdentityAdapter;
pub use backend::{
    BackendAuthClient, BackendResult, ProfileStore, SessionChannel, SessionSubscription,
};
pub use error::{AuthError, BackendError, BackendErrorCode, Result};
pub use gateway::{AuthGateway, SessionStream};
pub use google::GoogleIdentityAdapter;
pub use provider::IdentityProviderAdapter;
pub use types::{
    AuthFailure, AuthFailureKind, AuthResult, Identity, ProfileRecord, ProviderAuthorization,
    ProviderCredential, ProviderKind, ProviderOutcome,
};
