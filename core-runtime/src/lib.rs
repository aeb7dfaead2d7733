//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the sign-in core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Auth event bus
//!
//! ## Overview
//!
//! This crate holds the ambient pieces every other crate leans on, so that
//! `core-auth` stays focused on orchestrating the identity flows.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::AuthConfig;
pub use error::{Error, Result};
pub use events::{AuthEvent, EventBus};
