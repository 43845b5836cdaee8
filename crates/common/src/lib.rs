//! Shared utilities, configuration, and error handling for QuickFix
//!
//! This crate provides common functionality used across the chat workspace:
//! - Configuration management following 12-factor principles
//! - Error types for the local cache, the remote store, and state transitions
//! - Request extractors for the HTTP surface

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod state;

pub use config::Config;
pub use db::{CacheError, RemoteError};
pub use error::{Error, Result};
pub use extractors::ValidatedJson;
pub use state::StateError;
