//! Storage error types shared by the local cache and the remote store
//!
//! Neither layer retries: both error types are surfaced to the caller as-is.

use thiserror::Error;

/// Errors raised by the local chat cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to serialize cache payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Corrupt cache row: {0}")]
    Decode(String),
}

/// Errors raised by the remote authoritative store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Remote store rejected credentials: {0}")]
    Auth(String),

    #[error("Remote store quota exceeded: {0}")]
    Quota(String),

    #[error("Remote document not found: {0}")]
    NotFound(String),

    #[error("Remote document already exists: {0}")]
    AlreadyExists(String),

    #[error("Remote store returned {status}: {body}")]
    Response { status: u16, body: String },

    #[error("Malformed remote document: {0}")]
    Decode(String),
}
