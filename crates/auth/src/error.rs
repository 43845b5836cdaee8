//! Authentication errors

use thiserror::Error;

/// Authentication error
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    /// The signal half was dropped without ever firing
    #[error("Session signal dropped before a session became ready")]
    SessionClosed,

    #[error("Auth configuration error: {0}")]
    Configuration(String),
}
