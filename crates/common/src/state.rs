//! Lifecycle transition errors
//!
//! Raised by the chat state machine.

use thiserror::Error;

/// Errors that can occur during status transitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("Invalid transition: cannot move from {from} to {to} via {event}")]
    InvalidTransition {
        from: String,
        to: String,
        event: String,
    },

    #[error("Terminal state: {0} is absorbing and cannot transition")]
    TerminalState(String),
}
