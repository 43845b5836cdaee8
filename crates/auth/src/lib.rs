//! Session readiness for QuickFix
//!
//! The chat repository must not touch its stores before a user session
//! exists. Instead of a process-wide auth listener, the composition root
//! creates a one-shot channel with [`session_channel`], hands the
//! [`SessionReady`] half to the repository, and fires the [`SessionSignal`]
//! half exactly once when sign-in completes.

mod config;
mod error;
mod session;

pub use config::AuthConfig;
pub use error::AuthError;
pub use session::{session_channel, AuthSession, SessionReady, SessionSignal};
