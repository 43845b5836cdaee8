//! One-shot session readiness channel

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::AuthError;

/// The signed-in session handed to the repository once auth is ready
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: String,
    /// Bearer token for the remote store, when the backend requires one
    pub id_token: Option<String>,
}

impl AuthSession {
    pub fn new(user_id: impl Into<String>, id_token: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            id_token,
        }
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user_id", &self.user_id)
            .field("id_token", &self.id_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Create a connected signal/ready pair
pub fn session_channel() -> (SessionSignal, SessionReady) {
    let (tx, rx) = oneshot::channel();
    (SessionSignal { tx }, SessionReady { rx })
}

/// Firing half, owned by whatever completes sign-in.
///
/// `fire` consumes the signal, so it can only ever fire once.
#[derive(Debug)]
pub struct SessionSignal {
    tx: oneshot::Sender<AuthSession>,
}

impl SessionSignal {
    /// Announce the session. Returns `false` if nobody is waiting anymore.
    pub fn fire(self, session: AuthSession) -> bool {
        let user_id = session.user_id.clone();
        let delivered = self.tx.send(session).is_ok();
        if delivered {
            tracing::info!(user_id = %user_id, "Session ready");
        } else {
            tracing::warn!(user_id = %user_id, "Session ready but no listener remains");
        }
        delivered
    }
}

/// Waiting half, injected into the chat repository
#[derive(Debug)]
pub struct SessionReady {
    rx: oneshot::Receiver<AuthSession>,
}

impl SessionReady {
    /// A gate that is already open
    pub fn ready(session: AuthSession) -> Self {
        let (signal, ready) = session_channel();
        signal.fire(session);
        ready
    }

    /// Resolve once the session fires
    pub async fn wait(mut self) -> Result<AuthSession, AuthError> {
        self.recv().await
    }

    /// Like `wait`, but borrows the gate so a dropped wait can be resumed.
    ///
    /// Must not be called again once it has resolved.
    pub async fn recv(&mut self) -> Result<AuthSession, AuthError> {
        (&mut self.rx).await.map_err(|_| AuthError::SessionClosed)
    }
}
