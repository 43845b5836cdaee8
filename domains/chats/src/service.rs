//! Chat repository: the contract application code talks to
//!
//! Wraps the sync coordinator and owns the session gate. `init` must
//! complete before any other operation is used.

use std::sync::Arc;

use quickfix_auth::{AuthSession, SessionReady};
use quickfix_common::{Error, Result};
use tokio::sync::{Mutex, OnceCell};

use crate::domain::entities::{Chat, ChatStatus, Message, NewChat};
use crate::sync::SyncCoordinator;

#[derive(Clone)]
pub struct ChatRepository {
    sync: SyncCoordinator,
    gate: Arc<Mutex<Option<SessionReady>>>,
    session: Arc<OnceCell<AuthSession>>,
}

impl ChatRepository {
    pub fn new(sync: SyncCoordinator, ready: SessionReady) -> Self {
        Self {
            sync,
            gate: Arc::new(Mutex::new(Some(ready))),
            session: Arc::new(OnceCell::new()),
        }
    }

    /// Wait for the signed-in session. Later calls return the stored session.
    pub async fn init(&self) -> Result<AuthSession> {
        let session = self
            .session
            .get_or_try_init(|| async {
                // The receiver stays in the gate until the wait resolves, so a
                // cancelled `init` leaves it for the next caller.
                let mut gate = self.gate.lock().await;
                let ready = gate.as_mut().ok_or_else(|| {
                    Error::Internal("Session signal was already consumed".to_string())
                })?;
                let outcome = ready.recv().await;
                *gate = None;
                outcome.map_err(|e| Error::Internal(format!("Session unavailable: {e}")))
            })
            .await?;

        tracing::info!(user_id = %session.user_id, "Chat repository initialized");
        Ok(session.clone())
    }

    /// The session, once `init` has completed
    pub fn session(&self) -> Option<AuthSession> {
        self.session.get().cloned()
    }

    #[mutants::skip]
    pub fn new_chat_id(&self) -> String {
        self.sync.new_chat_id()
    }

    pub async fn list_chats(&self) -> Result<Vec<Chat>> {
        self.sync
            .list_chats()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to list chats"))
    }

    pub async fn get_chat(&self, id: &str) -> Result<Option<Chat>> {
        self.sync
            .get_chat(id)
            .await
            .inspect_err(|e| tracing::error!(chat_id = id, error = %e, "Failed to fetch chat"))
    }

    pub async fn create_chat(&self, new: NewChat) -> Result<Chat> {
        self.sync
            .create_chat(new)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to create chat"))
    }

    pub async fn update_chat(&self, chat: Chat) -> Result<Chat> {
        let id = chat.id.clone();
        self.sync
            .update_chat(chat)
            .await
            .inspect_err(|e| tracing::error!(chat_id = %id, error = %e, "Failed to update chat"))
    }

    pub async fn update_status(&self, id: &str, status: ChatStatus) -> Result<Chat> {
        self.sync.update_status(id, status).await.inspect_err(|e| {
            tracing::error!(chat_id = id, status = %status, error = %e, "Failed to update chat status")
        })
    }

    pub async fn send_message(&self, chat_id: &str, message: Message) -> Result<Chat> {
        self.sync
            .send_message(chat_id, message)
            .await
            .inspect_err(|e| tracing::error!(chat_id, error = %e, "Failed to send message"))
    }

    pub async fn delete_message(&self, chat_id: &str, message_id: &str) -> Result<Chat> {
        self.sync
            .delete_message(chat_id, message_id)
            .await
            .inspect_err(|e| {
                tracing::error!(chat_id, message_id, error = %e, "Failed to delete message")
            })
    }

    pub async fn mark_read(&self, chat_id: &str, reader_id: &str) -> Result<Chat> {
        self.sync
            .mark_read(chat_id, reader_id)
            .await
            .inspect_err(|e| tracing::error!(chat_id, error = %e, "Failed to mark chat read"))
    }

    pub async fn delete_chat(&self, id: &str) -> Result<()> {
        self.sync
            .delete_chat(id)
            .await
            .inspect_err(|e| tracing::error!(chat_id = id, error = %e, "Failed to delete chat"))
    }

    /// The chat between two participants, in either order
    pub async fn chat_exists(&self, a: &str, b: &str) -> Result<Option<Chat>> {
        self.sync
            .chat_exists(a, b)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to check chat existence"))
    }
}
