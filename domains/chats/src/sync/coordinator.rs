//! Sync coordinator: cache-first reads, write-through writes
//!
//! Reads consult the local cache and only fall back to the remote store when
//! the cache has nothing. Writes commit locally first; a failed local write
//! aborts the operation before the remote store is contacted. A remote
//! failure after the local commit is surfaced, never rolled back.
//!
//! Every write runs on its own spawned task, so once the local commit has
//! happened the remote attempt is made even if the caller stops waiting.

use std::future::Future;
use std::sync::Arc;

use quickfix_common::{Error, Result};

use crate::domain::entities::{Chat, ChatStatus, Message, NewChat};
use crate::domain::state::ChatStateMachine;
use crate::repository::{ChatField, LocalCache, RemoteStore};

/// Orchestrates the local cache and the remote store.
///
/// Holds no mutable state; clones share the same stores.
#[derive(Clone)]
pub struct SyncCoordinator {
    cache: Arc<dyn LocalCache>,
    remote: Arc<dyn RemoteStore>,
}

/// Run a write to completion on its own task
async fn detached<T, F>(write: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(write)
        .await
        .map_err(|e| Error::Internal(format!("Write task did not complete: {e}")))?
}

impl SyncCoordinator {
    pub fn new(cache: Arc<dyn LocalCache>, remote: Arc<dyn RemoteStore>) -> Self {
        Self { cache, remote }
    }

    /// Allocate a fresh chat id from the remote store
    #[mutants::skip]
    pub fn new_chat_id(&self) -> String {
        self.remote.new_id()
    }

    /// All chats, served from the cache when it has any
    pub async fn list_chats(&self) -> Result<Vec<Chat>> {
        match self.cache.get_all().await {
            Ok(chats) if !chats.is_empty() => {
                tracing::debug!(count = chats.len(), "Serving chats from local cache");
                return Ok(chats);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Local cache read failed, falling back to remote store");
            }
        }

        let chats = self.remote.get_all().await?;
        tracing::debug!(count = chats.len(), "Fetched chats from remote store");
        self.populate(&chats).await;
        Ok(chats)
    }

    /// One chat by id; `None` when neither store has it
    pub async fn get_chat(&self, id: &str) -> Result<Option<Chat>> {
        if let Some(chat) = self.cached(id).await {
            return Ok(Some(chat));
        }

        let chat = self.remote.get_by_id(id).await?;
        if let Some(chat) = &chat {
            self.populate(std::slice::from_ref(chat)).await;
        }
        Ok(chat)
    }

    /// The chat between `a` and `b`, if one exists in either store
    pub async fn chat_exists(&self, a: &str, b: &str) -> Result<Option<Chat>> {
        let id = Chat::id_for(a, b);
        if let Some(chat) = self.cached(&id).await {
            return Ok(Some(chat));
        }

        let found = self.remote.query_by_participants(a, b).await?;
        Ok(found.into_iter().next())
    }

    /// Create a chat awaiting the worker's response
    pub async fn create_chat(&self, new: NewChat) -> Result<Chat> {
        let id = match new.id {
            Some(id) => id,
            None => self.remote.new_id(),
        };
        let chat = Chat::new(id, new.user_id, new.worker_id, new.linked_job_id)?;

        if self.get_chat(&chat.id).await?.is_some() {
            return Err(Error::Conflict(format!("Chat {} already exists", chat.id)));
        }

        let (cache, remote) = self.stores();
        detached(async move {
            cache.upsert(&chat).await?;
            remote
                .create(&chat)
                .await
                .inspect_err(|e| remote_failed(&chat.id, "create", e))?;
            tracing::info!(chat_id = %chat.id, "Chat created");
            Ok(chat)
        })
        .await
    }

    /// Replace a whole chat. Participants and linked job cannot change; a
    /// status change must be a valid transition.
    pub async fn update_chat(&self, chat: Chat) -> Result<Chat> {
        let stored = self.load(&chat.id).await?;
        if !stored.same_identity(&chat) {
            return Err(Error::Validation(
                "Chat participants and linked job cannot be changed".to_string(),
            ));
        }
        if stored.status != chat.status {
            ChatStateMachine::transition_to(stored.status, chat.status)?;
        }
        chat.ensure_unique_messages()?;

        let (cache, remote) = self.stores();
        detached(async move {
            cache.upsert(&chat).await?;
            remote
                .replace(&chat)
                .await
                .inspect_err(|e| remote_failed(&chat.id, "replace", e))?;
            tracing::info!(chat_id = %chat.id, "Chat updated");
            Ok(chat)
        })
        .await
    }

    /// Move a chat to `status` through the state machine
    pub async fn update_status(&self, id: &str, status: ChatStatus) -> Result<Chat> {
        let mut chat = self.load(id).await?;
        let from = chat.status;
        chat.status = ChatStateMachine::transition_to(from, status)?;

        tracing::info!(chat_id = %chat.id, from = %from, to = %chat.status, "Chat status changing");
        self.write_fields(chat, vec![ChatField::Status(status)]).await
    }

    /// Append a message; replying during suggestions accepts the chat
    pub async fn send_message(&self, chat_id: &str, message: Message) -> Result<Chat> {
        let chat = self.load(chat_id).await?;
        if !chat.involves(&message.sender_id) {
            return Err(Error::Validation(format!(
                "Sender {} is not a participant of chat {chat_id}",
                message.sender_id
            )));
        }

        let next_status = ChatStateMachine::on_message_sent(chat.status)?;
        let mut updated = chat.with_message(message.clone())?;

        let accepted = if next_status != updated.status {
            tracing::info!(chat_id, from = %updated.status, to = %next_status, "Reply ends suggestion phase");
            updated.status = next_status;
            Some(ChatField::Status(next_status))
        } else {
            None
        };

        // The remote thread is appended to rather than rewritten, so messages
        // another device added since our copy was cached are kept.
        let (cache, remote) = self.stores();
        detached(async move {
            cache.upsert(&updated).await?;
            remote
                .append_message(&updated.id, &message)
                .await
                .inspect_err(|e| remote_failed(&updated.id, "append", e))?;
            if let Some(field) = accepted {
                let name = field.name();
                remote
                    .update_field(&updated.id, field)
                    .await
                    .inspect_err(|e| remote_failed(&updated.id, name, e))?;
            }
            Ok(updated)
        })
        .await
    }

    /// Remove one message from a chat
    pub async fn delete_message(&self, chat_id: &str, message_id: &str) -> Result<Chat> {
        let updated = self.load(chat_id).await?.without_message(message_id)?;
        let fields = vec![ChatField::Messages(updated.messages.clone())];
        self.write_fields(updated, fields).await
    }

    /// Mark every message not sent by `reader_id` as read
    pub async fn mark_read(&self, chat_id: &str, reader_id: &str) -> Result<Chat> {
        let chat = self.load(chat_id).await?;
        if !chat.involves(reader_id) {
            return Err(Error::Validation(format!(
                "Reader {reader_id} is not a participant of chat {chat_id}"
            )));
        }

        match chat.read_by(reader_id) {
            Some(updated) => {
                let fields = vec![ChatField::Messages(updated.messages.clone())];
                self.write_fields(updated, fields).await
            }
            None => Ok(chat),
        }
    }

    /// Delete a chat from both stores
    pub async fn delete_chat(&self, id: &str) -> Result<()> {
        if self.cached(id).await.is_none() && self.remote.get_by_id(id).await?.is_none() {
            return Err(Error::NotFound(format!("Chat {id} not found")));
        }

        let (cache, remote) = self.stores();
        let id = id.to_string();
        detached(async move {
            cache.delete(&id).await?;
            remote
                .delete(&id)
                .await
                .inspect_err(|e| remote_failed(&id, "delete", e))?;
            tracing::info!(chat_id = %id, "Chat deleted");
            Ok(())
        })
        .await
    }

    fn stores(&self) -> (Arc<dyn LocalCache>, Arc<dyn RemoteStore>) {
        (Arc::clone(&self.cache), Arc::clone(&self.remote))
    }

    /// Cache lookup where a read failure counts as a miss
    async fn cached(&self, id: &str) -> Option<Chat> {
        match self.cache.get(id).await {
            Ok(chat) => chat,
            Err(e) => {
                tracing::warn!(chat_id = id, error = %e, "Local cache read failed, treating as miss");
                None
            }
        }
    }

    /// Chat that must exist for a mutation
    async fn load(&self, id: &str) -> Result<Chat> {
        self.get_chat(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Chat {id} not found")))
    }

    /// Best-effort: a chat that fails to cache is still returned to the caller
    async fn populate(&self, chats: &[Chat]) {
        for chat in chats {
            if let Err(e) = self.cache.upsert(chat).await {
                tracing::warn!(chat_id = %chat.id, error = %e, "Failed to populate local cache");
            }
        }
    }

    /// Commit `chat` locally, then write each field remotely in order
    async fn write_fields(&self, chat: Chat, fields: Vec<ChatField>) -> Result<Chat> {
        let (cache, remote) = self.stores();
        detached(async move {
            cache.upsert(&chat).await?;
            for field in fields {
                let name = field.name();
                remote
                    .update_field(&chat.id, field)
                    .await
                    .inspect_err(|e| remote_failed(&chat.id, name, e))?;
            }
            Ok(chat)
        })
        .await
    }
}

fn remote_failed(chat_id: &str, op: &str, e: &quickfix_common::RemoteError) {
    tracing::warn!(chat_id, op, error = %e, "Remote write failed after local commit");
}
