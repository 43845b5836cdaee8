//! Domain entities for the Chats domain
//!
//! A chat links a user and a worker to one quickfix (booking) record and
//! carries the ordered message thread between them.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quickfix_common::{Error, Result};

/// Maximum participant / record id length
const MAX_ID_LENGTH: usize = 128;

/// Maximum message content length
pub const MAX_CONTENT_LENGTH: usize = 4000;

/// Chat lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatStatus {
    #[default]
    WaitingForResponse,
    Accepted,
    GettingSuggestions,
    WorkerRefused,
    Completed,
}

impl ChatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatStatus::WaitingForResponse => "WAITING_FOR_RESPONSE",
            ChatStatus::Accepted => "ACCEPTED",
            ChatStatus::GettingSuggestions => "GETTING_SUGGESTIONS",
            ChatStatus::WorkerRefused => "WORKER_REFUSED",
            ChatStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for ChatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored status value that matches no known status
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown chat status {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for ChatStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "WAITING_FOR_RESPONSE" => Ok(ChatStatus::WaitingForResponse),
            "ACCEPTED" => Ok(ChatStatus::Accepted),
            "GETTING_SUGGESTIONS" => Ok(ChatStatus::GettingSuggestions),
            "WORKER_REFUSED" => Ok(ChatStatus::WorkerRefused),
            "COMPLETED" => Ok(ChatStatus::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

fn validate_id(label: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{label} is required")));
    }
    if value.chars().count() > MAX_ID_LENGTH {
        return Err(Error::Validation(format!(
            "{label} must be at most {MAX_ID_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
}

impl Message {
    /// Create a message stamped now
    pub fn new(id: impl Into<String>, sender_id: impl Into<String>, content: impl Into<String>) -> Result<Self> {
        Self::new_at(id, sender_id, content, Utc::now())
    }

    /// Create a message with a fresh id
    pub fn compose(sender_id: impl Into<String>, content: impl Into<String>) -> Result<Self> {
        Self::new(Uuid::new_v4().to_string(), sender_id, content)
    }

    /// Create a message with an explicit timestamp
    pub fn new_at(
        id: impl Into<String>,
        sender_id: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        let (id, sender_id, content) = (id.into(), sender_id.into(), content.into());
        validate_id("Message id", &id)?;
        validate_id("Sender id", &sender_id)?;
        if content.trim().is_empty() {
            return Err(Error::Validation(
                "Message content cannot be empty or whitespace-only".to_string(),
            ));
        }
        if content.chars().count() > MAX_CONTENT_LENGTH {
            return Err(Error::Validation(format!(
                "Message content must be at most {MAX_CONTENT_LENGTH} characters"
            )));
        }

        Ok(Message {
            id,
            sender_id,
            content,
            timestamp,
            is_read: false,
        })
    }
}

/// Input for creating a chat
#[derive(Debug, Clone, PartialEq)]
pub struct NewChat {
    /// Caller-chosen id; allocated by the remote store when `None`
    pub id: Option<String>,
    pub user_id: String,
    pub worker_id: String,
    pub linked_job_id: String,
}

impl NewChat {
    /// A chat whose id is derived from its participants
    pub fn between(
        user_id: impl Into<String>,
        worker_id: impl Into<String>,
        linked_job_id: impl Into<String>,
    ) -> Self {
        let (user_id, worker_id) = (user_id.into(), worker_id.into());
        Self {
            id: Some(Chat::id_for(&user_id, &worker_id)),
            user_id,
            worker_id,
            linked_job_id: linked_job_id.into(),
        }
    }
}

/// Chat entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub user_id: String,
    pub worker_id: String,
    pub linked_job_id: String,
    pub messages: Vec<Message>,
    pub status: ChatStatus,
}

impl Chat {
    /// Deterministic chat id for a participant pair, independent of order
    pub fn id_for(a: &str, b: &str) -> String {
        if a <= b {
            format!("{a}{b}")
        } else {
            format!("{b}{a}")
        }
    }

    /// Create a new chat awaiting the worker's response
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        worker_id: impl Into<String>,
        linked_job_id: impl Into<String>,
    ) -> Result<Self> {
        let chat = Chat {
            id: id.into(),
            user_id: user_id.into(),
            worker_id: worker_id.into(),
            linked_job_id: linked_job_id.into(),
            messages: Vec::new(),
            status: ChatStatus::default(),
        };
        validate_id("Chat id", &chat.id)?;
        validate_id("User id", &chat.user_id)?;
        validate_id("Worker id", &chat.worker_id)?;
        validate_id("Linked job id", &chat.linked_job_id)?;
        if chat.user_id == chat.worker_id {
            return Err(Error::Validation(
                "A chat needs two distinct participants".to_string(),
            ));
        }
        Ok(chat)
    }

    /// Whether `participant` is one of the two chat members
    pub fn involves(&self, participant: &str) -> bool {
        self.user_id == participant || self.worker_id == participant
    }

    /// Participants and linked job are fixed for the chat's lifetime
    pub fn same_identity(&self, other: &Chat) -> bool {
        self.id == other.id
            && self.user_id == other.user_id
            && self.worker_id == other.worker_id
            && self.linked_job_id == other.linked_job_id
    }

    /// Reject threads where two messages share an id
    pub fn ensure_unique_messages(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for message in &self.messages {
            if !seen.insert(message.id.as_str()) {
                return Err(Error::Conflict(format!(
                    "Duplicate message id {} in chat {}",
                    message.id, self.id
                )));
            }
        }
        Ok(())
    }

    /// Copy of this chat with `message` appended
    pub fn with_message(&self, message: Message) -> Result<Chat> {
        if self.messages.iter().any(|m| m.id == message.id) {
            return Err(Error::Conflict(format!(
                "Message {} already exists in chat {}",
                message.id, self.id
            )));
        }
        let mut next = self.clone();
        next.messages.push(message);
        Ok(next)
    }

    /// Copy of this chat without the message `message_id`
    pub fn without_message(&self, message_id: &str) -> Result<Chat> {
        let mut next = self.clone();
        let before = next.messages.len();
        next.messages.retain(|m| m.id != message_id);
        if next.messages.len() == before {
            return Err(Error::NotFound(format!(
                "Message {message_id} not found in chat {}",
                self.id
            )));
        }
        Ok(next)
    }

    /// Copy with every message from the other participant marked read.
    /// `None` when nothing was unread.
    pub fn read_by(&self, reader_id: &str) -> Option<Chat> {
        let mut next = self.clone();
        let mut changed = false;
        for message in next.messages.iter_mut() {
            if message.sender_id != reader_id && !message.is_read {
                message.is_read = true;
                changed = true;
            }
        }
        changed.then_some(next)
    }
}
