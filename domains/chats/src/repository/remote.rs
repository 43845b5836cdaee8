//! Remote authoritative chat store
//!
//! Chats live in a document collection (default `chats`). Field names match
//! the documents the mobile clients already read and write.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use quickfix_common::RemoteError;
use quickfix_firestore::{Document, DocumentService};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::entities::{Chat, ChatStatus, Message};

/// A single field written atomically by [`RemoteStore::update_field`]
#[derive(Debug, Clone, PartialEq)]
pub enum ChatField {
    Messages(Vec<Message>),
    Status(ChatStatus),
}

impl ChatField {
    const MESSAGES: &'static str = "messages";
    const STATUS: &'static str = "chatStatus";

    /// Document field name
    pub fn name(&self) -> &'static str {
        match self {
            ChatField::Messages(_) => Self::MESSAGES,
            ChatField::Status(_) => Self::STATUS,
        }
    }

    fn to_value(&self) -> Result<Value, RemoteError> {
        match self {
            ChatField::Messages(messages) => {
                let docs: Vec<MessageDocument> = messages.iter().map(MessageDocument::from).collect();
                serde_json::to_value(docs).map_err(|e| RemoteError::Decode(e.to_string()))
            }
            ChatField::Status(status) => Ok(json!(status.as_str())),
        }
    }
}

/// Authoritative, network-backed chat storage
#[async_trait::async_trait]
pub trait RemoteStore: Send + Sync {
    async fn get_by_id(&self, id: &str) -> Result<Option<Chat>, RemoteError>;

    async fn get_all(&self) -> Result<Vec<Chat>, RemoteError>;

    /// Chats whose id is the deterministic id of the pair `a`, `b`
    async fn query_by_participants(&self, a: &str, b: &str) -> Result<Vec<Chat>, RemoteError>;

    /// Create a chat; an existing id is `AlreadyExists`
    async fn create(&self, chat: &Chat) -> Result<(), RemoteError>;

    /// Overwrite the whole chat record
    async fn replace(&self, chat: &Chat) -> Result<(), RemoteError>;

    /// Atomically overwrite one field of an existing chat
    async fn update_field(&self, id: &str, field: ChatField) -> Result<(), RemoteError>;

    /// Atomically append a message to an existing chat's thread. A message
    /// already present remotely is left as is.
    async fn append_message(&self, id: &str, message: &Message) -> Result<(), RemoteError>;

    async fn delete(&self, id: &str) -> Result<(), RemoteError>;

    /// Allocate a fresh chat id
    fn new_id(&self) -> String;
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatDocument {
    #[serde(rename = "chatId")]
    chat_id: String,
    useruid: String,
    workeruid: String,
    #[serde(rename = "quickFixUid")]
    quick_fix_uid: String,
    #[serde(rename = "chatStatus", default)]
    chat_status: Option<String>,
    #[serde(default)]
    messages: Vec<MessageDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageDocument {
    message_id: String,
    sender_id: String,
    content: String,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    is_read: bool,
}

impl From<&Message> for MessageDocument {
    fn from(m: &Message) -> Self {
        Self {
            message_id: m.id.clone(),
            sender_id: m.sender_id.clone(),
            content: m.content.clone(),
            timestamp: m.timestamp,
            is_read: m.is_read,
        }
    }
}

impl From<MessageDocument> for Message {
    fn from(m: MessageDocument) -> Self {
        Self {
            id: m.message_id,
            sender_id: m.sender_id,
            content: m.content,
            timestamp: m.timestamp,
            is_read: m.is_read,
        }
    }
}

fn encode_chat(chat: &Chat) -> Result<Document, RemoteError> {
    let doc = ChatDocument {
        chat_id: chat.id.clone(),
        useruid: chat.user_id.clone(),
        workeruid: chat.worker_id.clone(),
        quick_fix_uid: chat.linked_job_id.clone(),
        chat_status: Some(chat.status.as_str().to_string()),
        messages: chat.messages.iter().map(MessageDocument::from).collect(),
    };
    match serde_json::to_value(doc) {
        Ok(Value::Object(fields)) => Ok(Document::new(chat.id.clone(), fields)),
        Ok(other) => Err(RemoteError::Decode(format!(
            "chat {} encoded to non-object {other}",
            chat.id
        ))),
        Err(e) => Err(RemoteError::Decode(e.to_string())),
    }
}

fn decode_chat(document: Document) -> Result<Chat, RemoteError> {
    let id = document.id;
    let doc: ChatDocument = serde_json::from_value(Value::Object(document.fields))
        .map_err(|e| RemoteError::Decode(format!("chat {id}: {e}")))?;

    let status = match doc.chat_status.as_deref() {
        None => ChatStatus::default(),
        Some(raw) => ChatStatus::from_str(raw)
            .map_err(|e| RemoteError::Decode(format!("chat {id}: {e}")))?,
    };

    Ok(Chat {
        id: doc.chat_id,
        user_id: doc.useruid,
        worker_id: doc.workeruid,
        linked_job_id: doc.quick_fix_uid,
        messages: doc.messages.into_iter().map(Message::from).collect(),
        status,
    })
}

/// [`RemoteStore`] over a generic document service
#[derive(Clone)]
pub struct DocumentRemoteStore {
    docs: Arc<dyn DocumentService>,
    collection: String,
}

impl DocumentRemoteStore {
    pub fn new(docs: Arc<dyn DocumentService>, collection: impl Into<String>) -> Self {
        Self {
            docs,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

#[async_trait::async_trait]
impl RemoteStore for DocumentRemoteStore {
    async fn get_by_id(&self, id: &str) -> Result<Option<Chat>, RemoteError> {
        self.docs
            .get(&self.collection, id)
            .await?
            .map(decode_chat)
            .transpose()
    }

    async fn get_all(&self) -> Result<Vec<Chat>, RemoteError> {
        self.docs
            .list(&self.collection)
            .await?
            .into_iter()
            .map(decode_chat)
            .collect()
    }

    async fn query_by_participants(&self, a: &str, b: &str) -> Result<Vec<Chat>, RemoteError> {
        let chat_id = Chat::id_for(a, b);
        self.docs
            .query_eq(&self.collection, "chatId", &json!(chat_id))
            .await?
            .into_iter()
            .map(decode_chat)
            .collect()
    }

    async fn create(&self, chat: &Chat) -> Result<(), RemoteError> {
        self.docs.create(&self.collection, encode_chat(chat)?).await?;
        Ok(())
    }

    async fn replace(&self, chat: &Chat) -> Result<(), RemoteError> {
        self.docs.set(&self.collection, encode_chat(chat)?).await?;
        Ok(())
    }

    async fn update_field(&self, id: &str, field: ChatField) -> Result<(), RemoteError> {
        let value = field.to_value()?;
        self.docs
            .update_field(&self.collection, id, field.name(), value)
            .await?;
        Ok(())
    }

    async fn append_message(&self, id: &str, message: &Message) -> Result<(), RemoteError> {
        let value = serde_json::to_value(MessageDocument::from(message))
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        self.docs
            .append_to_array(&self.collection, id, ChatField::MESSAGES, vec![value])
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        self.docs.delete(&self.collection, id).await?;
        Ok(())
    }

    fn new_id(&self) -> String {
        self.docs.new_id()
    }
}

/// Plain field map for a chat, as stored remotely
pub fn chat_fields(chat: &Chat) -> Result<Map<String, Value>, RemoteError> {
    encode_chat(chat).map(|doc| doc.fields)
}
