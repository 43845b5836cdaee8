//! Message API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use quickfix_common::{Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::chats::ChatResponse;
use crate::api::middleware::ChatsState;
use crate::domain::entities::Message;

/// Request for sending a message
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    /// Client-chosen message id; generated when omitted
    #[validate(length(min = 1, max = 128))]
    pub id: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub sender_id: String,

    #[validate(length(min = 1, max = 4000))]
    pub content: String,
}

/// Request for marking a chat read
#[derive(Debug, Deserialize, Validate)]
pub struct MarkReadRequest {
    #[validate(length(min = 1, max = 128))]
    pub reader_id: String,
}

/// Message response DTO
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub sender_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            sender_id: m.sender_id,
            content: m.content,
            timestamp: m.timestamp,
            is_read: m.is_read,
        }
    }
}

/// Send a message to a chat
pub async fn send_message(
    State(state): State<ChatsState>,
    Path(chat_id): Path<String>,
    ValidatedJson(req): ValidatedJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<ChatResponse>)> {
    let message = match req.id {
        Some(id) => Message::new(id, req.sender_id, req.content)?,
        None => Message::compose(req.sender_id, req.content)?,
    };

    let chat = state.repo.send_message(&chat_id, message).await?;
    Ok((StatusCode::CREATED, Json(chat.into())))
}

/// Remove a message from a chat
pub async fn delete_message(
    State(state): State<ChatsState>,
    Path((chat_id, message_id)): Path<(String, String)>,
) -> Result<Json<ChatResponse>> {
    let chat = state.repo.delete_message(&chat_id, &message_id).await?;
    Ok(Json(chat.into()))
}

/// Mark the other participant's messages as read
pub async fn mark_read(
    State(state): State<ChatsState>,
    Path(chat_id): Path<String>,
    ValidatedJson(req): ValidatedJson<MarkReadRequest>,
) -> Result<Json<ChatResponse>> {
    let chat = state.repo.mark_read(&chat_id, &req.reader_id).await?;
    Ok(Json(chat.into()))
}
