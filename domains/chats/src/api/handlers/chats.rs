//! Chat management API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use quickfix_common::{Error, Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::messages::MessageResponse;
use crate::api::middleware::ChatsState;
use crate::domain::entities::{Chat, ChatStatus, NewChat};

/// Request for creating a chat
#[derive(Debug, Deserialize, Validate)]
pub struct CreateChatRequest {
    /// Chat id; derived from the participants when omitted
    #[validate(length(min = 1, max = 128))]
    pub id: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub user_id: String,

    #[validate(length(min = 1, max = 128))]
    pub worker_id: String,

    /// Booking (quickfix) record this chat is about
    #[validate(length(min = 1, max = 128))]
    pub linked_job_id: String,
}

/// Request for changing a chat's status
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateChatStatusRequest {
    pub status: ChatStatus,
}

/// Query params for the existence check
#[derive(Debug, Deserialize)]
pub struct ChatExistsQuery {
    pub user_id: String,
    pub worker_id: String,
}

/// Chat response DTO
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub id: String,
    pub user_id: String,
    pub worker_id: String,
    pub linked_job_id: String,
    pub status: ChatStatus,
    pub messages: Vec<MessageResponse>,
}

impl From<Chat> for ChatResponse {
    fn from(c: Chat) -> Self {
        Self {
            id: c.id,
            user_id: c.user_id,
            worker_id: c.worker_id,
            linked_job_id: c.linked_job_id,
            status: c.status,
            messages: c.messages.into_iter().map(Into::into).collect(),
        }
    }
}

/// Existence check response
#[derive(Debug, Serialize)]
pub struct ChatExistsResponse {
    pub exists: bool,
    pub chat: Option<ChatResponse>,
}

/// List all chats
pub async fn list_chats(State(state): State<ChatsState>) -> Result<Json<Vec<ChatResponse>>> {
    let chats = state.repo.list_chats().await?;
    let responses: Vec<ChatResponse> = chats.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

/// Create a new chat
pub async fn create_chat(
    State(state): State<ChatsState>,
    ValidatedJson(req): ValidatedJson<CreateChatRequest>,
) -> Result<(StatusCode, Json<ChatResponse>)> {
    let new = match req.id {
        Some(id) => NewChat {
            id: Some(id),
            user_id: req.user_id,
            worker_id: req.worker_id,
            linked_job_id: req.linked_job_id,
        },
        None => NewChat::between(req.user_id, req.worker_id, req.linked_job_id),
    };

    let created = state.repo.create_chat(new).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Check whether two participants already share a chat
pub async fn chat_exists(
    State(state): State<ChatsState>,
    Query(query): Query<ChatExistsQuery>,
) -> Result<Json<ChatExistsResponse>> {
    if query.user_id.is_empty() || query.worker_id.is_empty() {
        return Err(Error::Validation(
            "user_id and worker_id are required".to_string(),
        ));
    }

    let chat = state
        .repo
        .chat_exists(&query.user_id, &query.worker_id)
        .await?;

    Ok(Json(ChatExistsResponse {
        exists: chat.is_some(),
        chat: chat.map(Into::into),
    }))
}

/// Get a single chat by ID
pub async fn get_chat(
    State(state): State<ChatsState>,
    Path(id): Path<String>,
) -> Result<Json<ChatResponse>> {
    let chat = state
        .repo
        .get_chat(&id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Chat {id} not found")))?;

    Ok(Json(chat.into()))
}

/// Move a chat to a new status
pub async fn update_chat_status(
    State(state): State<ChatsState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateChatStatusRequest>,
) -> Result<Json<ChatResponse>> {
    let chat = state.repo.update_status(&id, req.status).await?;
    Ok(Json(chat.into()))
}

/// Delete a chat from both stores
pub async fn delete_chat(
    State(state): State<ChatsState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.repo.delete_chat(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
