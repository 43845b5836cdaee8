//! Route definitions for Chats domain API

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{chats, messages};
use super::middleware::ChatsState;

/// Create chat routes
fn chat_routes() -> Router<ChatsState> {
    Router::new()
        .route("/v1/chats", get(chats::list_chats).post(chats::create_chat))
        .route("/v1/chats/exists", get(chats::chat_exists))
        .route(
            "/v1/chats/{id}",
            get(chats::get_chat)
                .patch(chats::update_chat_status)
                .delete(chats::delete_chat),
        )
}

/// Create message routes
fn message_routes() -> Router<ChatsState> {
    Router::new()
        .route("/v1/chats/{id}/messages", post(messages::send_message))
        .route(
            "/v1/chats/{id}/messages/{message_id}",
            delete(messages::delete_message),
        )
        .route("/v1/chats/{id}/read", post(messages::mark_read))
}

/// Create all Chats domain API routes
pub fn routes() -> Router<ChatsState> {
    Router::new().merge(chat_routes()).merge(message_routes())
}
