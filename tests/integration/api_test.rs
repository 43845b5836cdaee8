//! API endpoint integration tests
//!
//! Drives the chat routes through the full router with `oneshot`.

#![allow(dead_code)]

mod chats;
mod common;
mod messages;

use axum::http::{Method, StatusCode};
use tower::ServiceExt;

use crate::common::{json_request, ChatsTestApp};

#[tokio::test]
async fn test_health_check() {
    let app = ChatsTestApp::new().await.unwrap();
    let resp = app
        .test_router()
        .oneshot(json_request(Method::GET, "/health", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
