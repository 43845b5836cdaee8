//! Message handler integration tests

use axum::http::{Method, StatusCode};
use quickfix_chats::{ChatStatus, NewChat};
use serde_json::json;
use tower::ServiceExt;

use crate::common::{json_request, parse_body, ChatsTestApp};

/// Helper: app with the u1/w1 chat already created
async fn app_with_chat() -> ChatsTestApp {
    let app = ChatsTestApp::new().await.unwrap();
    app.repo
        .create_chat(NewChat::between("u1", "w1", "qf1"))
        .await
        .unwrap();
    app
}

mod test_send_message {
    use super::*;

    #[tokio::test]
    async fn test_send_message_returns_201() {
        let app = app_with_chat().await;

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::POST,
                "/v1/chats/u1w1/messages",
                Some(json!({"id": "m1", "sender_id": "u1", "content": "Hello!"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = parse_body(resp).await;
        assert_eq!(body["messages"][0]["id"], "m1");
        assert_eq!(body["messages"][0]["content"], "Hello!");
        assert_eq!(body["messages"][0]["is_read"], false);

        let remote = app.docs.document("chats", "u1w1").unwrap();
        assert_eq!(remote.fields["messages"][0]["messageId"], "m1");
    }

    #[tokio::test]
    async fn test_send_message_without_id_generates_one() {
        let app = app_with_chat().await;

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::POST,
                "/v1/chats/u1w1/messages",
                Some(json!({"sender_id": "w1", "content": "On my way"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = parse_body(resp).await;
        assert!(!body["messages"][0]["id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_whitespace_message_returns_400() {
        let app = app_with_chat().await;

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::POST,
                "/v1/chats/u1w1/messages",
                Some(json!({"sender_id": "u1", "content": "   "})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_send_message_from_outsider_returns_400() {
        let app = app_with_chat().await;

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::POST,
                "/v1/chats/u1w1/messages",
                Some(json!({"sender_id": "x9", "content": "hi"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_send_duplicate_message_id_returns_409() {
        let app = app_with_chat().await;
        let send = || {
            json_request(
                Method::POST,
                "/v1/chats/u1w1/messages",
                Some(json!({"id": "m1", "sender_id": "u1", "content": "Hello!"})),
            )
        };

        let resp = app.test_router().oneshot(send()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = app.test_router().oneshot(send()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_send_to_unknown_chat_returns_404() {
        let app = ChatsTestApp::new().await.unwrap();

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::POST,
                "/v1/chats/ghost/messages",
                Some(json!({"sender_id": "u1", "content": "hi"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reply_during_suggestions_accepts_chat() {
        let app = app_with_chat().await;
        app.repo
            .update_status("u1w1", ChatStatus::GettingSuggestions)
            .await
            .unwrap();

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::POST,
                "/v1/chats/u1w1/messages",
                Some(json!({"sender_id": "u1", "content": "Tuesday at 10 works"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(parse_body(resp).await["status"], "ACCEPTED");

        let remote = app.docs.document("chats", "u1w1").unwrap();
        assert_eq!(remote.str_field("chatStatus"), Some("ACCEPTED"));
    }

    #[tokio::test]
    async fn test_send_to_refused_chat_returns_409() {
        let app = app_with_chat().await;
        app.repo
            .update_status("u1w1", ChatStatus::WorkerRefused)
            .await
            .unwrap();

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::POST,
                "/v1/chats/u1w1/messages",
                Some(json!({"sender_id": "u1", "content": "Please reconsider"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}

mod test_delete_message {
    use super::*;

    #[tokio::test]
    async fn test_delete_message_returns_200() {
        let app = app_with_chat().await;
        app.test_router()
            .oneshot(json_request(
                Method::POST,
                "/v1/chats/u1w1/messages",
                Some(json!({"id": "m1", "sender_id": "u1", "content": "Hello!"})),
            ))
            .await
            .unwrap();

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::DELETE,
                "/v1/chats/u1w1/messages/m1",
                None,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(parse_body(resp).await["messages"], json!([]));
    }

    #[tokio::test]
    async fn test_delete_unknown_message_returns_404() {
        let app = app_with_chat().await;

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::DELETE,
                "/v1/chats/u1w1/messages/m404",
                None,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

mod test_mark_read {
    use super::*;

    #[tokio::test]
    async fn test_mark_read_flags_incoming_messages() {
        let app = app_with_chat().await;
        app.test_router()
            .oneshot(json_request(
                Method::POST,
                "/v1/chats/u1w1/messages",
                Some(json!({"id": "m1", "sender_id": "u1", "content": "Hello!"})),
            ))
            .await
            .unwrap();

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::POST,
                "/v1/chats/u1w1/read",
                Some(json!({"reader_id": "w1"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(parse_body(resp).await["messages"][0]["is_read"], true);

        let remote = app.docs.document("chats", "u1w1").unwrap();
        assert_eq!(remote.fields["messages"][0]["isRead"], true);
    }

    #[tokio::test]
    async fn test_mark_read_by_sender_changes_nothing() {
        let app = app_with_chat().await;
        app.test_router()
            .oneshot(json_request(
                Method::POST,
                "/v1/chats/u1w1/messages",
                Some(json!({"id": "m1", "sender_id": "u1", "content": "Hello!"})),
            ))
            .await
            .unwrap();

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::POST,
                "/v1/chats/u1w1/read",
                Some(json!({"reader_id": "u1"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(parse_body(resp).await["messages"][0]["is_read"], false);
    }
}
