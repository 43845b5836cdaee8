//! Chat handler integration tests

use axum::http::{Method, StatusCode};
use quickfix_firestore::mock::DocumentOp;
use quickfix_firestore::FirestoreError;
use serde_json::json;
use tower::ServiceExt;

use crate::common::{json_request, parse_body, ChatsTestApp};

/// Helper: create the u1/w1 chat over HTTP
async fn create_u1w1(app: &ChatsTestApp) {
    let resp = app
        .test_router()
        .oneshot(json_request(
            Method::POST,
            "/v1/chats",
            Some(json!({"user_id": "u1", "worker_id": "w1", "linked_job_id": "qf1"})),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
}

mod test_create_chat {
    use super::*;

    #[tokio::test]
    async fn test_create_chat_returns_201_with_defaults() {
        let app = ChatsTestApp::new().await.unwrap();

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::POST,
                "/v1/chats",
                Some(json!({"user_id": "w1", "worker_id": "u1", "linked_job_id": "qf1"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = parse_body(resp).await;
        assert_eq!(body["id"], "u1w1");
        assert_eq!(body["status"], "WAITING_FOR_RESPONSE");
        assert_eq!(body["linked_job_id"], "qf1");
        assert_eq!(body["messages"], json!([]));

        assert!(app.cached("u1w1").await);
        assert!(app.stored_remotely("u1w1"));
    }

    #[tokio::test]
    async fn test_create_chat_with_explicit_id() {
        let app = ChatsTestApp::new().await.unwrap();

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::POST,
                "/v1/chats",
                Some(json!({
                    "id": "booking-42",
                    "user_id": "u1",
                    "worker_id": "w1",
                    "linked_job_id": "qf1"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(parse_body(resp).await["id"], "booking-42");
    }

    #[tokio::test]
    async fn test_create_duplicate_chat_returns_409() {
        let app = ChatsTestApp::new().await.unwrap();
        create_u1w1(&app).await;

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::POST,
                "/v1/chats",
                Some(json!({"user_id": "u1", "worker_id": "w1", "linked_job_id": "qf1"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(parse_body(resp).await["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_create_chat_missing_fields_returns_400() {
        let app = ChatsTestApp::new().await.unwrap();

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::POST,
                "/v1/chats",
                Some(json!({"user_id": "", "worker_id": "w1", "linked_job_id": "qf1"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = parse_body(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("user_id"));
    }

    #[tokio::test]
    async fn test_create_chat_with_self_returns_400() {
        let app = ChatsTestApp::new().await.unwrap();

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::POST,
                "/v1/chats",
                Some(json!({"user_id": "u1", "worker_id": "u1", "linked_job_id": "qf1"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_chat_remote_outage_returns_502_and_keeps_local() {
        let app = ChatsTestApp::new().await.unwrap();
        app.docs.fail(
            DocumentOp::Create,
            FirestoreError::Request("connection refused".to_string()),
        );

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::POST,
                "/v1/chats",
                Some(json!({"user_id": "u1", "worker_id": "w1", "linked_job_id": "qf1"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(parse_body(resp).await["error"]["code"], "REMOTE_ERROR");

        assert!(app.cached("u1w1").await);
        assert!(!app.stored_remotely("u1w1"));
    }

    #[tokio::test]
    async fn test_create_chat_remote_quota_returns_429() {
        let app = ChatsTestApp::new().await.unwrap();
        app.docs.fail(
            DocumentOp::Create,
            FirestoreError::Quota("writes per day".to_string()),
        );

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::POST,
                "/v1/chats",
                Some(json!({"user_id": "u1", "worker_id": "w1", "linked_job_id": "qf1"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}

mod test_read_chats {
    use super::*;

    #[tokio::test]
    async fn test_get_chat_returns_200() {
        let app = ChatsTestApp::new().await.unwrap();
        create_u1w1(&app).await;

        let resp = app
            .test_router()
            .oneshot(json_request(Method::GET, "/v1/chats/u1w1", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(parse_body(resp).await["worker_id"], "w1");
    }

    #[tokio::test]
    async fn test_get_unknown_chat_returns_404() {
        let app = ChatsTestApp::new().await.unwrap();

        let resp = app
            .test_router()
            .oneshot(json_request(Method::GET, "/v1/chats/nope", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_chats_serves_cache_without_remote() {
        let app = ChatsTestApp::new().await.unwrap();
        create_u1w1(&app).await;
        app.docs.reset_calls();

        let resp = app
            .test_router()
            .oneshot(json_request(Method::GET, "/v1/chats", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = parse_body(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(app.docs.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_chat_exists_true_and_false() {
        let app = ChatsTestApp::new().await.unwrap();
        create_u1w1(&app).await;

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::GET,
                "/v1/chats/exists?user_id=w1&worker_id=u1",
                None,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = parse_body(resp).await;
        assert_eq!(body["exists"], true);
        assert_eq!(body["chat"]["id"], "u1w1");

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::GET,
                "/v1/chats/exists?user_id=u1&worker_id=w9",
                None,
            ))
            .await
            .unwrap();
        let body = parse_body(resp).await;
        assert_eq!(body["exists"], false);
        assert!(body["chat"].is_null());
    }

    #[tokio::test]
    async fn test_chat_exists_remote_failure_returns_error() {
        let app = ChatsTestApp::new().await.unwrap();
        app.docs.fail(
            DocumentOp::Query,
            FirestoreError::Auth("token expired".to_string()),
        );

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::GET,
                "/v1/chats/exists?user_id=u1&worker_id=w1",
                None,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

mod test_update_status {
    use super::*;

    #[tokio::test]
    async fn test_accept_chat_returns_200() {
        let app = ChatsTestApp::new().await.unwrap();
        create_u1w1(&app).await;

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::PATCH,
                "/v1/chats/u1w1",
                Some(json!({"status": "ACCEPTED"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(parse_body(resp).await["status"], "ACCEPTED");

        let remote = app.docs.document("chats", "u1w1").unwrap();
        assert_eq!(remote.str_field("chatStatus"), Some("ACCEPTED"));
    }

    #[tokio::test]
    async fn test_refused_chat_cannot_be_accepted() {
        let app = ChatsTestApp::new().await.unwrap();
        create_u1w1(&app).await;

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::PATCH,
                "/v1/chats/u1w1",
                Some(json!({"status": "WORKER_REFUSED"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::PATCH,
                "/v1/chats/u1w1",
                Some(json!({"status": "ACCEPTED"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(
            parse_body(resp).await["error"]["code"],
            "INVALID_TRANSITION"
        );
    }

    #[tokio::test]
    async fn test_unknown_status_returns_400() {
        let app = ChatsTestApp::new().await.unwrap();
        create_u1w1(&app).await;

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::PATCH,
                "/v1/chats/u1w1",
                Some(json!({"status": "ON_HOLD"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_unknown_chat_returns_404() {
        let app = ChatsTestApp::new().await.unwrap();

        let resp = app
            .test_router()
            .oneshot(json_request(
                Method::PATCH,
                "/v1/chats/ghost",
                Some(json!({"status": "ACCEPTED"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

mod test_delete_chat {
    use super::*;

    #[tokio::test]
    async fn test_delete_chat_returns_204_and_removes_everywhere() {
        let app = ChatsTestApp::new().await.unwrap();
        create_u1w1(&app).await;

        let resp = app
            .test_router()
            .oneshot(json_request(Method::DELETE, "/v1/chats/u1w1", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        assert!(!app.cached("u1w1").await);
        assert!(!app.stored_remotely("u1w1"));

        let resp = app
            .test_router()
            .oneshot(json_request(Method::GET, "/v1/chats/u1w1", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_unknown_chat_returns_404() {
        let app = ChatsTestApp::new().await.unwrap();

        let resp = app
            .test_router()
            .oneshot(json_request(Method::DELETE, "/v1/chats/ghost", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
