//! Common test utilities and fixtures for integration tests
//!
//! Every test app gets a private in-memory SQLite cache and an in-memory
//! document store, so tests never share state and need no services.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Method, Request, Response},
    Router,
};
use quickfix_auth::{AuthSession, SessionReady};
use quickfix_chats::{
    CachePool, ChatRepository, DocumentRemoteStore, LocalCache, SqliteChatCache, SyncCoordinator,
};
use quickfix_firestore::mock::MockDocumentService;
use serde_json::Value;

pub const COLLECTION: &str = "chats";

/// Chat service wired to in-memory stores
pub struct ChatsTestApp {
    pub repo: ChatRepository,
    pub cache: SqliteChatCache,
    pub docs: MockDocumentService,
}

impl ChatsTestApp {
    /// Build an initialized repository over fresh stores
    pub async fn new() -> Result<Self> {
        let cache = SqliteChatCache::new(CachePool::in_memory().await?);
        let docs = MockDocumentService::new();
        let remote = DocumentRemoteStore::new(Arc::new(docs.clone()), COLLECTION);
        let repo = ChatRepository::new(
            SyncCoordinator::new(Arc::new(cache.clone()), Arc::new(remote)),
            SessionReady::ready(AuthSession::new("u1", None)),
        );
        repo.init().await?;

        Ok(Self { repo, cache, docs })
    }

    /// Router with the full application surface
    pub fn test_router(&self) -> Router {
        quickfix_app::create_router(self.repo.clone())
    }

    /// Whether the local cache holds `id`
    pub async fn cached(&self, id: &str) -> bool {
        matches!(self.cache.get(id).await, Ok(Some(_)))
    }

    /// Whether the remote store holds `id`
    pub fn stored_remotely(&self, id: &str) -> bool {
        self.docs.document(COLLECTION, id).is_some()
    }
}

/// Helper: build a request with an optional JSON body
pub fn json_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&b).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Helper: parse response body as JSON Value
pub async fn parse_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
