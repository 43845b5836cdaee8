//! QuickFix application composition root
//!
//! Wires the local cache, the remote document store and the session gate
//! into a chat repository, then mounts the chat routes.

use std::sync::Arc;

use axum::Router;
use quickfix_auth::{session_channel, AuthConfig};
use quickfix_chats::{
    CachePool, ChatRepository, ChatsState, DocumentRemoteStore, SqliteChatCache, SyncCoordinator,
};
use quickfix_common::Config;
use quickfix_firestore::{DocumentService, DocumentServiceFactory, FirestoreConfig};

/// Build the chat repository and wait for its session.
///
/// The session comes from static auth configuration, so the signal fires
/// right away; an interactive sign-in would hold on to the signal instead.
pub async fn create_repository(
    config: &Config,
    mut firestore: FirestoreConfig,
    auth: AuthConfig,
) -> Result<ChatRepository, anyhow::Error> {
    let pool = CachePool::connect(&config.cache_database_url).await?;
    let cache = SqliteChatCache::new(pool);

    if firestore.auth_token.is_none() {
        firestore.auth_token = auth.id_token.clone();
    }
    let docs: Arc<dyn DocumentService> = Arc::from(DocumentServiceFactory::create(firestore)?);
    let remote = DocumentRemoteStore::new(docs, config.chats_collection.clone());

    let (signal, ready) = session_channel();
    let repo = ChatRepository::new(
        SyncCoordinator::new(Arc::new(cache), Arc::new(remote)),
        ready,
    );

    signal.fire(auth.session());
    repo.init().await?;
    Ok(repo)
}

/// Mount the chat routes plus infrastructure endpoints
pub fn create_router(repo: ChatRepository) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { "QuickFix Chat API v0.0.1-SNAPSHOT" }),
        )
        .merge(quickfix_chats::routes().with_state(ChatsState::new(repo)))
}

/// Create the main application router with all routes and middleware
pub async fn create_app(config: &Config) -> Result<Router, anyhow::Error> {
    let firestore = FirestoreConfig::from_env()?;
    let auth = AuthConfig::from_env()?;
    let repo = create_repository(config, firestore, auth).await?;
    Ok(create_router(repo))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
