//! Chats domain: dual-store chat sync between a local cache and a remote
//! document store, chat lifecycle, HTTP API

pub mod api;
pub mod domain;
pub mod repository;
pub mod service;
pub mod sync;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{Chat, ChatStatus, Message, NewChat, UnknownStatus};
pub use domain::state::{ChatEvent, ChatStateMachine, StateError};

// Re-export storage and sync types
pub use repository::{
    CachePool, ChatField, DocumentRemoteStore, LocalCache, MockChatCache, RemoteStore,
    SqliteChatCache,
};
pub use service::ChatRepository;
pub use sync::SyncCoordinator;

// Re-export API types
pub use api::routes;
pub use api::ChatsState;
