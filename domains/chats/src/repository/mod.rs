//! Storage layers for the Chats domain
//!
//! `local` is the on-device cache, `remote` the authoritative document store.

pub mod local;
pub mod mock;
pub mod remote;

pub use local::{CachePool, LocalCache, SqliteChatCache};
pub use mock::MockChatCache;
pub use remote::{ChatField, DocumentRemoteStore, RemoteStore};
