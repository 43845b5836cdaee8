//! Mock Local Cache Implementation
//!
//! In-memory chat cache with failure injection and write counters.
//! Thread-safe via `Arc<Mutex<>>`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use quickfix_common::CacheError;

use super::local::LocalCache;
use crate::domain::entities::Chat;

#[derive(Debug, Default)]
struct MockCacheState {
    chats: Vec<Chat>,
    fail_reads: bool,
    fail_writes: bool,
    reads: usize,
    upserts: usize,
    deletes: usize,
}

/// In-memory cache for tests
#[derive(Debug, Clone, Default)]
pub struct MockChatCache {
    state: Arc<Mutex<MockCacheState>>,
}

fn injected(op: &str) -> CacheError {
    CacheError::Storage(sqlx::Error::Io(std::io::Error::other(format!(
        "injected {op} failure"
    ))))
}

impl MockChatCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed chats without counting writes
    pub fn with_chats(chats: impl IntoIterator<Item = Chat>) -> Self {
        let cache = Self::new();
        cache.lock().chats.extend(chats);
        cache
    }

    fn lock(&self) -> MutexGuard<'_, MockCacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make reads fail
    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Make upserts and deletes fail
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn read_count(&self) -> usize {
        self.lock().reads
    }

    pub fn upsert_count(&self) -> usize {
        self.lock().upserts
    }

    pub fn delete_count(&self) -> usize {
        self.lock().deletes
    }

    /// Current contents, bypassing counters and failures
    pub fn snapshot(&self) -> Vec<Chat> {
        self.lock().chats.clone()
    }
}

#[async_trait::async_trait]
impl LocalCache for MockChatCache {
    async fn get(&self, id: &str) -> Result<Option<Chat>, CacheError> {
        let mut state = self.lock();
        state.reads += 1;
        if state.fail_reads {
            return Err(injected("read"));
        }
        Ok(state.chats.iter().find(|c| c.id == id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Chat>, CacheError> {
        let mut state = self.lock();
        state.reads += 1;
        if state.fail_reads {
            return Err(injected("read"));
        }
        Ok(state.chats.clone())
    }

    async fn upsert(&self, chat: &Chat) -> Result<(), CacheError> {
        let mut state = self.lock();
        state.upserts += 1;
        if state.fail_writes {
            return Err(injected("write"));
        }
        match state.chats.iter_mut().find(|c| c.id == chat.id) {
            Some(existing) => *existing = chat.clone(),
            None => state.chats.push(chat.clone()),
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), CacheError> {
        let mut state = self.lock();
        state.deletes += 1;
        if state.fail_writes {
            return Err(injected("write"));
        }
        state.chats.retain(|c| c.id != id);
        Ok(())
    }
}
