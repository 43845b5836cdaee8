//! Chats domain state

use crate::service::ChatRepository;

/// Application state for the Chats domain
#[derive(Clone)]
pub struct ChatsState {
    pub repo: ChatRepository,
}

impl ChatsState {
    pub fn new(repo: ChatRepository) -> Self {
        Self { repo }
    }
}
