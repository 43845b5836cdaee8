//! HTTP handlers for the Chats domain

pub mod chats;
pub mod messages;
