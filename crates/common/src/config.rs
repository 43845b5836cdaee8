//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config. Service-specific settings
//! (remote store, auth session) live next to the services that use them.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Default location of the local chat cache
const DEFAULT_CACHE_DATABASE_URL: &str = "sqlite://quickfix-cache.db";

/// Default remote collection holding chat documents
const DEFAULT_CHATS_COLLECTION: &str = "chats";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite URL of the local chat cache
    pub cache_database_url: String,

    /// Remote collection that stores chat documents
    pub chats_collection: String,

    /// Runtime configuration
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let chats_collection =
            env::var("CHATS_COLLECTION").unwrap_or_else(|_| DEFAULT_CHATS_COLLECTION.to_string());
        if chats_collection.trim().is_empty() {
            return Err(anyhow::anyhow!("CHATS_COLLECTION must not be empty"));
        }

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid port number, got {raw:?}"))?,
            Err(_) => 3000,
        };

        Ok(Self {
            cache_database_url: env::var("CACHE_DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_CACHE_DATABASE_URL.to_string()),
            chats_collection,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "quickfix=debug".to_string()),
            port,
        })
    }
}
