//! Local chat cache backed by SQLite
//!
//! One row per chat; the message thread is stored as a JSON array so a chat
//! reads back exactly as it was written.

use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use quickfix_common::CacheError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::domain::entities::{Chat, ChatStatus, Message};

/// Fast, non-authoritative chat storage on the device
#[async_trait::async_trait]
pub trait LocalCache: Send + Sync {
    /// Look up one chat by id
    async fn get(&self, id: &str) -> Result<Option<Chat>, CacheError>;

    /// Every cached chat, in first-cached order
    async fn get_all(&self) -> Result<Vec<Chat>, CacheError>;

    /// Insert or fully replace a chat
    async fn upsert(&self, chat: &Chat) -> Result<(), CacheError>;

    /// Remove a chat; removing a missing id is not an error
    async fn delete(&self, id: &str) -> Result<(), CacheError>;
}

/// Connection setup for the cache database
pub struct CachePool;

impl CachePool {
    /// Open (creating if missing) a file-backed cache and run migrations.
    pub async fn connect(database_url: &str) -> Result<SqlitePool, CacheError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        Self::migrate(&pool).await?;
        tracing::info!(database_url, "Local chat cache ready");
        Ok(pool)
    }

    /// A private in-memory cache. It lives on a single connection that is
    /// never recycled, so data survives for the life of the pool.
    pub async fn in_memory() -> Result<SqlitePool, CacheError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::migrate(&pool).await?;
        Ok(pool)
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), CacheError> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|e| CacheError::Storage(e.into()))
    }
}

#[derive(sqlx::FromRow)]
struct ChatRow {
    chat_id: String,
    user_id: String,
    worker_id: String,
    linked_job_id: String,
    status: String,
    messages: String,
}

impl ChatRow {
    fn into_chat(self) -> Result<Chat, CacheError> {
        let status = ChatStatus::from_str(&self.status)
            .map_err(|e| CacheError::Decode(format!("chat {}: {e}", self.chat_id)))?;
        let messages: Vec<Message> = serde_json::from_str(&self.messages)?;

        Ok(Chat {
            id: self.chat_id,
            user_id: self.user_id,
            worker_id: self.worker_id,
            linked_job_id: self.linked_job_id,
            messages,
            status,
        })
    }
}

/// SQLite implementation of [`LocalCache`]
#[derive(Clone)]
pub struct SqliteChatCache {
    pool: SqlitePool,
}

impl SqliteChatCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl LocalCache for SqliteChatCache {
    async fn get(&self, id: &str) -> Result<Option<Chat>, CacheError> {
        let row = sqlx::query_as::<_, ChatRow>(
            r#"
            SELECT chat_id, user_id, worker_id, linked_job_id, status, messages
            FROM chats
            WHERE chat_id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ChatRow::into_chat).transpose()
    }

    async fn get_all(&self) -> Result<Vec<Chat>, CacheError> {
        let rows = sqlx::query_as::<_, ChatRow>(
            r#"
            SELECT chat_id, user_id, worker_id, linked_job_id, status, messages
            FROM chats
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ChatRow::into_chat).collect()
    }

    async fn upsert(&self, chat: &Chat) -> Result<(), CacheError> {
        let messages = serde_json::to_string(&chat.messages)?;

        sqlx::query(
            r#"
            INSERT INTO chats (chat_id, user_id, worker_id, linked_job_id, status, messages, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (chat_id) DO UPDATE SET
                user_id = excluded.user_id,
                worker_id = excluded.worker_id,
                linked_job_id = excluded.linked_job_id,
                status = excluded.status,
                messages = excluded.messages,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&chat.id)
        .bind(&chat.user_id)
        .bind(&chat.worker_id)
        .bind(&chat.linked_job_id)
        .bind(chat.status.as_str())
        .bind(messages)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::debug!(chat_id = %chat.id, "Cached chat");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), CacheError> {
        sqlx::query("DELETE FROM chats WHERE chat_id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
