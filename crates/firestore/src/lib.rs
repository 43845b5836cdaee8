//! QuickFix document store service
//!
//! Provides schemaless document storage with support for:
//! - Firestore v1 REST API integration for production
//! - In-memory mock service for testing and development
//! - Configurable project, database, base URL, and bearer token
//!
//! Documents are plain JSON field maps; typed domain records are mapped
//! onto them by the callers.

pub mod client;
pub mod mock;
pub mod value;

use quickfix_common::RemoteError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FirestoreError {
    #[error("Firestore configuration error: {0}")]
    Configuration(String),

    #[error("Firestore request error: {0}")]
    Request(String),

    #[error("Firestore rejected credentials: {0}")]
    Auth(String),

    #[error("Firestore quota exceeded: {0}")]
    Quota(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Firestore returned {status}: {body}")]
    Response { status: u16, body: String },

    #[error("Firestore decode error: {0}")]
    Decode(String),
}

impl From<FirestoreError> for RemoteError {
    fn from(err: FirestoreError) -> Self {
        match err {
            FirestoreError::Configuration(msg) => {
                RemoteError::Network(format!("misconfigured client: {msg}"))
            }
            FirestoreError::Request(msg) => RemoteError::Network(msg),
            FirestoreError::Auth(msg) => RemoteError::Auth(msg),
            FirestoreError::Quota(msg) => RemoteError::Quota(msg),
            FirestoreError::NotFound(msg) => RemoteError::NotFound(msg),
            FirestoreError::AlreadyExists(msg) => RemoteError::AlreadyExists(msg),
            FirestoreError::Response { status, body } => RemoteError::Response { status, body },
            FirestoreError::Decode(msg) => RemoteError::Decode(msg),
        }
    }
}

/// A stored document: its id within the collection plus its fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// String field accessor
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// Allocate a collision-resistant document id
pub fn auto_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Document store configuration.
#[derive(Clone)]
pub struct FirestoreConfig {
    /// Provider (firestore, mock)
    pub provider: String,
    /// Google Cloud project that owns the database
    pub project_id: String,
    /// Database name, `(default)` unless a named database is used
    pub database: String,
    /// REST API base URL
    pub base_url: String,
    /// Optional bearer token sent with every request
    pub auth_token: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for FirestoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreConfig")
            .field("provider", &self.provider)
            .field("project_id", &self.project_id)
            .field("database", &self.database)
            .field("base_url", &self.base_url)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl FirestoreConfig {
    /// Create document store config from environment variables.
    pub fn from_env() -> Result<Self, FirestoreError> {
        dotenvy::dotenv().ok();

        let provider = std::env::var("FIRESTORE_PROVIDER").unwrap_or_else(|_| "mock".to_string());
        let project_id = std::env::var("FIRESTORE_PROJECT_ID").unwrap_or_default();

        if provider != "mock" && project_id.is_empty() {
            return Err(FirestoreError::Configuration(
                "FIRESTORE_PROJECT_ID is required for Firestore provider".to_string(),
            ));
        }

        let timeout_secs = match std::env::var("FIRESTORE_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                FirestoreError::Configuration(format!(
                    "FIRESTORE_TIMEOUT_SECS must be a whole number of seconds, got {raw:?}"
                ))
            })?,
            Err(_) => 10,
        };

        Ok(Self {
            provider,
            project_id,
            database: std::env::var("FIRESTORE_DATABASE")
                .unwrap_or_else(|_| "(default)".to_string()),
            base_url: std::env::var("FIRESTORE_BASE_URL")
                .unwrap_or_else(|_| "https://firestore.googleapis.com".to_string()),
            auth_token: std::env::var("FIRESTORE_AUTH_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            timeout_secs,
        })
    }
}

/// Document store operations. Every call is a single attempt.
#[async_trait::async_trait]
pub trait DocumentService: Send + Sync {
    /// Fetch one document, `None` when it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, FirestoreError>;

    /// Fetch every document in a collection.
    async fn list(&self, collection: &str) -> Result<Vec<Document>, FirestoreError>;

    /// Fetch documents whose `field` equals `value`.
    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, FirestoreError>;

    /// Create a document; fails with `AlreadyExists` if the id is taken.
    async fn create(&self, collection: &str, document: Document) -> Result<(), FirestoreError>;

    /// Overwrite (or create) a whole document.
    async fn set(&self, collection: &str, document: Document) -> Result<(), FirestoreError>;

    /// Atomically overwrite one field of an existing document.
    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), FirestoreError>;

    /// Atomically append `values` to an array field of an existing document.
    /// Values already present in the array are skipped.
    async fn append_to_array(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        values: Vec<Value>,
    ) -> Result<(), FirestoreError>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), FirestoreError>;

    /// Allocate an id for a new document.
    fn new_id(&self) -> String {
        auto_id()
    }
}

/// Factory for creating DocumentService implementations.
pub struct DocumentServiceFactory;

impl DocumentServiceFactory {
    /// Create a DocumentService based on configuration.
    pub fn create(config: FirestoreConfig) -> Result<Box<dyn DocumentService>, FirestoreError> {
        match config.provider.as_str() {
            "firestore" => {
                tracing::info!(project_id = %config.project_id, "Creating Firestore client service");
                Ok(Box::new(client::FirestoreClient::new(config)?))
            }
            "mock" => {
                tracing::info!("Creating mock document service");
                Ok(Box::new(mock::MockDocumentService::new()))
            }
            provider => Err(FirestoreError::Configuration(format!(
                "Unknown document store provider: {}. Supported providers: firestore, mock",
                provider
            ))),
        }
    }
}
