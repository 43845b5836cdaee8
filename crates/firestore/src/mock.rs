//! Mock Document Service Implementation
//!
//! Keeps collections in memory, counts calls per operation, and can be told
//! to fail a given operation. Thread-safe via `Arc<Mutex<>>`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use crate::{Document, DocumentService, FirestoreError};

/// Operations recorded by the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentOp {
    Get,
    List,
    Query,
    Create,
    Set,
    UpdateField,
    Append,
    Delete,
}

#[derive(Debug, Default)]
struct MockState {
    collections: HashMap<String, BTreeMap<String, Map<String, Value>>>,
    calls: HashMap<DocumentOp, usize>,
    failures: HashMap<DocumentOp, FirestoreError>,
}

/// In-memory document service for tests and local development.
#[derive(Debug, Clone, Default)]
pub struct MockDocumentService {
    state: Arc<Mutex<MockState>>,
}

impl MockDocumentService {
    /// Create an empty mock document service.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the call and return the injected failure for it, if any.
    fn begin(&self, op: DocumentOp) -> Result<MutexGuard<'_, MockState>, FirestoreError> {
        let mut state = self.lock();
        *state.calls.entry(op).or_insert(0) += 1;
        if let Some(err) = state.failures.get(&op).cloned() {
            return Err(err);
        }
        Ok(state)
    }

    /// Number of times `op` was invoked.
    pub fn call_count(&self, op: DocumentOp) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Number of calls across every operation.
    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    /// Make every subsequent `op` call fail with `err`.
    pub fn fail(&self, op: DocumentOp, err: FirestoreError) {
        self.lock().failures.insert(op, err);
    }

    /// Stop injecting failures.
    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Zero the call counters without touching stored documents.
    pub fn reset_calls(&self) {
        self.lock().calls.clear();
    }

    /// Store a document directly, bypassing counters and failures.
    pub fn insert(&self, collection: &str, document: Document) {
        self.lock()
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(document.id, document.fields);
    }

    /// Inspect a stored document, bypassing counters and failures.
    pub fn document(&self, collection: &str, id: &str) -> Option<Document> {
        self.lock()
            .collections
            .get(collection)
            .and_then(|c| c.get(id))
            .map(|fields| Document::new(id, fields.clone()))
    }
}

#[async_trait::async_trait]
impl DocumentService for MockDocumentService {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, FirestoreError> {
        let state = self.begin(DocumentOp::Get)?;
        Ok(state
            .collections
            .get(collection)
            .and_then(|c| c.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, FirestoreError> {
        let state = self.begin(DocumentOp::List)?;
        Ok(state
            .collections
            .get(collection)
            .map(|c| {
                c.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, FirestoreError> {
        let state = self.begin(DocumentOp::Query)?;
        Ok(state
            .collections
            .get(collection)
            .map(|c| {
                c.iter()
                    .filter(|(_, fields)| fields.get(field) == Some(value))
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create(&self, collection: &str, document: Document) -> Result<(), FirestoreError> {
        let mut state = self.begin(DocumentOp::Create)?;
        let docs = state.collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&document.id) {
            return Err(FirestoreError::AlreadyExists(format!(
                "{collection}/{}",
                document.id
            )));
        }
        tracing::debug!(collection, id = %document.id, "Mock document store: create");
        docs.insert(document.id, document.fields);
        Ok(())
    }

    async fn set(&self, collection: &str, document: Document) -> Result<(), FirestoreError> {
        let mut state = self.begin(DocumentOp::Set)?;
        tracing::debug!(collection, id = %document.id, "Mock document store: set");
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(document.id, document.fields);
        Ok(())
    }

    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), FirestoreError> {
        let mut state = self.begin(DocumentOp::UpdateField)?;
        let fields = state
            .collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| FirestoreError::NotFound(format!("{collection}/{id}")))?;
        fields.insert(field.to_string(), value);
        Ok(())
    }

    async fn append_to_array(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        values: Vec<Value>,
    ) -> Result<(), FirestoreError> {
        let mut state = self.begin(DocumentOp::Append)?;
        let fields = state
            .collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| FirestoreError::NotFound(format!("{collection}/{id}")))?;

        let slot = fields
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(items) = slot {
            for value in values {
                if !items.contains(&value) {
                    items.push(value);
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), FirestoreError> {
        let mut state = self.begin(DocumentOp::Delete)?;
        if let Some(docs) = state.collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}
