//! Firestore REST Client Implementation
//!
//! Talks to the Firestore v1 REST API under
//! `{base_url}/v1/projects/{project}/databases/{database}/documents`.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::value::{decode_fields, encode_fields, encode_value};
use crate::{Document, DocumentService, FirestoreConfig, FirestoreError};

/// Page size used when listing a collection
const LIST_PAGE_SIZE: u32 = 300;

#[derive(Deserialize)]
struct RestDocument {
    name: String,
    #[serde(default)]
    fields: Value,
}

impl RestDocument {
    fn into_document(self) -> Result<Document, FirestoreError> {
        let id = self
            .name
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| FirestoreError::Decode(format!("bad document name {}", self.name)))?
            .to_string();
        Ok(Document::new(id, decode_fields(&self.fields)?))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RestDocument>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct RunQueryItem {
    document: Option<RestDocument>,
}

/// Real Firestore client for the document REST API.
pub struct FirestoreClient {
    http: reqwest::Client,
    database_path: String,
    documents_url: String,
    auth_token: Option<String>,
}

impl FirestoreClient {
    /// Create a new Firestore client from configuration.
    pub fn new(config: FirestoreConfig) -> Result<Self, FirestoreError> {
        if config.project_id.is_empty() {
            return Err(FirestoreError::Configuration(
                "project_id must not be empty".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FirestoreError::Configuration(e.to_string()))?;

        let database_path = format!(
            "projects/{}/databases/{}",
            config.project_id, config.database
        );
        let documents_url = format!(
            "{}/v1/{}/documents",
            config.base_url.trim_end_matches('/'),
            database_path
        );

        Ok(Self {
            http,
            database_path,
            documents_url,
            auth_token: config.auth_token,
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url, collection)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_url, collection, id)
    }

    /// Resource name used inside request bodies
    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/documents/{}/{}", self.database_path, collection, id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, FirestoreError> {
        let response = builder
            .send()
            .await
            .map_err(|e| FirestoreError::Request(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response body".to_string());
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FirestoreError::Auth(body),
            StatusCode::NOT_FOUND => FirestoreError::NotFound(body),
            StatusCode::CONFLICT => FirestoreError::AlreadyExists(body),
            StatusCode::TOO_MANY_REQUESTS => FirestoreError::Quota(body),
            other => FirestoreError::Response {
                status: other.as_u16(),
                body,
            },
        })
    }

    async fn json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, FirestoreError> {
        response
            .json::<T>()
            .await
            .map_err(|e| FirestoreError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl DocumentService for FirestoreClient {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, FirestoreError> {
        let url = self.document_url(collection, id);
        match self.send(self.request(Method::GET, &url)).await {
            Ok(response) => {
                let doc: RestDocument = Self::json(response).await?;
                Ok(Some(doc.into_document()?))
            }
            Err(FirestoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, FirestoreError> {
        let url = self.collection_url(collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut builder = self
                .request(Method::GET, &url)
                .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                builder = builder.query(&[("pageToken", token)]);
            }

            let page: ListResponse = Self::json(self.send(builder).await?).await?;
            for doc in page.documents {
                documents.push(doc.into_document()?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(collection, count = documents.len(), "Listed documents");
        Ok(documents)
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, FirestoreError> {
        let url = format!("{}:runQuery", self.documents_url);
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": field },
                        "op": "EQUAL",
                        "value": encode_value(value),
                    }
                }
            }
        });

        let items: Vec<RunQueryItem> =
            Self::json(self.send(self.request(Method::POST, &url).json(&body)).await?).await?;

        items
            .into_iter()
            .filter_map(|item| item.document)
            .map(RestDocument::into_document)
            .collect()
    }

    async fn create(&self, collection: &str, document: Document) -> Result<(), FirestoreError> {
        let url = self.collection_url(collection);
        let builder = self
            .request(Method::POST, &url)
            .query(&[("documentId", document.id.as_str())])
            .json(&json!({ "fields": encode_fields(&document.fields) }));
        self.send(builder).await?;
        tracing::debug!(collection, id = %document.id, "Document created");
        Ok(())
    }

    async fn set(&self, collection: &str, document: Document) -> Result<(), FirestoreError> {
        let url = self.document_url(collection, &document.id);
        let builder = self
            .request(Method::PATCH, &url)
            .json(&json!({ "fields": encode_fields(&document.fields) }));
        self.send(builder).await?;
        tracing::debug!(collection, id = %document.id, "Document replaced");
        Ok(())
    }

    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), FirestoreError> {
        let url = self.document_url(collection, id);
        let builder = self
            .request(Method::PATCH, &url)
            .query(&[
                ("updateMask.fieldPaths", field),
                ("currentDocument.exists", "true"),
            ])
            .json(&json!({ "fields": { field: encode_value(&value) } }));
        self.send(builder).await?;
        tracing::debug!(collection, id, field, "Document field updated");
        Ok(())
    }

    async fn append_to_array(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        values: Vec<Value>,
    ) -> Result<(), FirestoreError> {
        let url = format!("{}:commit", self.documents_url);
        let encoded: Vec<Value> = values.iter().map(encode_value).collect();
        let body = json!({
            "writes": [{
                "transform": {
                    "document": self.document_name(collection, id),
                    "fieldTransforms": [{
                        "fieldPath": field,
                        "appendMissingElements": { "values": encoded },
                    }]
                },
                "currentDocument": { "exists": true }
            }]
        });
        self.send(self.request(Method::POST, &url).json(&body)).await?;
        tracing::debug!(collection, id, field, count = values.len(), "Array field appended");
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), FirestoreError> {
        let url = self.document_url(collection, id);
        self.send(self.request(Method::DELETE, &url)).await?;
        tracing::debug!(collection, id, "Document deleted");
        Ok(())
    }
}
