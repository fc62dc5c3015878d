//! Cloud Firestore document store over the REST v1 API.
//!
//! - `read_all`: `GET documents/{collection}` following `nextPageToken`
//! - `insert`: `POST documents/{collection}` (server-assigned id)
//! - `insert_if_absent`: `POST documents/{collection}?documentId={id}`;
//!   `409 ALREADY_EXISTS` means the id is taken
//! - `is_empty`: a single `pageSize=1` list request

pub mod codec;
pub mod token;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::credentials::ServiceAccountKey;
use crate::db::{Collection, DatabaseError, Document, DocumentStore, Fields};
use token::TokenSource;

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Documents requested per list page.
const PAGE_SIZE: u32 = 300;

#[derive(Debug, Deserialize)]
struct RemoteDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RemoteDocument>,
    next_page_token: Option<String>,
}

impl RemoteDocument {
    fn into_document(self) -> Document {
        Document::new(codec::document_id(&self.name), codec::decode_fields(&self.fields))
    }
}

pub struct FirestoreStore {
    http: reqwest::Client,
    tokens: TokenSource,
    documents_url: String,
}

impl FirestoreStore {
    pub fn new(key: ServiceAccountKey) -> Result<Self, DatabaseError> {
        Self::with_base_url(key, DEFAULT_BASE_URL)
    }

    /// Point the client at another endpoint (e.g. the local emulator).
    pub fn with_base_url(key: ServiceAccountKey, base_url: &str) -> Result<Self, DatabaseError> {
        let documents_url = documents_url(base_url, &key.project_id);
        Ok(Self {
            http: reqwest::Client::new(),
            tokens: TokenSource::new(key)?,
            documents_url,
        })
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!("{}/{}", self.documents_url, collection.as_str())
    }

    /// One page of `collection`, starting at `page_token`.
    async fn list_page(
        &self,
        collection: Collection,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ListResponse, DatabaseError> {
        let token = self.tokens.access_token(&self.http).await?;
        let mut request = self
            .http
            .get(self.collection_url(collection))
            .bearer_auth(token)
            .query(&[("pageSize", page_size.to_string())]);
        if let Some(page) = page_token {
            request = request.query(&[("pageToken", page)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn create(
        &self,
        collection: Collection,
        id: Option<&str>,
        fields: &Fields,
    ) -> Result<reqwest::Response, DatabaseError> {
        let token = self.tokens.access_token(&self.http).await?;
        let mut request = self
            .http
            .post(self.collection_url(collection))
            .bearer_auth(token)
            .json(&json!({ "fields": codec::encode_fields(fields) }));
        if let Some(id) = id {
            request = request.query(&[("documentId", id)]);
        }
        Ok(request.send().await?)
    }
}

fn documents_url(base_url: &str, project_id: &str) -> String {
    format!(
        "{}/projects/{}/databases/(default)/documents",
        base_url.trim_end_matches('/'),
        project_id
    )
}

/// Turn a non-success response into a `Remote` error, keeping the API's
/// own message when the body carries one.
async fn remote_error(response: reqwest::Response) -> DatabaseError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(body);
    DatabaseError::Remote { status, message }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn read_all(&self, collection: Collection) -> Result<Vec<Document>, DatabaseError> {
        let mut docs = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .list_page(collection, PAGE_SIZE, page_token.as_deref())
                .await?;
            docs.extend(page.documents.into_iter().map(RemoteDocument::into_document));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!(%collection, count = docs.len(), "Fetched collection");
        Ok(docs)
    }

    async fn is_empty(&self, collection: Collection) -> Result<bool, DatabaseError> {
        let page = self.list_page(collection, 1, None).await?;
        Ok(page.documents.is_empty())
    }

    async fn insert(&self, collection: Collection, fields: Fields) -> Result<String, DatabaseError> {
        let response = self.create(collection, None, &fields).await?;
        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }
        let created: RemoteDocument = response.json().await?;
        Ok(codec::document_id(&created.name).to_string())
    }

    async fn insert_if_absent(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<bool, DatabaseError> {
        let response = self.create(collection, Some(id), &fields).await?;
        match response.status() {
            StatusCode::CONFLICT => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(remote_error(response).await),
        }
    }
}
