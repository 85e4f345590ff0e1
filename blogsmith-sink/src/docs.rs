//! Google Docs sink.
//!
//! Two calls per post: `documents.create` with the title, then one
//! `documents.batchUpdate` carrying a single `insertText` at index 1 (the
//! start of an empty body). The caller supplies an OAuth access token; how it
//! was obtained is not our concern.

use crate::{Sink, SinkOutcome, StoreError};
use async_trait::async_trait;
use blogsmith_http::{HttpClient, HttpError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DOCS_API_BASE: &str = "https://docs.googleapis.com/v1/";

const DOC_VIEW_BASE: &str = "https://docs.google.com/document/d/";
const INSERT_OFFSET: u32 = 1;
const STORE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct CreateDocument<'a> {
    title: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedDocument {
    #[serde(default)]
    document_id: String,
}

#[derive(Serialize)]
struct BatchUpdate<'a> {
    requests: Vec<UpdateRequest<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    insert_text: InsertText<'a>,
}

#[derive(Serialize)]
struct InsertText<'a> {
    location: Location,
    text: &'a str,
}

#[derive(Serialize)]
struct Location {
    index: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateReply {
    #[serde(default)]
    document_id: Option<String>,
}

/// Viewable URL for a document id.
///
/// ```
/// assert_eq!(
///     blogsmith_sink::docs::document_url("1AbC"),
///     "https://docs.google.com/document/d/1AbC/edit"
/// );
/// ```
pub fn document_url(document_id: &str) -> String {
    format!("{DOC_VIEW_BASE}{document_id}/edit")
}

pub struct DocsSink {
    client: HttpClient,
    access_token: String,
}

impl DocsSink {
    pub fn new(access_token: String) -> Result<Self, HttpError> {
        Self::with_endpoint(access_token, DOCS_API_BASE)
    }

    pub fn with_endpoint(access_token: String, endpoint: &str) -> Result<Self, HttpError> {
        let base = if endpoint.ends_with('/') {
            endpoint.to_string()
        } else {
            format!("{endpoint}/")
        };
        let client = HttpClient::new(&base)?.with_timeout(STORE_TIMEOUT);
        Ok(Self {
            client,
            access_token,
        })
    }

    async fn create(&self, title: &str) -> Result<String, StoreError> {
        let created: CreatedDocument = self
            .client
            .post_json("documents", Some(&self.access_token), &CreateDocument { title })
            .await
            .map_err(StoreError::Create)?;
        if created.document_id.is_empty() {
            return Err(StoreError::Malformed(
                "documents.create returned no documentId".into(),
            ));
        }
        Ok(created.document_id)
    }

    async fn insert(&self, document_id: &str, text: &str) -> Result<(), StoreError> {
        let body = BatchUpdate {
            requests: vec![UpdateRequest {
                insert_text: InsertText {
                    location: Location {
                        index: INSERT_OFFSET,
                    },
                    text,
                },
            }],
        };
        let reply: BatchUpdateReply = self
            .client
            .post_json(
                &format!("documents/{document_id}:batchUpdate"),
                Some(&self.access_token),
                &body,
            )
            .await
            .map_err(|source| StoreError::Insert {
                document_id: document_id.to_string(),
                source,
            })?;
        if let Some(acked) = reply.document_id.filter(|id| id != document_id) {
            tracing::warn!(expected=%document_id, acked=%acked, "sink.docs.ack_mismatch");
        }
        Ok(())
    }
}

#[async_trait]
impl Sink for DocsSink {
    fn name(&self) -> &'static str {
        "docs"
    }

    async fn publish(&self, title: &str, content: &str) -> Result<SinkOutcome, StoreError> {
        let document_id = self.create(title).await?;
        tracing::info!(document_id=%document_id, "sink.docs.created");

        self.insert(&document_id, content).await?;
        let url = document_url(&document_id);
        tracing::info!(document_id=%document_id, url=%url, bytes=content.len(), "sink.docs.stored");

        Ok(SinkOutcome::Stored { document_id, url })
    }
}
