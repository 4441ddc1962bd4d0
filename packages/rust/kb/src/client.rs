//! HTTP client for the conversational-AI knowledge-base API.
//!
//! Every remote-call wrapper returns a typed value rather than leaving
//! callers to branch on status codes: delete in particular distinguishes
//! "deleted", "already gone", and "refused" so the synchronizer can apply
//! its force policy without inspecting HTTP errors.

use std::time::Duration;

use reqwest::{Client, StatusCode, multipart};
use serde_json::Value;
use tracing::{debug, warn};

use storesync_shared::{Result, StoresyncError};

use crate::response::{RemoteDocument, extract_document_id, normalize_document_list};

/// API-key header used by the knowledge-base API.
const API_KEY_HEADER: &str = "xi-api-key";

/// Outcome of a document delete call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The document was deleted.
    Deleted,
    /// The document vanished concurrently; deletion is idempotent.
    AlreadyGone,
    /// The API refused the deletion (document in use/locked or similar).
    Refused { status: u16 },
}

/// Client for the knowledge-base and agent endpoints.
#[derive(Debug, Clone)]
pub struct KnowledgeBaseClient {
    api_url: String,
    api_key: String,
    client: Client,
}

impl KnowledgeBaseClient {
    /// Create a client for the given API base URL and key.
    pub fn new(api_url: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoresyncError::kb(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn kb_url(&self) -> String {
        format!("{}/convai/knowledge-base", self.api_url)
    }

    fn agent_url(&self, agent_id: &str) -> String {
        format!("{}/convai/agents/{agent_id}", self.api_url)
    }

    /// List all documents in the knowledge base.
    pub async fn list_documents(&self) -> Result<Vec<RemoteDocument>> {
        let response = self
            .client
            .get(self.kb_url())
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| StoresyncError::kb(format!("document listing failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoresyncError::kb(format!(
                "document listing returned HTTP {status}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoresyncError::kb(format!("invalid document listing body: {e}")))?;

        let documents = normalize_document_list(&body)?;
        debug!(count = documents.len(), "listed knowledge-base documents");
        Ok(documents)
    }

    /// Upload `content` as a new document and return its id.
    ///
    /// A create response without an extractable id is a hard failure: the
    /// document cannot be bound or safely replaced later.
    pub async fn create_document(&self, document_name: &str, content: &str) -> Result<String> {
        let part = multipart::Part::bytes(content.as_bytes().to_vec())
            .file_name(document_name.to_string())
            .mime_str("text/plain")
            .map_err(|e| StoresyncError::kb(format!("invalid upload part: {e}")))?;

        let form = multipart::Form::new()
            .text("document_name", document_name.to_string())
            .text("document_type", "file")
            .part("file", part);

        let response = self
            .client
            .post(self.kb_url())
            .header(API_KEY_HEADER, &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StoresyncError::kb(format!("document upload failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoresyncError::kb(format!(
                "document upload returned HTTP {status}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoresyncError::kb(format!("invalid upload response body: {e}")))?;

        extract_document_id(&body).ok_or_else(|| {
            StoresyncError::kb(format!(
                "document {document_name} created but response carried no id"
            ))
        })
    }

    /// Delete a document by id. 404 is success (idempotent delete); other
    /// client errors are a refusal, not a hard failure.
    pub async fn delete_document(&self, id: &str) -> Result<DeleteOutcome> {
        let response = self
            .client
            .delete(format!("{}/{id}", self.kb_url()))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| StoresyncError::kb(format!("document delete failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            debug!(id, "deleted document");
            Ok(DeleteOutcome::Deleted)
        } else if status == StatusCode::NOT_FOUND {
            debug!(id, "document already gone");
            Ok(DeleteOutcome::AlreadyGone)
        } else if status.is_client_error() {
            warn!(id, %status, "document delete refused");
            Ok(DeleteOutcome::Refused {
                status: status.as_u16(),
            })
        } else {
            Err(StoresyncError::kb(format!(
                "document delete returned HTTP {status}"
            )))
        }
    }

    /// Fetch the full agent configuration.
    pub async fn get_agent(&self, agent_id: &str) -> Result<Value> {
        let response = self
            .client
            .get(self.agent_url(agent_id))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| StoresyncError::kb(format!("agent fetch failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoresyncError::kb(format!(
                "agent fetch returned HTTP {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| StoresyncError::kb(format!("invalid agent body: {e}")))
    }

    /// Write the agent's knowledge-base item collection back.
    ///
    /// The API supports no partial update of the collection itself, so the
    /// caller passes the complete list; only the knowledge-base field of
    /// the agent is patched.
    pub async fn update_agent_knowledge_base(&self, agent_id: &str, items: &[Value]) -> Result<()> {
        let body = serde_json::json!({
            "conversation_config": {
                "agent": {
                    "prompt": {
                        "knowledge_base": items,
                    }
                }
            }
        });

        let response = self
            .client
            .patch(self.agent_url(agent_id))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoresyncError::kb(format!("agent update failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoresyncError::kb(format!(
                "agent update returned HTTP {status}"
            )));
        }

        Ok(())
    }
}
