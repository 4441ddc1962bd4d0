//! Document synchronization: ensure exactly one current document exists
//! remotely per content unit.
//!
//! The remote store has no transactional guarantees, so the synchronizer
//! runs a best-effort delete-old/upload-new cycle. The conservative
//! default never uploads alongside an undeletable document; `force`
//! trades that guarantee for availability, accepting duplicate-document
//! risk both on delete refusal and as a degraded straight-to-upload retry
//! when the replace cycle itself fails.

use tracing::{debug, info, warn};

use storesync_shared::{Result, StoresyncError};

use crate::client::{DeleteOutcome, KnowledgeBaseClient};
use crate::response::RemoteDocument;

/// Remote document name for a content unit.
pub fn document_name(unit: &str) -> String {
    format!("{unit}.txt")
}

/// Result of a successful sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Id of the freshly created document.
    pub document_id: String,
    /// Whether a prior document was found (and removed or superseded).
    pub replaced: bool,
}

/// The create/replace cycle against the remote document store.
#[derive(Debug, Clone, Copy)]
pub struct Synchronizer<'a> {
    client: &'a KnowledgeBaseClient,
}

impl<'a> Synchronizer<'a> {
    pub fn new(client: &'a KnowledgeBaseClient) -> Self {
        Self { client }
    }

    /// Publish `content` as the single current document for `unit`.
    pub async fn sync(&self, unit: &str, content: &str, force: bool) -> Result<SyncOutcome> {
        match self.replace_cycle(unit, content, force).await {
            Ok(outcome) => Ok(outcome),
            Err(e) if force => {
                // Degraded mode: skip the list/find/delete steps entirely
                // and upload, accepting possible duplication.
                warn!(unit, error = %e, "replace cycle failed, retrying as direct upload");
                let document_id = self
                    .client
                    .create_document(&document_name(unit), content)
                    .await?;
                Ok(SyncOutcome {
                    document_id,
                    replaced: false,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn replace_cycle(&self, unit: &str, content: &str, force: bool) -> Result<SyncOutcome> {
        let documents = self.client.list_documents().await?;
        let existing = find_existing(&documents, unit);

        if let Some(doc) = existing {
            info!(unit, id = %doc.id, name = %doc.name, "deleting existing document");
            match self.client.delete_document(&doc.id).await? {
                DeleteOutcome::Deleted => {}
                DeleteOutcome::AlreadyGone => {
                    debug!(unit, id = %doc.id, "document vanished concurrently");
                }
                DeleteOutcome::Refused { status } => {
                    if force {
                        warn!(
                            unit,
                            status, "delete refused, uploading anyway (duplicate risk)"
                        );
                    } else {
                        return Err(StoresyncError::kb(format!(
                            "existing document {} for {unit} could not be deleted \
                             (HTTP {status}); rerun with force to publish anyway",
                            doc.id
                        )));
                    }
                }
            }
        }

        let document_id = self
            .client
            .create_document(&document_name(unit), content)
            .await?;

        info!(unit, %document_id, "published document");
        Ok(SyncOutcome {
            document_id,
            replaced: existing.is_some(),
        })
    }
}

/// Find the current document for a unit: `{unit}.txt` by convention, with
/// the bare unit name as a legacy fallback. Linear scan, first match wins;
/// no ordering is assumed from the remote API.
pub(crate) fn find_existing<'d>(
    documents: &'d [RemoteDocument],
    unit: &str,
) -> Option<&'d RemoteDocument> {
    let primary = document_name(unit);
    documents
        .iter()
        .find(|doc| doc.name == primary || doc.name == unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn doc(id: &str, name: &str) -> RemoteDocument {
        RemoteDocument {
            id: id.into(),
            name: name.into(),
        }
    }

    #[test]
    fn find_existing_matches_both_conventions() {
        let docs = vec![doc("d1", "legal_notice.txt"), doc("d2", "faq")];
        assert_eq!(find_existing(&docs, "faq").unwrap().id, "d2");
        assert_eq!(find_existing(&docs, "legal_notice").unwrap().id, "d1");
        assert!(find_existing(&docs, "orders").is_none());
    }

    async fn mount_listing(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/convai/knowledge-base"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn sync_deletes_existing_then_uploads() {
        let server = MockServer::start().await;
        mount_listing(
            &server,
            json!({"documents": [{"id": "d1", "name": "faq.txt"}]}),
        )
        .await;

        Mock::given(method("DELETE"))
            .and(path("/convai/knowledge-base/d1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/convai/knowledge-base"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"document_id": "d-new"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = KnowledgeBaseClient::new(&server.uri(), "key").unwrap();
        let outcome = Synchronizer::new(&client)
            .sync("faq", "new text", false)
            .await
            .unwrap();

        // The id comes back regardless of which response key carried it.
        assert_eq!(outcome.document_id, "d-new");
        assert!(outcome.replaced);
    }

    #[tokio::test]
    async fn sync_first_publish_skips_delete() {
        let server = MockServer::start().await;
        mount_listing(&server, json!({"documents": []})).await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "d-first"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = KnowledgeBaseClient::new(&server.uri(), "key").unwrap();
        let outcome = Synchronizer::new(&client)
            .sync("faq", "text", false)
            .await
            .unwrap();

        assert_eq!(outcome.document_id, "d-first");
        assert!(!outcome.replaced);
    }

    #[tokio::test]
    async fn sync_tolerates_concurrent_deletion() {
        let server = MockServer::start().await;
        mount_listing(
            &server,
            json!({"items": [{"id": "d1", "name": "faq.txt"}]}),
        )
        .await;

        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "d-new"})))
            .mount(&server)
            .await;

        let client = KnowledgeBaseClient::new(&server.uri(), "key").unwrap();
        let outcome = Synchronizer::new(&client)
            .sync("faq", "text", false)
            .await
            .unwrap();
        assert_eq!(outcome.document_id, "d-new");
    }

    #[tokio::test]
    async fn delete_refusal_without_force_aborts_before_upload() {
        let server = MockServer::start().await;
        mount_listing(
            &server,
            json!({"documents": [{"id": "d1", "name": "faq.txt"}]}),
        )
        .await;

        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        // No upload may occur next to an undeletable document.
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "d-dup"})))
            .expect(0)
            .mount(&server)
            .await;

        let client = KnowledgeBaseClient::new(&server.uri(), "key").unwrap();
        let err = Synchronizer::new(&client)
            .sync("faq", "text", false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("could not be deleted"));
    }

    #[tokio::test]
    async fn delete_refusal_with_force_uploads_anyway() {
        let server = MockServer::start().await;
        mount_listing(
            &server,
            json!({"documents": [{"id": "d1", "name": "faq.txt"}]}),
        )
        .await;

        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "d-dup"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = KnowledgeBaseClient::new(&server.uri(), "key").unwrap();
        let outcome = Synchronizer::new(&client)
            .sync("faq", "text", true)
            .await
            .unwrap();
        assert_eq!(outcome.document_id, "d-dup");
    }

    #[tokio::test]
    async fn listing_failure_without_force_uploads_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "d-x"})))
            .expect(0)
            .mount(&server)
            .await;

        let client = KnowledgeBaseClient::new(&server.uri(), "key").unwrap();
        assert!(
            Synchronizer::new(&client)
                .sync("faq", "text", false)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn listing_failure_with_force_degrades_to_direct_upload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "d-degraded"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = KnowledgeBaseClient::new(&server.uri(), "key").unwrap();
        let outcome = Synchronizer::new(&client)
            .sync("faq", "text", true)
            .await
            .unwrap();
        assert_eq!(outcome.document_id, "d-degraded");
        assert!(!outcome.replaced);
    }

    #[tokio::test]
    async fn legacy_bare_name_is_replaced() {
        let server = MockServer::start().await;
        mount_listing(
            &server,
            json!({"documents": [{"id": "d-legacy", "name": "faq"}]}),
        )
        .await;

        Mock::given(method("DELETE"))
            .and(path("/convai/knowledge-base/d-legacy"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "d-new"})))
            .mount(&server)
            .await;

        let client = KnowledgeBaseClient::new(&server.uri(), "key").unwrap();
        let outcome = Synchronizer::new(&client)
            .sync("faq", "text", false)
            .await
            .unwrap();
        assert!(outcome.replaced);
    }
}
