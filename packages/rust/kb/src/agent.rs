//! Agent binding: attach a published document to a conversational agent.
//!
//! The agent's knowledge-base collection is a read-modify-write document:
//! the current collection is fetched, the stale reference for the unit
//! being replaced is dropped, the new reference appended, and the whole
//! collection written back. Unrelated items are echoed verbatim in their
//! original order so other bindings are never silently lost.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info};

use storesync_shared::Result;

use crate::client::KnowledgeBaseClient;
use crate::sync::document_name;

/// JSON pointer to the knowledge-base item collection inside an agent.
const KNOWLEDGE_BASE_PTR: &str = "/conversation_config/agent/prompt/knowledge_base";

/// Binds published documents to an agent's knowledge-base collection.
#[derive(Debug, Clone, Copy)]
pub struct AgentBinder<'a> {
    client: &'a KnowledgeBaseClient,
}

impl<'a> AgentBinder<'a> {
    pub fn new(client: &'a KnowledgeBaseClient) -> Self {
        Self { client }
    }

    /// Bind `document_id` (the fresh document for `unit`) to the agent,
    /// superseding any existing item for the same unit.
    pub async fn bind_document(&self, agent_id: &str, document_id: &str, unit: &str) -> Result<()> {
        // Fetch first; a failed read must never lead to a partial write.
        let agent = self.client.get_agent(agent_id).await?;
        let items = agent
            .pointer(KNOWLEDGE_BASE_PTR)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        // Resolve item ids to document names via a fresh listing; stored
        // names inside the agent config are not trusted to be current.
        let documents = self.client.list_documents().await?;
        let names: HashMap<&str, &str> = documents
            .iter()
            .map(|doc| (doc.id.as_str(), doc.name.as_str()))
            .collect();

        let primary = document_name(unit);
        let mut kept: Vec<Value> = Vec::with_capacity(items.len() + 1);
        for item in items {
            let resolved = item
                .get("id")
                .and_then(Value::as_str)
                .and_then(|id| names.get(id).copied());
            match resolved {
                Some(name) if name == primary || name == unit => {
                    debug!(unit, "dropping superseded knowledge-base item");
                }
                _ => kept.push(item),
            }
        }

        let new_name = names
            .get(document_id)
            .map(|name| (*name).to_string())
            .unwrap_or_else(|| primary.clone());

        kept.push(serde_json::json!({
            "type": "file",
            "id": document_id,
            "name": new_name,
            "usage_mode": "auto",
        }));

        self.client
            .update_agent_knowledge_base(agent_id, &kept)
            .await?;

        info!(agent_id, unit, document_id, items = kept.len(), "bound document to agent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_agent(server: &MockServer, agent: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/convai/agents/agent-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(agent))
            .mount(server)
            .await;
    }

    async fn mount_listing(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/convai/knowledge-base"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn patched_knowledge_base(server: &MockServer) -> Vec<Value> {
        let requests = server.received_requests().await.expect("recording enabled");
        let patch = requests
            .iter()
            .find(|r| r.method.as_str() == "PATCH")
            .expect("agent PATCH sent");
        let body: Value = serde_json::from_slice(&patch.body).expect("valid PATCH body");
        body.pointer(KNOWLEDGE_BASE_PTR)
            .and_then(Value::as_array)
            .cloned()
            .expect("knowledge_base array in PATCH body")
    }

    #[tokio::test]
    async fn bind_supersedes_stale_item_and_keeps_others() {
        let server = MockServer::start().await;

        mount_agent(
            &server,
            json!({
                "agent_id": "agent-1",
                "conversation_config": {"agent": {"prompt": {
                    "prompt": "You are a helpful shop assistant.",
                    "knowledge_base": [
                        {"type": "file", "id": "d-faq-old", "name": "stale-name", "usage_mode": "auto"},
                        {"type": "file", "id": "d-legal", "name": "legal_notice.txt", "usage_mode": "auto"}
                    ]
                }}}
            }),
        )
        .await;

        mount_listing(
            &server,
            json!({"documents": [
                {"id": "d-faq-old", "name": "faq.txt"},
                {"id": "d-legal", "name": "legal_notice.txt"},
                {"id": "d-faq-new", "name": "faq.txt"}
            ]}),
        )
        .await;

        Mock::given(method("PATCH"))
            .and(path("/convai/agents/agent-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = KnowledgeBaseClient::new(&server.uri(), "key").unwrap();
        AgentBinder::new(&client)
            .bind_document("agent-1", "d-faq-new", "faq")
            .await
            .unwrap();

        let items = patched_knowledge_base(&server).await;
        assert_eq!(items.len(), 2);
        // The unrelated item survives, in its original position.
        assert_eq!(items[0]["id"], "d-legal");
        // The new item replaces the stale faq binding.
        assert_eq!(items[1]["id"], "d-faq-new");
        assert_eq!(items[1]["type"], "file");
        assert_eq!(items[1]["usage_mode"], "auto");
        assert_eq!(items[1]["name"], "faq.txt");
    }

    #[tokio::test]
    async fn bind_starts_from_empty_collection() {
        let server = MockServer::start().await;

        mount_agent(
            &server,
            json!({"agent_id": "agent-1", "conversation_config": {"agent": {"prompt": {}}}}),
        )
        .await;
        mount_listing(&server, json!({"documents": []})).await;

        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = KnowledgeBaseClient::new(&server.uri(), "key").unwrap();
        AgentBinder::new(&client)
            .bind_document("agent-1", "d-new", "orders")
            .await
            .unwrap();

        let items = patched_knowledge_base(&server).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], "d-new");
        // Listing had no entry for the new id; the name falls back to
        // the unit convention.
        assert_eq!(items[0]["name"], "orders.txt");
    }

    #[tokio::test]
    async fn failed_agent_fetch_never_writes() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/convai/agents/agent-1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = KnowledgeBaseClient::new(&server.uri(), "key").unwrap();
        let err = AgentBinder::new(&client)
            .bind_document("agent-1", "d-new", "faq")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("agent fetch"));
    }
}
