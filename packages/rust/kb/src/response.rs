//! Normalization of the knowledge-base API's response shapes.
//!
//! The API has changed shape over its lifetime: document listings arrive
//! as `{"documents": […]}`, as legacy `{"items": […]}`, or as a bare
//! array; create responses carry the new id under `id` or `document_id`.
//! Every known shape is mapped to one internal representation immediately
//! after deserialization; anything else is an explicit error rather than
//! a silently empty collection.

use serde_json::Value;
use tracing::warn;

use storesync_shared::{Result, StoresyncError};

/// One document in the remote store. Ids are transient — learned from a
/// list or create call, never cached across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDocument {
    pub id: String,
    pub name: String,
}

/// Map a document listing of any known shape to `Vec<RemoteDocument>`.
///
/// Entries without an id are unusable (they can be neither deleted nor
/// bound) and are skipped with a warning.
pub fn normalize_document_list(value: &Value) -> Result<Vec<RemoteDocument>> {
    let entries = if let Some(docs) = value.get("documents").and_then(Value::as_array) {
        docs
    } else if let Some(items) = value.get("items").and_then(Value::as_array) {
        items
    } else if let Some(arr) = value.as_array() {
        arr
    } else {
        return Err(StoresyncError::validation(
            "unrecognized document list response shape",
        ));
    };

    let mut documents = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(id) = entry.get("id").and_then(Value::as_str).filter(|s| !s.is_empty()) else {
            warn!("skipping document entry without an id");
            continue;
        };
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        documents.push(RemoteDocument {
            id: id.to_string(),
            name: name.to_string(),
        });
    }

    Ok(documents)
}

/// Extract the new document id from a create response. The two observed
/// key names are equivalent; `id` wins when both are present.
pub fn extract_document_id(value: &Value) -> Option<String> {
    for key in ["id", "document_id"] {
        if let Some(id) = value.get(key).and_then(Value::as_str) {
            if !id.is_empty() {
                return Some(id.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn current_shape_normalizes() {
        let value = json!({"documents": [{"id": "d1", "name": "faq.txt"}]});
        let docs = normalize_document_list(&value).unwrap();
        assert_eq!(
            docs,
            vec![RemoteDocument {
                id: "d1".into(),
                name: "faq.txt".into()
            }]
        );
    }

    #[test]
    fn legacy_items_shape_normalizes() {
        let value = json!({"items": [{"id": "d2", "name": "legal_notice.txt"}]});
        let docs = normalize_document_list(&value).unwrap();
        assert_eq!(docs[0].id, "d2");
    }

    #[test]
    fn bare_array_shape_normalizes() {
        let value = json!([{"id": "d3", "name": "orders.txt"}]);
        let docs = normalize_document_list(&value).unwrap();
        assert_eq!(docs[0].name, "orders.txt");
    }

    #[test]
    fn unknown_shape_is_an_error_not_an_empty_list() {
        let value = json!({"files": []});
        let err = normalize_document_list(&value).unwrap_err();
        assert!(err.to_string().contains("unrecognized"));
    }

    #[test]
    fn entries_without_id_are_skipped() {
        let value = json!({"documents": [
            {"name": "orphan.txt"},
            {"id": "d4", "name": "kept.txt"}
        ]});
        let docs = normalize_document_list(&value).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "d4");
    }

    #[test]
    fn create_response_id_keys_are_equivalent() {
        assert_eq!(
            extract_document_id(&json!({"id": "new-1"})).as_deref(),
            Some("new-1")
        );
        assert_eq!(
            extract_document_id(&json!({"document_id": "new-2"})).as_deref(),
            Some("new-2")
        );
        // `id` wins when both are present
        assert_eq!(
            extract_document_id(&json!({"id": "a", "document_id": "b"})).as_deref(),
            Some("a")
        );
        assert!(extract_document_id(&json!({"status": "created"})).is_none());
        assert!(extract_document_id(&json!({"id": ""})).is_none());
    }
}
