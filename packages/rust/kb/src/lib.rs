//! Knowledge-base synchronization for published content units.
//!
//! This crate provides:
//! - [`KnowledgeBaseClient`] — typed wrappers over the remote API
//! - [`response`] — normalization of the API's shape-shifting responses
//! - [`Synchronizer`] — the delete-old/upload-new replace cycle
//! - [`AgentBinder`] — read-modify-write binding of documents to an agent
//!
//! The remote store is treated as unreliable by design: deletes are
//! idempotent, list responses are normalized from every known legacy
//! shape, and `force` opts into publishing through partial failures.

pub mod agent;
pub mod client;
pub mod response;
pub mod sync;

pub use agent::AgentBinder;
pub use client::{DeleteOutcome, KnowledgeBaseClient};
pub use response::{RemoteDocument, extract_document_id, normalize_document_list};
pub use sync::{SyncOutcome, Synchronizer, document_name};
