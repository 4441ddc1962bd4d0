//! Shared types, error model, and configuration for Storesync.
//!
//! This crate is the foundation depended on by all other Storesync crates.
//! It provides:
//! - [`StoresyncError`] — the unified error type
//! - Domain types ([`ContentUnit`], [`RunSummary`])
//! - Configuration ([`AppConfig`], [`SyncOptions`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CacheConfig, CommerceConfig, KnowledgeBaseConfig, LegalPageEntry, ScheduleConfig,
    StorefrontConfig, SyncOptions, config_dir, config_file_path, expand_home, init_config,
    load_config, load_config_from, require_api_key,
};
pub use error::{Result, StoresyncError};
pub use types::{ContentUnit, PageKind, RunSummary, UnitSource};
