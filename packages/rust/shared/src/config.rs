//! Application configuration for Storesync.
//!
//! User config lives at `~/.storesync/storesync.toml`.
//! CLI flags override config file values, which override defaults.
//! Secrets are never stored in the file — each section names the
//! environment variable that holds its credential.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoresyncError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "storesync.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".storesync";

// ---------------------------------------------------------------------------
// Config structs (matching storesync.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Storefront scraping settings.
    #[serde(default)]
    pub storefront: StorefrontConfig,

    /// Knowledge-base API settings.
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,

    /// Commerce backend settings (orders).
    #[serde(default)]
    pub commerce: CommerceConfig,

    /// Scheduled-run settings.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Local content-cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// `[storefront]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Base URL of the storefront.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whether to sync the FAQ page.
    #[serde(default = "default_true")]
    pub sync_faq: bool,

    /// Path of the FAQ page relative to the base URL.
    #[serde(default = "default_faq_path")]
    pub faq_path: String,

    /// Legal pages to sync, one content unit each.
    #[serde(default = "default_legal_pages")]
    pub legal_pages: Vec<LegalPageEntry>,

    /// Whether to sync the product catalog.
    #[serde(default = "default_true")]
    pub sync_products: bool,

    /// Path of the product catalog relative to the base URL.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Maximum number of catalog pages to walk.
    #[serde(default = "default_max_catalog_pages")]
    pub max_catalog_pages: u32,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            sync_faq: true,
            faq_path: default_faq_path(),
            legal_pages: default_legal_pages(),
            sync_products: true,
            catalog_path: default_catalog_path(),
            max_catalog_pages: default_max_catalog_pages(),
        }
    }
}

fn default_base_url() -> String {
    "https://shop.example.com".into()
}
fn default_faq_path() -> String {
    "/pages/faq".into()
}
fn default_catalog_path() -> String {
    "/collections/all".into()
}
fn default_max_catalog_pages() -> u32 {
    10
}
fn default_true() -> bool {
    true
}

fn default_legal_pages() -> Vec<LegalPageEntry> {
    vec![
        LegalPageEntry {
            unit: "legal_notice".into(),
            path: "/pages/legal-notice".into(),
        },
        LegalPageEntry {
            unit: "privacy_policy".into(),
            path: "/pages/privacy-policy".into(),
        },
        LegalPageEntry {
            unit: "terms_of_service".into(),
            path: "/pages/terms-of-service".into(),
        },
    ]
}

/// `[[storefront.legal_pages]]` entry — one legal page, one content unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalPageEntry {
    /// Content-unit name (used for the cache files and remote document name).
    pub unit: String,
    /// Page path relative to the storefront base URL.
    pub path: String,
}

/// `[knowledge_base]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// Base URL of the conversational-AI API.
    #[serde(default = "default_kb_api_url")]
    pub api_url: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_kb_api_key_env")]
    pub api_key_env: String,

    /// Agent to bind published documents to. No binding when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            api_url: default_kb_api_url(),
            api_key_env: default_kb_api_key_env(),
            agent_id: None,
        }
    }
}

fn default_kb_api_url() -> String {
    "https://api.elevenlabs.io/v1".into()
}
fn default_kb_api_key_env() -> String {
    "ELEVENLABS_API_KEY".into()
}

/// `[commerce]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommerceConfig {
    /// Whether to sync the order digest. Requires the access token.
    #[serde(default)]
    pub enabled: bool,

    /// Shop domain, e.g. `my-shop.myshopify.com`.
    #[serde(default)]
    pub shop_domain: String,

    /// Admin API version segment.
    #[serde(default = "default_commerce_api_version")]
    pub api_version: String,

    /// Name of the env var holding the access token.
    #[serde(default = "default_commerce_token_env")]
    pub access_token_env: String,

    /// Fetch orders created within the last N days.
    #[serde(default = "default_order_days")]
    pub order_days: i64,

    /// Maximum number of orders to fetch per run.
    #[serde(default = "default_order_limit")]
    pub order_limit: u32,
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            shop_domain: String::new(),
            api_version: default_commerce_api_version(),
            access_token_env: default_commerce_token_env(),
            order_days: default_order_days(),
            order_limit: default_order_limit(),
        }
    }
}

fn default_commerce_api_version() -> String {
    "2024-01".into()
}
fn default_commerce_token_env() -> String {
    "SHOPIFY_ACCESS_TOKEN".into()
}
fn default_order_days() -> i64 {
    30
}
fn default_order_limit() -> u32 {
    50
}

/// `[schedule]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Hours between full sync passes in scheduled mode.
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_hours: default_interval_hours(),
        }
    }
}

fn default_interval_hours() -> u64 {
    24
}

/// `[cache]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding the per-unit content/digest file pairs.
    /// A leading `~` expands to the user's home directory.
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> String {
    "~/.storesync/cache".into()
}

// ---------------------------------------------------------------------------
// Sync options (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime sync options — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Publish despite delete failures, accepting duplicate-document risk.
    pub force: bool,
    /// Maximum catalog pages to walk.
    pub max_catalog_pages: u32,
    /// Order lookback window in days.
    pub order_days: i64,
    /// Maximum orders per run.
    pub order_limit: u32,
}

impl From<&AppConfig> for SyncOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            force: false,
            max_catalog_pages: config.storefront.max_catalog_pages,
            order_days: config.commerce.order_days,
            order_limit: config.commerce.order_limit,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.storesync/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| StoresyncError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.storesync/storesync.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| StoresyncError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| StoresyncError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| StoresyncError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| StoresyncError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| StoresyncError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read a required credential from the env var a config section names.
/// Errors when the variable is unset or empty.
pub fn require_api_key(var_name: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(StoresyncError::config(format!(
            "API key not found. Set the {var_name} environment variable."
        ))),
    }
}

/// Expand a leading `~` in a configured path to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
