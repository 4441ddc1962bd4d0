//! Local content cache and change detection.
//!
//! Each content unit owns a pair of files in the cache directory:
//! `{unit}.txt` (the last successfully published text) and
//! `{unit}.sha256` (its hex fingerprint). A unit is "changed" when no
//! fingerprint exists or the fingerprint of the fresh content differs.
//!
//! [`ContentCache::persist`] must only be called after a confirmed
//! successful remote publish: the stored fingerprint always corresponds
//! to the content believed to be live in the remote store.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use storesync_shared::{Result, StoresyncError};

/// File-pair content cache keyed by unit name.
#[derive(Debug, Clone)]
pub struct ContentCache {
    dir: PathBuf,
}

impl ContentCache {
    /// Create a cache rooted at `dir`. The directory is created lazily on
    /// the first [`persist`](Self::persist).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Hex SHA-256 fingerprint of a unit's text. Deterministic; empty
    /// content is valid content and hashes like any other text.
    pub fn fingerprint(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Whether `content` differs from the last published version of `unit`.
    ///
    /// Returns true when no fingerprint is stored (first run, or a torn
    /// write left the pair incomplete). Side-effect-free.
    pub fn has_changed(&self, unit: &str, content: &str) -> bool {
        let digest_path = self.digest_path(unit);

        let stored = match std::fs::read_to_string(&digest_path) {
            Ok(s) => s.trim().to_string(),
            Err(_) => {
                info!(unit, "no stored fingerprint, treating as new content");
                return true;
            }
        };

        let current = Self::fingerprint(content);
        let changed = current != stored;
        if changed {
            info!(unit, old = %stored, new = %current, "content changed");
        } else {
            debug!(unit, "no changes detected");
        }
        changed
    }

    /// Write `content` and its fingerprint for `unit`.
    ///
    /// The content file is written before the digest file: a crash between
    /// the two leaves a stale or missing digest, which reads as "changed"
    /// on the next run rather than silently as "unchanged".
    pub fn persist(&self, unit: &str, content: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StoresyncError::io(&self.dir, e))?;

        let content_path = self.content_path(unit);
        std::fs::write(&content_path, content)
            .map_err(|e| StoresyncError::io(&content_path, e))?;

        let digest = Self::fingerprint(content);
        let digest_path = self.digest_path(unit);
        std::fs::write(&digest_path, &digest)
            .map_err(|e| StoresyncError::io(&digest_path, e))?;

        debug!(unit, %digest, "persisted content and fingerprint");
        Ok(())
    }

    /// Last successfully published content for `unit`, if any.
    pub fn cached_content(&self, unit: &str) -> Option<String> {
        std::fs::read_to_string(self.content_path(unit)).ok()
    }

    /// Root directory of the cache.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn content_path(&self, unit: &str) -> PathBuf {
        self.dir.join(format!("{unit}.txt"))
    }

    fn digest_path(&self, unit: &str) -> PathBuf {
        self.dir.join(format!("{unit}.sha256"))
    }
}
