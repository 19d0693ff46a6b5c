//! Staleness checks for incremental builds.
//!
//! A source needs rebuilding when the store has no entry for it, or when it
//! was modified after the reference time of its strategy. Two strategies
//! exist:
//!
//! - [`StoreWatermark`]: the store file's mtime, captured once before the
//!   build touches the store.
//! - [`CacheDir`]: a side directory with one cache file per entry, written
//!   after each successful compile.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{PackError, Result};
use crate::store::Store;
use crate::types::{EntryKey, SourceAsset};

/// Decide whether a source must be recompiled.
///
/// A missing watermark means the store has never been written.
pub fn needs_rebuild(
    source_modified: SystemTime,
    has_entry: bool,
    watermark: Option<SystemTime>,
) -> bool {
    if !has_entry {
        return true;
    }
    watermark.map_or(true, |w| source_modified > w)
}

/// Answers whether the stored entry for a source is current.
pub trait FreshnessOracle {
    /// Whether `store` already holds an up-to-date entry for `asset`.
    fn has_fresh_entry(&self, asset: &SourceAsset, store: &Store) -> Result<bool>;

    /// Called after `asset` was compiled and written to the store.
    fn record(&self, _asset: &SourceAsset, _encoded: &[u8]) -> Result<()> {
        Ok(())
    }

    /// Called after the entry for `key` was pruned from the store.
    fn forget(&self, _key: &EntryKey) -> Result<()> {
        Ok(())
    }

    /// Whether a stale entry may stay in the store when its rebuild fails.
    ///
    /// An oracle that would report such an entry as fresh on the next run
    /// returns `false`; the pipeline then prunes it so the source is
    /// compiled again.
    fn retains_failed_entries(&self) -> bool {
        true
    }
}

/// Staleness against the store file's own modification time.
#[derive(Debug, Clone, Copy)]
pub struct StoreWatermark {
    watermark: Option<SystemTime>,
}

impl StoreWatermark {
    /// Capture the watermark of the store at `path`.
    ///
    /// Must run before the store is opened for this build.
    pub fn capture(path: &Path) -> Self {
        let watermark = fs::metadata(path).and_then(|m| m.modified()).ok();
        tracing::debug!(?watermark, "captured store watermark");
        Self { watermark }
    }

    /// Use an explicit watermark.
    pub fn at(watermark: Option<SystemTime>) -> Self {
        Self { watermark }
    }

    pub fn watermark(&self) -> Option<SystemTime> {
        self.watermark
    }
}

impl FreshnessOracle for StoreWatermark {
    fn has_fresh_entry(&self, asset: &SourceAsset, store: &Store) -> Result<bool> {
        let has_entry = store.contains(&asset.key())?;
        Ok(!needs_rebuild(asset.modified, has_entry, self.watermark))
    }

    /// Any write in the same run moves the watermark past the failed source.
    fn retains_failed_entries(&self) -> bool {
        false
    }
}

/// Staleness against per-entry cache files in a side directory.
///
/// Each compiled entry leaves `<root>/<kind>/<name>.bin` holding the
/// uncompressed codec output.
#[derive(Debug, Clone)]
pub struct CacheDir {
    root: PathBuf,
}

impl CacheDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Location of the cache file for `key`.
    pub fn cache_path(&self, key: &EntryKey) -> PathBuf {
        self.root.join(&key.kind).join(format!("{}.bin", key.name))
    }
}

impl FreshnessOracle for CacheDir {
    fn has_fresh_entry(&self, asset: &SourceAsset, store: &Store) -> Result<bool> {
        let key = asset.key();
        if !store.contains(&key)? {
            return Ok(false);
        }

        let cached = match fs::metadata(self.cache_path(&key)).and_then(|m| m.modified()) {
            Ok(time) => time,
            Err(_) => return Ok(false),
        };

        Ok(!needs_rebuild(asset.modified, true, Some(cached)))
    }

    fn record(&self, asset: &SourceAsset, encoded: &[u8]) -> Result<()> {
        let path = self.cache_path(&asset.key());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PackError::Io {
                path: parent.to_path_buf(),
                message: format!("Failed to create cache directory: {}", e),
            })?;
        }
        fs::write(&path, encoded).map_err(|e| PackError::Io {
            path: path.clone(),
            message: format!("Failed to write cache file: {}", e),
        })
    }

    fn forget(&self, key: &EntryKey) -> Result<()> {
        let path = self.cache_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PackError::Io {
                path,
                message: format!("Failed to remove cache file: {}", e),
            }),
        }
    }
}
