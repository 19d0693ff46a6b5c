//! File system scanner for asset subfolders.
//!
//! Each kind lives in its own flat subfolder of the input directory
//! (`code/`, `tiles/`, `tilemap/`). Nested directories are not descended.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{PackError, Result};
use crate::types::{AssetKind, EntryKey, SourceAsset};

use super::manifest::Manifest;

/// Result of scanning one kind's subfolder.
#[derive(Debug)]
pub struct KindScan {
    pub kind: AssetKind,
    /// Source files found, sorted by file name.
    pub assets: Vec<SourceAsset>,
    /// Files that matched the extension but could not be inspected.
    pub unreadable: Vec<(EntryKey, PackError)>,
}

impl KindScan {
    fn new(kind: AssetKind) -> Self {
        Self {
            kind,
            assets: Vec::new(),
            unreadable: Vec::new(),
        }
    }

    /// Keys of every matching file, readable or not.
    pub fn keys(&self) -> impl Iterator<Item = EntryKey> + '_ {
        self.assets
            .iter()
            .map(SourceAsset::key)
            .chain(self.unreadable.iter().map(|(key, _)| key.clone()))
    }
}

/// Scan the subfolder of `root` that holds sources of `kind`.
///
/// Fails with `MissingSubfolder` when the folder does not exist and with
/// `FileUnreadable` when it exists but cannot be listed.
pub fn scan_kind(root: &Path, kind: AssetKind, manifest: &Manifest) -> Result<KindScan> {
    let dir = root.join(kind.folder());
    if !dir.is_dir() {
        return Err(PackError::MissingSubfolder {
            folder: kind.folder(),
            root: root.to_path_buf(),
        });
    }
    if let Err(e) = fs::read_dir(&dir) {
        return Err(unreadable(dir, e.to_string()));
    }

    let mut scan = KindScan::new(kind);

    for entry in WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = match e.path() {
                    Some(path) if path != dir => path.to_path_buf(),
                    // The listing itself failed.
                    _ => return Err(unreadable(dir, e.to_string())),
                };
                if manifest.is_excluded(&path) {
                    continue;
                }
                match matching_key(&path, kind) {
                    Some(key) => scan.unreadable.push((key, unreadable(path, e.to_string()))),
                    None => {
                        tracing::debug!(path = %path.display(), error = %e, "skipping unreadable entry")
                    }
                }
                continue;
            }
        };

        let path = entry.path();
        if entry.file_type().is_dir() || manifest.is_excluded(path) {
            continue;
        }
        let Some(key) = matching_key(path, kind) else {
            continue;
        };

        let modified = entry
            .metadata()
            .map_err(|e| e.to_string())
            .and_then(|m| m.modified().map_err(|e| e.to_string()));

        match modified {
            Ok(modified) => {
                if let Some(asset) = SourceAsset::new(path, kind, modified) {
                    scan.assets.push(asset);
                }
            }
            Err(message) => {
                scan.unreadable.push((key, unreadable(path.to_path_buf(), message)));
            }
        }
    }

    Ok(scan)
}

/// Entry key for `path` if it carries the extension of `kind`.
fn matching_key(path: &Path, kind: AssetKind) -> Option<EntryKey> {
    if path.extension()?.to_str()? != kind.extension() {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    Some(EntryKey::of(kind, stem))
}

fn unreadable(path: PathBuf, message: String) -> PackError {
    PackError::FileUnreadable { path, message }
}
