//! Asset type definitions.
//!
//! Entries are identified by their name and kind label, so a script and a
//! tile sheet may share a name (e.g. `code:level1` and `tiles:level1`).

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

/// The kind of source asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Script,
    TileSheet,
    TileMap,
}

impl AssetKind {
    /// All kinds, in the order the pipeline processes them.
    pub const ALL: [AssetKind; 3] = [AssetKind::Script, AssetKind::TileSheet, AssetKind::TileMap];

    /// Subfolder of the input directory holding sources of this kind.
    pub fn folder(&self) -> &'static str {
        match self {
            AssetKind::Script => "code",
            AssetKind::TileSheet => "tiles",
            AssetKind::TileMap => "tilemap",
        }
    }

    /// File extension (without the dot) of sources of this kind.
    pub fn extension(&self) -> &'static str {
        match self {
            AssetKind::Script => "lua",
            AssetKind::TileSheet => "png",
            AssetKind::TileMap => "tmx",
        }
    }

    /// Label written to the store's `type` column.
    pub fn label(&self) -> &'static str {
        // The runtime looks entries up by folder name.
        self.folder()
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The `(name, type)` key of a store row.
///
/// Kinds are kept as raw labels so rows written by other tools can still be
/// listed and reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntryKey {
    pub name: String,
    pub kind: String,
}

impl EntryKey {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }

    /// Key for an entry of a known asset kind.
    pub fn of(kind: AssetKind, name: impl Into<String>) -> Self {
        Self::new(name, kind.label())
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

/// A source file observed during a scan.
#[derive(Debug, Clone)]
pub struct SourceAsset {
    pub path: PathBuf,
    pub kind: AssetKind,
    /// File name without its extension; becomes the stored name.
    pub stem: String,
    pub modified: SystemTime,
}

impl SourceAsset {
    /// Build an asset from a path, deriving the stem from the file name.
    ///
    /// Returns `None` when the file name is not valid UTF-8.
    pub fn new(path: impl AsRef<Path>, kind: AssetKind, modified: SystemTime) -> Option<Self> {
        let path = path.as_ref();
        let stem = path.file_stem()?.to_str()?.to_string();
        Some(Self {
            path: path.to_path_buf(),
            kind,
            stem,
            modified,
        })
    }

    pub fn key(&self) -> EntryKey {
        EntryKey::of(self.kind, &self.stem)
    }
}

/// A row of the store's `data` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub key: EntryKey,
    pub payload: Vec<u8>,
    pub compressed: bool,
}

impl StoredEntry {
    /// The codec output this entry was built from, inflating if needed.
    pub fn decompressed(&self) -> crate::Result<Vec<u8>> {
        if self.compressed {
            crate::compress::decompress(&self.payload)
        } else {
            Ok(self.payload.clone())
        }
    }
}
