//! Core domain types for assetpack.
//!
//! - `AssetKind` - the three source kinds and their folder layout
//! - `SourceAsset` - a source file observed during a scan
//! - `EntryKey` / `StoredEntry` - rows of the blob store

mod asset;

pub use asset::{AssetKind, EntryKey, SourceAsset, StoredEntry};
