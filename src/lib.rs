//! assetpack - incremental asset compiler
//!
//! Compiles Lua scripts, PNG tile sheets and TMX tile maps from a project
//! directory into a single SQLite blob store. Unchanged sources are skipped
//! and entries whose source is gone are pruned.

pub mod cli;
pub mod codec;
pub mod compress;
pub mod discovery;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod staleness;
pub mod store;
pub mod types;

pub use compress::select;
pub use discovery::{discover, Manifest, Project};
pub use error::{PackError, Result};
pub use pipeline::{build, BuildOptions, Pipeline, PipelineOptions};
pub use report::{BuildReport, CompiledEntry, Diagnostic, Severity};
pub use staleness::{CacheDir, FreshnessOracle, StoreWatermark};
pub use store::Store;
pub use types::{AssetKind, EntryKey, SourceAsset, StoredEntry};
