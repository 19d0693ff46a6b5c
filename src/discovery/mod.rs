//! Source discovery for assetpack builds.
//!
//! Finds the optional `pack.yaml` manifest and lists each kind's subfolder
//! of the input directory.
//!
//! # Example
//!
//! ```ignore
//! use assetpack::discovery::discover;
//! use assetpack::AssetKind;
//!
//! let project = discover("./game")?;
//! let scan = project.scan(AssetKind::Script)?;
//! println!("Found {} scripts", scan.assets.len());
//! ```

mod manifest;
mod scanner;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::AssetKind;

pub use manifest::Manifest;
pub use scanner::{scan_kind, KindScan};

/// The name of the manifest file.
pub const MANIFEST_FILENAME: &str = "pack.yaml";

/// An input directory with its manifest loaded.
#[derive(Debug)]
pub struct Project {
    /// The input directory.
    pub root: PathBuf,

    /// The loaded manifest (default if no pack.yaml found).
    pub manifest: Manifest,
}

impl Project {
    /// Scan the subfolder for one asset kind.
    pub fn scan(&self, kind: AssetKind) -> Result<KindScan> {
        scan_kind(&self.root, kind, &self.manifest)
    }
}

/// Open an input directory, loading `pack.yaml` when present.
pub fn discover(root: impl AsRef<Path>) -> Result<Project> {
    let root = root.as_ref().to_path_buf();

    let manifest_path = root.join(MANIFEST_FILENAME);
    let manifest = if manifest_path.is_file() {
        Manifest::load(&manifest_path)?
    } else {
        Manifest::default()
    };

    Ok(Project { root, manifest })
}
