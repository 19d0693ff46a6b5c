//! Binary codecs, one per asset kind.
//!
//! Each codec is a pure function from a source file's bytes to the encoding
//! the runtime loads. A codec error only affects the file being compiled.

pub mod script;
pub mod tilemap;
pub mod tilesheet;

use crate::error::{PackError, Result};
use crate::types::AssetKind;

/// Output of a codec.
#[derive(Debug, Default)]
pub struct Compiled {
    /// The encoded payload, before compression.
    pub bytes: Vec<u8>,
    /// Non-fatal problems found while encoding.
    pub warnings: Vec<PackError>,
}

impl Compiled {
    fn clean(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            warnings: Vec::new(),
        }
    }
}

/// Compile a source file of the given kind.
pub fn compile(kind: AssetKind, source: &[u8]) -> Result<Compiled> {
    match kind {
        AssetKind::Script => script::encode(source).map(Compiled::clean),
        AssetKind::TileSheet => tilesheet::encode(source).map(Compiled::clean),
        AssetKind::TileMap => {
            let text = std::str::from_utf8(source)
                .map_err(|e| PackError::decode(format!("Map is not valid UTF-8: {}", e)))?;
            tilemap::encode(text)
        }
    }
}
