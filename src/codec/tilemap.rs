//! Tile map codec.
//!
//! Reads Tiled `.tmx` documents and packs every layer's GIDs into
//! little-endian u16 cells:
//!
//! ```text
//!  15   14   13 ............ 0
//! [H] [V] [ zero-based tile index ]
//! ```
//!
//! Indices of 0x4000 and above share bits with the flip flags. They are
//! packed as-is and reported.

use std::io::Read;

use base64::prelude::{Engine as _, BASE64_STANDARD};
use flate2::read::ZlibDecoder;
use roxmltree::{Document, Node, ParsingOptions};

use crate::error::{PackError, Result};

use super::Compiled;

/// Horizontal flip flag in a GID.
pub const GID_FLIP_H: u32 = 1 << 31;

/// Vertical flip flag in a GID.
pub const GID_FLIP_V: u32 = 1 << 30;

/// First packed index that collides with the flag bits.
pub const INDEX_LIMIT: u16 = 0x4000;

/// Pack one GID into a 16-bit cell.
pub fn pack_gid(gid: u32) -> u16 {
    let mut index = (gid & 0xFFFF) as u16;
    if index > 0 {
        index -= 1;
    }
    let h = ((gid >> 31) & 1) as u16;
    let v = ((gid >> 30) & 1) as u16;
    (h << 15) | (v << 14) | index
}

/// Whether the packed index of `gid` overlaps the flag bits.
pub fn index_overlaps_flags(gid: u32) -> bool {
    (gid & 0xFFFF).saturating_sub(1) >= INDEX_LIMIT as u32
}

/// Layer data encodings the codec understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayerEncoding {
    Base64Zlib,
    Csv,
}

impl LayerEncoding {
    fn of(data: Node<'_, '_>) -> Option<Self> {
        match (data.attribute("encoding"), data.attribute("compression")) {
            (Some("base64"), Some("zlib")) => Some(LayerEncoding::Base64Zlib),
            (Some("csv"), _) => Some(LayerEncoding::Csv),
            _ => None,
        }
    }
}

/// Encode a `.tmx` document.
pub fn encode(source: &str) -> Result<Compiled> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(source, options).map_err(|e| PackError::Decode {
        message: format!("Malformed map document: {}", e),
        help: Some("Maps must be saved by Tiled as .tmx XML".to_string()),
    })?;

    let mut compiled = Compiled::default();
    let mut overlapping = 0usize;

    let layers = doc
        .root_element()
        .children()
        .filter(|n| n.has_tag_name("layer"));

    for (layer_index, layer) in layers.enumerate() {
        let Some(data) = layer.children().find(|n| n.has_tag_name("data")) else {
            continue;
        };
        let Some(encoding) = LayerEncoding::of(data) else {
            tracing::debug!(layer = layer_index, "skipping layer with unsupported encoding");
            continue;
        };

        let text = data.text().unwrap_or("");
        let gids = match encoding {
            LayerEncoding::Base64Zlib => decode_base64_zlib(text)?,
            LayerEncoding::Csv => decode_csv(text, layer_index, &mut compiled.warnings),
        };

        for gid in gids {
            if index_overlaps_flags(gid) {
                overlapping += 1;
            }
            compiled.bytes.extend_from_slice(&pack_gid(gid).to_le_bytes());
        }
    }

    if overlapping > 0 {
        compiled
            .warnings
            .push(PackError::TileIndexOverlap { count: overlapping });
    }

    Ok(compiled)
}

/// Decode base64 text of a zlib stream of little-endian u32 GIDs.
fn decode_base64_zlib(text: &str) -> Result<Vec<u32>> {
    // Tiled wraps long base64 runs across lines.
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let zipped = BASE64_STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| PackError::decode(format!("Invalid base64 layer data: {}", e)))?;

    let mut raw = Vec::new();
    ZlibDecoder::new(zipped.as_slice())
        .read_to_end(&mut raw)
        .map_err(|e| PackError::decode(format!("Invalid zlib layer data: {}", e)))?;

    if raw.len() % 4 != 0 {
        return Err(PackError::decode(format!(
            "Layer data is {} bytes, not a whole number of 32-bit tile IDs",
            raw.len()
        )));
    }

    Ok(raw
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Decode comma-separated decimal GIDs, skipping tokens that do not parse.
fn decode_csv(text: &str, layer: usize, warnings: &mut Vec<PackError>) -> Vec<u32> {
    let mut gids = Vec::new();

    for token in text.trim().split(',') {
        let token = token.trim();
        match token.parse::<u32>() {
            Ok(gid) => gids.push(gid),
            Err(_) => warnings.push(PackError::MalformedTileId {
                token: token.to_string(),
                layer,
            }),
        }
    }

    gids
}
