//! Compression selection for stored payloads.
//!
//! Each payload is zlib-compressed and kept compressed only when that is
//! strictly smaller than the raw bytes. The runtime inflates rows flagged
//! as compressed with a plain zlib decoder.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{PackError, Result};

/// Default zlib level.
pub const DEFAULT_LEVEL: u32 = 6;

/// A payload chosen for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected {
    pub payload: Vec<u8>,
    pub compressed: bool,
}

/// Choose between the compressed and raw form of `bytes` at the default level.
pub fn select(bytes: &[u8]) -> Selected {
    select_with_level(bytes, DEFAULT_LEVEL)
}

/// Choose between the compressed and raw form of `bytes`.
///
/// Returns the zlib stream only when it is strictly shorter than the input;
/// otherwise the input is returned verbatim.
pub fn select_with_level(bytes: &[u8], level: u32) -> Selected {
    match deflate(bytes, level) {
        Some(packed) if packed.len() < bytes.len() => Selected {
            payload: packed,
            compressed: true,
        },
        _ => Selected {
            payload: bytes.to_vec(),
            compressed: false,
        },
    }
}

fn deflate(bytes: &[u8], level: u32) -> Option<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level.min(9)));
    // Writing into a Vec cannot fail; treat any error as "not smaller".
    encoder.write_all(bytes).ok()?;
    encoder.finish().ok()
}

/// Inflate a zlib stream produced by [`select`].
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(bytes)
        .read_to_end(&mut out)
        .map_err(|e| PackError::decode(format!("Invalid zlib stream: {}", e)))?;
    Ok(out)
}
