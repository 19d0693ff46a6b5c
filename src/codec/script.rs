//! Script codec. Scripts are stored as their UTF-8 source text.

use crate::error::{PackError, Result};

/// Validate that `source` is UTF-8 and return it unchanged.
pub fn encode(source: &[u8]) -> Result<Vec<u8>> {
    std::str::from_utf8(source).map_err(|e| PackError::Decode {
        message: format!("Script is not valid UTF-8: {}", e),
        help: Some("Save the file with UTF-8 encoding".to_string()),
    })?;
    Ok(source.to_vec())
}
