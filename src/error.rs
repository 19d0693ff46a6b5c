use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for assetpack operations
#[derive(Error, Diagnostic, Debug)]
pub enum PackError {
    #[error("IO error with {}: {message}", .path.display())]
    #[diagnostic(code(assetpack::io))]
    Io { path: PathBuf, message: String },

    #[error("Config error: {message}")]
    #[diagnostic(code(assetpack::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("'{folder}' subfolder not found in {}", .root.display())]
    #[diagnostic(
        code(assetpack::missing_subfolder),
        help("Entries of this kind are pruned from the store")
    )]
    MissingSubfolder { folder: &'static str, root: PathBuf },

    #[error("Cannot read {}: {message}", .path.display())]
    #[diagnostic(code(assetpack::unreadable))]
    FileUnreadable { path: PathBuf, message: String },

    #[error("Decode error: {message}")]
    #[diagnostic(code(assetpack::decode))]
    Decode {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Could not parse tile ID '{token}' in layer {layer}")]
    #[diagnostic(code(assetpack::malformed_tile_id))]
    MalformedTileId { token: String, layer: usize },

    #[error("{count} tile index(es) of 0x4000 or above overlap the flip flag bits")]
    #[diagnostic(
        code(assetpack::tile_index_overlap),
        help("Packed cells only hold 14 bits of tile index")
    )]
    TileIndexOverlap { count: usize },

    #[error("Store error: {0}")]
    #[diagnostic(code(assetpack::store))]
    Store(#[from] rusqlite::Error),

    #[error("Failed to write {id}: {message}")]
    #[diagnostic(code(assetpack::store_write))]
    StoreWrite { id: String, message: String },

    #[error("Worker pool error: {0}")]
    #[diagnostic(code(assetpack::pool))]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl PackError {
    /// Build a decode error without help text.
    pub fn decode(message: impl Into<String>) -> Self {
        PackError::Decode {
            message: message.into(),
            help: None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
