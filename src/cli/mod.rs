pub mod build;

use std::path::PathBuf;

use clap::Parser;

/// assetpack - compile game assets into a packed blob store
#[derive(Parser, Debug)]
#[command(name = "assetpack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory containing the 'code', 'tiles' and 'tilemap' subfolders
    pub input_directory: PathBuf,

    /// Store file to create or update
    pub database_name: PathBuf,

    /// Delete the store and rebuild every entry
    #[arg(long)]
    pub clean: bool,

    /// Track staleness with per-entry cache files in this directory
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Worker threads for compiling (default: one per core)
    #[arg(long, short)]
    pub jobs: Option<usize>,

    /// zlib compression level
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=9))]
    pub level: Option<u32>,

    /// Print the build report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Also list entries that were already up to date
    #[arg(long, short)]
    pub verbose: bool,
}
