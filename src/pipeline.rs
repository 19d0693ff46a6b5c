//! Build orchestration.
//!
//! One pass over the input directory:
//!
//! 1. For each kind, list its subfolder and ask the freshness oracle which
//!    sources need compiling.
//! 2. Compile and compress the stale sources on a worker pool.
//! 3. Write results to the store one at a time, on the calling thread.
//! 4. After every kind, delete store rows whose source was not seen.
//!
//! Per-file problems are reported in the `BuildReport` and never stop the
//! build. A source that fails to rebuild keeps its old entry only when the
//! freshness oracle will still see it as stale on the next run.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::codec::{self, Compiled};
use crate::compress::{self, Selected};
use crate::discovery::{discover, KindScan, Project};
use crate::error::{PackError, Result};
use crate::report::{BuildReport, CompiledEntry};
use crate::staleness::{CacheDir, FreshnessOracle, StoreWatermark};
use crate::store::Store;
use crate::types::{AssetKind, EntryKey, SourceAsset};

/// Tuning for a pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// zlib level, 0-9.
    pub level: u32,
    /// Worker threads; `None` uses one per core.
    pub jobs: Option<usize>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            level: compress::DEFAULT_LEVEL,
            jobs: None,
        }
    }
}

/// A compiled source, ready to be written.
struct Built {
    compiled: Compiled,
    selected: Selected,
}

/// Drives one build against an open store.
pub struct Pipeline<'a> {
    project: &'a Project,
    store: &'a mut Store,
    oracle: &'a dyn FreshnessOracle,
    options: PipelineOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        project: &'a Project,
        store: &'a mut Store,
        oracle: &'a dyn FreshnessOracle,
    ) -> Self {
        Self {
            project,
            store,
            oracle,
            options: PipelineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Run every kind, then reconcile the store.
    ///
    /// Only failing to start the worker pool is an error; everything else
    /// ends up in the report.
    pub fn run(&mut self) -> Result<BuildReport> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.options.jobs.unwrap_or(0))
            .build()?;

        let mut report = BuildReport::new();
        let mut observed: HashSet<EntryKey> = HashSet::new();

        for kind in AssetKind::ALL {
            match self.project.scan(kind) {
                Ok(scan) => self.process_kind(&pool, scan, &mut observed, &mut report),
                Err(e @ PackError::MissingSubfolder { .. }) => {
                    report.warning(None, &e);
                    report.skipped_kinds.push(kind);
                }
                Err(e) => {
                    // The folder exists but could not be listed; keep what is stored.
                    report.error(None, &e);
                    report.skipped_kinds.push(kind);
                    self.retain_kind(kind, &mut observed, &mut report);
                }
            }
        }

        self.reconcile(&observed, &mut report);

        tracing::debug!(
            compiled = report.compiled.len(),
            fresh = report.fresh.len(),
            pruned = report.pruned.len(),
            "build finished"
        );
        Ok(report)
    }

    /// Compile and store the stale sources of one kind.
    fn process_kind(
        &mut self,
        pool: &ThreadPool,
        scan: KindScan,
        observed: &mut HashSet<EntryKey>,
        report: &mut BuildReport,
    ) {
        // Failed files count as seen too. A failed rebuild drops its key
        // again below unless the oracle retains failed entries.
        observed.extend(scan.keys());

        for (key, error) in &scan.unreadable {
            report.error(Some(key.clone()), error);
        }

        let mut stale = Vec::new();
        for asset in scan.assets {
            match self.oracle.has_fresh_entry(&asset, self.store) {
                Ok(true) => report.fresh.push(asset.key()),
                Ok(false) => stale.push(asset),
                Err(e) => report.error(Some(asset.key()), &e),
            }
        }

        tracing::debug!(kind = %scan.kind, stale = stale.len(), "compiling");

        let level = self.options.level;
        let results: Vec<(SourceAsset, Result<Built>)> = pool.install(|| {
            stale
                .into_par_iter()
                .map(|asset| {
                    let built = build_asset(&asset, level);
                    (asset, built)
                })
                .collect()
        });

        for (asset, built) in results {
            let key = asset.key();
            let written = match built {
                Ok(built) => self.write(&asset, key.clone(), built, report),
                Err(e) => {
                    report.error(Some(key.clone()), &e);
                    false
                }
            };
            if !written && !self.oracle.retains_failed_entries() {
                observed.remove(&key);
            }
        }
    }

    /// Mark every stored entry of `kind` as observed.
    fn retain_kind(
        &self,
        kind: AssetKind,
        observed: &mut HashSet<EntryKey>,
        report: &mut BuildReport,
    ) {
        match self.store.keys() {
            Ok(keys) => observed.extend(keys.into_iter().filter(|k| k.kind == kind.label())),
            Err(e) => report.error(None, &e),
        }
    }

    /// Upsert one compiled asset. The only place a build writes entries.
    ///
    /// Returns whether the entry was written.
    fn write(
        &mut self,
        asset: &SourceAsset,
        key: EntryKey,
        built: Built,
        report: &mut BuildReport,
    ) -> bool {
        for warning in &built.compiled.warnings {
            report.warning(Some(key.clone()), warning);
        }

        let Built { compiled, selected } = built;
        if let Err(e) = self.store.upsert(&key, &selected.payload, selected.compressed) {
            report.error(Some(key), &e);
            return false;
        }

        if let Err(e) = self.oracle.record(asset, &compiled.bytes) {
            report.warning(Some(key.clone()), &e);
        }

        report.compiled.push(CompiledEntry {
            key,
            raw_len: compiled.bytes.len(),
            stored_len: selected.payload.len(),
            compressed: selected.compressed,
        });
        true
    }

    /// Delete entries whose source was not observed.
    fn reconcile(&mut self, observed: &HashSet<EntryKey>, report: &mut BuildReport) {
        match self.store.prune(observed) {
            Ok(removed) => {
                for key in &removed {
                    if let Err(e) = self.oracle.forget(key) {
                        report.warning(Some(key.clone()), &e);
                    }
                }
                report.pruned = removed;
            }
            Err(e) => report.error(None, &e),
        }
    }
}

/// Read, encode and compress one source.
fn build_asset(asset: &SourceAsset, level: u32) -> Result<Built> {
    let source = fs::read(&asset.path).map_err(|e| PackError::FileUnreadable {
        path: asset.path.clone(),
        message: e.to_string(),
    })?;

    let compiled = codec::compile(asset.kind, &source)?;
    let selected = compress::select_with_level(&compiled.bytes, level);

    Ok(Built { compiled, selected })
}

/// Settings for [`build`], usually taken from the command line.
///
/// Unset values fall back to the project's `pack.yaml`.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Delete the store before building.
    pub clean: bool,
    /// Cache directory for staleness checks.
    pub cache_dir: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub level: Option<u32>,
}

/// Build `input` into the store at `database`.
///
/// Fatal errors are limited to a bad manifest, an unusable store path and
/// a failed worker pool.
pub fn build(input: &Path, database: &Path, options: &BuildOptions) -> Result<BuildReport> {
    let project = discover(input)?;

    if options.clean {
        remove_store(database)?;
    }

    let cache_dir = options
        .cache_dir
        .clone()
        .or_else(|| project.manifest.cache_dir_in(&project.root));

    // Captured before the store is opened; opening it may create the file.
    let oracle: Box<dyn FreshnessOracle> = match cache_dir {
        Some(dir) => Box::new(CacheDir::new(dir)),
        None => Box::new(StoreWatermark::capture(database)),
    };

    let mut store = Store::open(database)?;

    let pipeline_options = PipelineOptions {
        level: options
            .level
            .or(project.manifest.level)
            .unwrap_or(compress::DEFAULT_LEVEL),
        jobs: options.jobs.or(project.manifest.jobs),
    };

    Pipeline::new(&project, &mut store, oracle.as_ref())
        .with_options(pipeline_options)
        .run()
}

fn remove_store(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed existing store");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PackError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to remove existing store: {}", e),
        }),
    }
}
