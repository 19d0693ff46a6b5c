//! Build results and diagnostics.
//!
//! A build never stops on a per-file problem. Every problem becomes a
//! `Diagnostic` in the `BuildReport`, alongside what was compiled, what was
//! already fresh and what was pruned.

use std::fmt;

use miette::Diagnostic as _;
use serde::Serialize;

use crate::error::PackError;
use crate::types::{AssetKind, EntryKey};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single reported problem.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Machine-readable code (e.g. "assetpack::decode").
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Entry the problem belongs to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<EntryKey>,
    /// Optional help text suggesting how to fix the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl Diagnostic {
    /// Convert an error into a diagnostic, keeping its code and help.
    pub fn from_error(severity: Severity, entry: Option<EntryKey>, error: &PackError) -> Self {
        Self {
            severity,
            code: error
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "assetpack".to_string()),
            message: error.to_string(),
            entry,
            help: error.help().map(|h| h.to_string()),
        }
    }

    pub fn error(entry: Option<EntryKey>, error: &PackError) -> Self {
        Self::from_error(Severity::Error, entry, error)
    }

    pub fn warning(entry: Option<EntryKey>, error: &PackError) -> Self {
        Self::from_error(Severity::Warning, entry, error)
    }
}

/// One entry written to the store.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledEntry {
    pub key: EntryKey,
    /// Codec output size.
    pub raw_len: usize,
    /// Size of the stored payload.
    pub stored_len: usize,
    pub compressed: bool,
}

/// Outcome of a build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    /// Entries compiled and written this run.
    pub compiled: Vec<CompiledEntry>,
    /// Entries whose source was unchanged.
    pub fresh: Vec<EntryKey>,
    /// Entries deleted because their source is gone.
    pub pruned: Vec<EntryKey>,
    /// Kinds whose subfolder was missing.
    pub skipped_kinds: Vec<AssetKind>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Record an error for `entry`.
    pub fn error(&mut self, entry: Option<EntryKey>, error: &PackError) {
        self.push(Diagnostic::error(entry, error));
    }

    /// Record a warning for `entry`.
    pub fn warning(&mut self, entry: Option<EntryKey>, error: &PackError) {
        self.push(Diagnostic::warning(entry, error));
    }

    /// Count errors.
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Count warnings.
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Whether the run changed the store.
    pub fn changed_store(&self) -> bool {
        !self.compiled.is_empty() || !self.pruned.is_empty()
    }

    /// Look up the compiled record for `key`.
    pub fn compiled_entry(&self, key: &EntryKey) -> Option<&CompiledEntry> {
        self.compiled.iter().find(|c| &c.key == key)
    }
}
