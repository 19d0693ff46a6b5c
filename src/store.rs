//! Packed blob store.
//!
//! A single SQLite file holding one `data` row per compiled asset, keyed by
//! `(name, type)`, plus an empty `saves` table owned by the runtime.
//!
//! The store is the only writer-facing shared state in a build; callers
//! funnel every write through one `Store` value.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::error::{PackError, Result};
use crate::types::{EntryKey, StoredEntry};

/// Schema shared with the runtime loader.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS data (
    name TEXT NOT NULL,
    type TEXT NOT NULL,
    data BLOB,
    compressed INTEGER NOT NULL,
    CONSTRAINT un UNIQUE (name, type)
);
CREATE TABLE IF NOT EXISTS saves (
    name TEXT UNIQUE NOT NULL,
    data BLOB,
    compressed INTEGER NOT NULL
);
"#;

/// Handle to an open blob store.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the store at `path` and apply the schema.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| PackError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to open store: {}", e),
        })?;
        // The default rollback journal keeps every commit in the main file,
        // so its mtime tracks the last write.
        conn.execute_batch(SCHEMA)?;
        tracing::debug!(path = %path.display(), "opened store");

        Ok(Self { conn })
    }

    /// Open a throwaway store that lives only in memory.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Whether a row exists for `key`.
    pub fn contains(&self, key: &EntryKey) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM data WHERE name = ?1 AND type = ?2",
                params![key.name, key.kind],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Read the row for `key`.
    pub fn get(&self, key: &EntryKey) -> Result<Option<StoredEntry>> {
        let row = self
            .conn
            .query_row(
                "SELECT data, compressed FROM data WHERE name = ?1 AND type = ?2",
                params![key.name, key.kind],
                |row| {
                    let payload: Option<Vec<u8>> = row.get(0)?;
                    let compressed: i64 = row.get(1)?;
                    Ok((payload.unwrap_or_default(), compressed != 0))
                },
            )
            .optional()?;

        Ok(row.map(|(payload, compressed)| StoredEntry {
            key: key.clone(),
            payload,
            compressed,
        }))
    }

    /// Insert the row for `key`, replacing any existing payload in place.
    ///
    /// A single statement, so readers see either the old row or the new one.
    pub fn upsert(&self, key: &EntryKey, payload: &[u8], compressed: bool) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO data (name, type, data, compressed) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (name, type) DO UPDATE
                 SET data = excluded.data, compressed = excluded.compressed",
                params![key.name, key.kind, payload, compressed as i64],
            )
            .map_err(|e| PackError::StoreWrite {
                id: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Every key currently stored, in sorted order.
    pub fn keys(&self) -> Result<BTreeSet<EntryKey>> {
        let mut stmt = self.conn.prepare("SELECT name, type FROM data")?;
        let keys = stmt
            .query_map([], |row| {
                let name: String = row.get(0)?;
                let kind: String = row.get(1)?;
                Ok(EntryKey::new(name, kind))
            })?
            .collect::<rusqlite::Result<BTreeSet<_>>>()?;
        Ok(keys)
    }

    /// Delete every row whose key was not observed, in one transaction.
    ///
    /// Returns the removed keys.
    pub fn prune(&mut self, observed: &HashSet<EntryKey>) -> Result<Vec<EntryKey>> {
        let orphaned: Vec<EntryKey> = self
            .keys()?
            .into_iter()
            .filter(|k| !observed.contains(k))
            .collect();

        if orphaned.is_empty() {
            return Ok(orphaned);
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        for key in &orphaned {
            tx.execute(
                "DELETE FROM data WHERE name = ?1 AND type = ?2",
                params![key.name, key.kind],
            )?;
        }
        tx.commit()?;

        tracing::debug!(count = orphaned.len(), "pruned orphaned entries");
        Ok(orphaned)
    }

    /// Number of rows in the `saves` table.
    pub fn save_count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM saves", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}
