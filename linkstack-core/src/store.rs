//! Durable key-value slot holding the item collection.
//!
//! Every backend stores one JSON document (the full ordered array of items)
//! under [`STORAGE_KEY`]. `load` never fails: a missing or unreadable slot
//! yields an empty collection. `try_load` reports the failure instead.
//! `save` replaces the slot as a whole.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};
use crate::item::Item;

pub const STORAGE_KEY: &str = "linkstack-links";

pub trait Store: Send + Sync {
    /// Raw slot content, `None` when nothing was ever written.
    fn read_slot(&self) -> Result<Option<String>>;

    /// Replace the slot content.
    fn write_slot(&self, value: &str) -> Result<()>;

    /// Strict read: a missing slot is empty, unreadable or corrupt data is an error.
    fn try_load(&self) -> Result<Vec<Item>> {
        let Some(raw) = self.read_slot()? else {
            return Ok(Vec::new());
        };
        let items: Vec<Item> = serde_json::from_str(&raw)?;
        tracing::debug!(count = items.len(), "loaded items");
        Ok(items)
    }

    fn load(&self) -> Vec<Item> {
        self.try_load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "stored items unreadable, starting empty");
            Vec::new()
        })
    }

    fn save(&self, items: &[Item]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.write_slot(&raw)?;
        tracing::debug!(count = items.len(), bytes = raw.len(), "saved items");
        Ok(())
    }
}

impl<S: Store + ?Sized> Store for std::sync::Arc<S> {
    fn read_slot(&self) -> Result<Option<String>> {
        (**self).read_slot()
    }

    fn write_slot(&self, value: &str) -> Result<()> {
        (**self).write_slot(value)
    }
}

/// In-process slot, optionally capped at `quota` bytes to mimic a
/// browser storage limit.
#[derive(Default)]
pub struct MemStore {
    slot: RwLock<Option<String>>,
    quota: Option<usize>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            slot: RwLock::new(None),
            quota: Some(quota),
        }
    }

    /// Seed the slot with arbitrary content, bypassing serialization.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: RwLock::new(Some(raw.into())),
            quota: None,
        }
    }
}

impl Store for MemStore {
    fn read_slot(&self) -> Result<Option<String>> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        Ok(slot.clone())
    }

    fn write_slot(&self, value: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            if value.len() > quota {
                return Err(Error::QuotaExceeded {
                    needed: value.len(),
                    quota,
                });
            }
        }
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(value.to_string());
        Ok(())
    }
}

/// `<dir>/linkstack-links.json`, replaced via write-to-temp-then-rename.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for JsonFileStore {
    fn read_slot(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_slot(&self, value: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Local SQLite database with a single `kv` table.
pub struct SqliteStore {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let conn = Connection::open(&path)?;
        let _ = conn.pragma_update(None, "journal_mode", "WAL");
        conn.busy_timeout(std::time::Duration::from_millis(5000))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for SqliteStore {
    fn read_slot(&self) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let value = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![STORAGE_KEY],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_slot(&self, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO kv(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![STORAGE_KEY, value],
        )?;
        tx.commit()?;
        Ok(())
    }
}
