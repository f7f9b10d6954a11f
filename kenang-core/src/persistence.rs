//! Persistence collaborators for the long-term memory blob.
//!
//! The engine treats storage as an opaque key-value slot holding one JSON
//! object. Whatever comes back from [`MemoryStore::load`] is passed through
//! [`LongTermMemory::normalize`] by the caller, so stores never validate
//! shape beyond "is it JSON".
//!
//! Three implementations are provided:
//!
//! - [`JsonFileStore`] — one pretty-printed JSON file. A missing or corrupt
//!   file is replaced by the all-defaults blob.
//! - [`SqliteStore`] — one row per profile in an SQLite database, with an
//!   optional CRC-32 to flag corruption:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS memory_blobs (
//!     profile    TEXT PRIMARY KEY,
//!     data       BLOB NOT NULL,
//!     updated_at TEXT NOT NULL,
//!     checksum   TEXT
//! );
//! ```
//!
//! - [`InMemoryStore`] — a process-local slot.

use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::PersistenceConfig;
use crate::error::{KenangError, Result};
use crate::memory::LongTermMemory;

/// External key-value slot holding the long-term memory blob.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Fetch the stored blob. `Ok(None)` means nothing was stored yet.
    ///
    /// # Errors
    /// Returns an error when the store cannot be read.
    async fn load(&self) -> Result<Option<Value>>;

    /// Replace the stored blob.
    ///
    /// # Errors
    /// Returns an error when the store refuses or fails the write.
    async fn save(&self, blob: &Value) -> Result<()>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Open the store selected by `config.backend`.
///
/// # Errors
/// Returns [`KenangError::Config`] for an unknown backend, or the store's own
/// error if it cannot be opened.
pub fn open_store(config: &PersistenceConfig) -> Result<Box<dyn MemoryStore>> {
    match config.backend.as_str() {
        "json" => Ok(Box::new(JsonFileStore::new(&config.path))),
        "sqlite" => Ok(Box::new(SqliteStore::open(
            &config.path,
            &config.profile,
            config.checksum_enabled,
        )?)),
        "memory" => Ok(Box::new(InMemoryStore::new())),
        other => Err(KenangError::Config(format!(
            "unknown persistence backend '{other}' (expected json, sqlite or memory)"
        ))),
    }
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// Stores the blob as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by the file at `path`. Nothing is touched until first use.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_blob(&self, blob: &Value) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(blob)?;
        tokio::fs::write(&self.path, &bytes).await?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "Wrote memory blob");
        Ok(())
    }

    async fn reset_to_defaults(&self) -> Result<Value> {
        let defaults = LongTermMemory::default().to_blob();
        self.write_blob(&defaults).await?;
        Ok(defaults)
    }
}

#[async_trait]
impl MemoryStore for JsonFileStore {
    async fn load(&self) -> Result<Option<Value>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No memory file yet, creating defaults");
                return self.reset_to_defaults().await.map(Some);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Memory file is corrupt, replacing with defaults"
                );
                self.reset_to_defaults().await.map(Some)
            }
        }
    }

    async fn save(&self, blob: &Value) -> Result<()> {
        let normalized = LongTermMemory::normalize(blob).to_blob();
        self.write_blob(&normalized).await
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

// ---------------------------------------------------------------------------
// CRC-32 checksum helper
// ---------------------------------------------------------------------------

/// Compute a CRC-32 of `data` and return it as a lowercase hex string.
fn crc32_hex(data: &[u8]) -> String {
    format!("{:08x}", crc32_compute(data))
}

/// Basic CRC-32 (ISO 3309 / ITU-T V.42) computation.
fn crc32_compute(data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            if crc & 1 == 1 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }
    !crc
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS memory_blobs (
    profile    TEXT PRIMARY KEY,
    data       BLOB NOT NULL,
    updated_at TEXT NOT NULL,
    checksum   TEXT
);";

/// Stores one blob per profile in an SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    profile: String,
    checksum_enabled: bool,
    db_path: PathBuf,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .field("profile", &self.profile)
            .field("checksum_enabled", &self.checksum_enabled)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) an SQLite database at `path`, scoped to `profile`.
    ///
    /// # Errors
    ///
    /// Returns [`KenangError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, profile: &str, checksum_enabled: bool) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&db_path, flags)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        conn.execute_batch(SCHEMA)?;

        info!(path = %db_path.display(), profile, "SQLite memory store opened");

        Ok(Self {
            conn: Mutex::new(conn),
            profile: profile.to_string(),
            checksum_enabled,
            db_path,
        })
    }

    /// Open an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`KenangError::Database`] on SQLite failures.
    pub fn open_in_memory(profile: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            profile: profile.to_string(),
            checksum_enabled: true,
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Profile this store reads and writes.
    #[must_use]
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Upsert the blob for this profile.
    ///
    /// # Errors
    ///
    /// Returns [`KenangError::Serialization`] if JSON encoding fails, or
    /// [`KenangError::Database`] on SQLite failures.
    pub fn save_blob(&self, blob: &Value) -> Result<()> {
        let start = Instant::now();
        let json = serde_json::to_vec(blob)?;
        let checksum = self.checksum_enabled.then(|| crc32_hex(&json));
        let now = Utc::now().to_rfc3339();

        self.conn.lock().execute(
            "INSERT INTO memory_blobs (profile, data, updated_at, checksum)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(profile) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at,
                checksum = excluded.checksum",
            params![self.profile, json, now, checksum],
        )?;

        debug!(
            profile = %self.profile,
            bytes = json.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Saved memory blob"
        );
        Ok(())
    }

    /// Load the blob for this profile.
    ///
    /// A checksum mismatch is logged but the data is still returned; bytes
    /// that are not JSON at all come back as `Value::Null` so the caller's
    /// normalization substitutes defaults.
    ///
    /// # Errors
    ///
    /// Returns [`KenangError::Database`] on SQLite failures.
    pub fn load_blob(&self) -> Result<Option<Value>> {
        let start = Instant::now();
        let row: Option<(Vec<u8>, Option<String>)> = self
            .conn
            .lock()
            .query_row(
                "SELECT data, checksum FROM memory_blobs WHERE profile = ?1",
                params![self.profile],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((data, stored_checksum)) = row else {
            return Ok(None);
        };

        if self.checksum_enabled {
            if let Some(expected) = stored_checksum {
                let actual = crc32_hex(&data);
                if expected != actual {
                    warn!(
                        profile = %self.profile,
                        expected = %expected,
                        actual = %actual,
                        "Checksum mismatch, possible save corruption"
                    );
                }
            }
        }

        let value: Value = serde_json::from_slice(&data).unwrap_or_else(|e| {
            warn!(profile = %self.profile, error = %e, "Stored blob is not valid JSON");
            Value::Null
        });

        debug!(
            profile = %self.profile,
            bytes = data.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Loaded memory blob"
        );
        Ok(Some(value))
    }
}

#[async_trait]
impl MemoryStore for SqliteStore {
    async fn load(&self) -> Result<Option<Value>> {
        self.load_blob()
    }

    async fn save(&self, blob: &Value) -> Result<()> {
        self.save_blob(blob)
    }

    fn describe(&self) -> String {
        format!("sqlite:{}#{}", self.db_path.display(), self.profile)
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local blob slot.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    slot: Mutex<Option<Value>>,
}

impl InMemoryStore {
    /// Empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-filled with `blob`.
    #[must_use]
    pub fn with_blob(blob: Value) -> Self {
        Self {
            slot: Mutex::new(Some(blob)),
        }
    }

    /// Copy of the currently stored blob.
    #[must_use]
    pub fn snapshot(&self) -> Option<Value> {
        self.slot.lock().clone()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn load(&self) -> Result<Option<Value>> {
        Ok(self.snapshot())
    }

    async fn save(&self, blob: &Value) -> Result<()> {
        *self.slot.lock() = Some(blob.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn crc32_known_vector() {
        // Standard check value for "123456789".
        assert_eq!(crc32_hex(b"123456789"), "cbf43926");
    }

    #[test]
    fn sqlite_round_trip_per_profile() {
        let store = SqliteStore::open_in_memory("rani").expect("open");
        assert!(store.load_blob().expect("load").is_none());

        let blob = json!({"summary": "USER: halo", "facts": ["Aku tinggal di Bogor"]});
        store.save_blob(&blob).expect("save");
        assert_eq!(store.load_blob().expect("load"), Some(blob));
    }

    #[test]
    fn unknown_backend_is_a_config_error() {
        let config = PersistenceConfig {
            backend: "redis".to_string(),
            ..PersistenceConfig::default()
        };
        assert!(matches!(open_store(&config), Err(KenangError::Config(_))));
    }
}
