//! Durable key-value slot contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist named text slots (`projects`, `offline_projects`).
//! - Encode/decode slot payloads as JSON.
//!
//! # Invariants
//! - `write_batch` applies every write or none of them.
//! - A missing slot reads as `None`, never as an error.
//! - Payloads round-trip exactly, including nested team member lists.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};

/// Slot holding the canonical project list.
pub const PROJECTS_SLOT: &str = "projects";
/// Slot holding the pending-write queue of offline creations.
pub const OFFLINE_PROJECTS_SLOT: &str = "offline_projects";

pub type SlotResult<T> = Result<T, SlotError>;

/// Slot persistence and payload errors.
#[derive(Debug)]
pub enum SlotError {
    Db(DbError),
    Encode {
        key: String,
        source: serde_json::Error,
    },
    Decode {
        key: String,
        source: serde_json::Error,
    },
}

impl Display for SlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode { key, source } => write!(f, "failed to encode slot `{key}`: {source}"),
            Self::Decode { key, source } => {
                write!(f, "malformed payload in slot `{key}`: {source}")
            }
        }
    }
}

impl Error for SlotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode { source, .. } | Self::Decode { source, .. } => Some(source),
        }
    }
}

impl From<DbError> for SlotError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SlotError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl SlotError {
    /// Short stable code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Db(_) => "slot_io_failed",
            Self::Encode { .. } => "slot_encode_failed",
            Self::Decode { .. } => "slot_decode_failed",
        }
    }
}

/// One mutation inside an atomic slot batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotWrite {
    Put { key: String, value: String },
    Remove { key: String },
}

impl SlotWrite {
    /// Builds a `Put` by JSON-encoding `value`.
    pub fn put_json<T: Serialize + ?Sized>(key: &str, value: &T) -> SlotResult<Self> {
        let encoded = serde_json::to_string(value).map_err(|source| SlotError::Encode {
            key: key.to_string(),
            source,
        })?;
        Ok(Self::Put {
            key: key.to_string(),
            value: encoded,
        })
    }

    pub fn remove(key: &str) -> Self {
        Self::Remove {
            key: key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Put { key, .. } | Self::Remove { key } => key,
        }
    }
}

/// Durable key-value storage used by the project store.
pub trait SlotStore: Send + Sync {
    /// Reads one slot. Returns `None` when the slot was never written or was removed.
    fn read(&self, key: &str) -> SlotResult<Option<String>>;
    /// Applies all writes atomically, in order.
    fn write_batch(&self, writes: &[SlotWrite]) -> SlotResult<()>;
}

impl<T: SlotStore + ?Sized> SlotStore for Arc<T> {
    fn read(&self, key: &str) -> SlotResult<Option<String>> {
        (**self).read(key)
    }

    fn write_batch(&self, writes: &[SlotWrite]) -> SlotResult<()> {
        (**self).write_batch(writes)
    }
}

/// Reads and JSON-decodes one slot.
///
/// # Errors
/// - `Decode` when the stored text is not a valid `T` payload.
/// - `Db` on storage failure.
pub fn read_json<T: DeserializeOwned>(store: &dyn SlotStore, key: &str) -> SlotResult<Option<T>> {
    let Some(raw) = store.read(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| SlotError::Decode {
            key: key.to_string(),
            source,
        })
}

/// SQLite-backed slot store over the `kv_slots` table.
///
/// Owns its connection behind a mutex so one store can be shared across threads.
pub struct SqliteSlotStore {
    conn: Mutex<Connection>,
}

impl SqliteSlotStore {
    /// Wraps a migrated connection (see `db::open_db`).
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-statement leaves no open transaction behind, so the
        // connection stays usable after poisoning.
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SlotStore for SqliteSlotStore {
    fn read(&self, key: &str) -> SlotResult<Option<String>> {
        let conn = self.lock();
        let value = conn
            .query_row(
                "SELECT value FROM kv_slots WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_batch(&self, writes: &[SlotWrite]) -> SlotResult<()> {
        if writes.is_empty() {
            return Ok(());
        }

        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        for write in writes {
            match write {
                SlotWrite::Put { key, value } => {
                    tx.execute(
                        "INSERT INTO kv_slots (key, value, updated_at)
                         VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                         ON CONFLICT(key) DO UPDATE SET
                            value = excluded.value,
                            updated_at = excluded.updated_at;",
                        params![key, value],
                    )?;
                }
                SlotWrite::Remove { key } => {
                    tx.execute("DELETE FROM kv_slots WHERE key = ?1;", [key])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}
