//! Snapshot repository contracts with SQLite and in-memory backends.
//!
//! # Responsibility
//! - Serialize one store state into a keyed JSON blob and back.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Each storage key holds at most one snapshot; `save` replaces it.
//! - Blobs are wrapped as `{"state": ..., "version": N}`.

use crate::db::DbError;
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

/// Storage key of the signed-in profile snapshot.
pub const AUTH_STORAGE_KEY: &str = "auth-storage";
/// Storage key of the task/event snapshot.
pub const CALENDAR_STORAGE_KEY: &str = "calendar-storage";
/// Storage key of the accessibility preference snapshot.
pub const ACCESSIBILITY_STORAGE_KEY: &str = "accessibility-storage";

/// Format version written into every snapshot envelope.
pub const SNAPSHOT_VERSION: u32 = 0;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for snapshot persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Serialization(serde_json::Error),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "snapshot serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted snapshot: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Repository interface for whole-state persistence of one store.
pub trait SnapshotRepository<T> {
    /// Returns the last saved state, or `None` when nothing was saved yet.
    fn load(&self) -> RepoResult<Option<T>>;
    /// Replaces the saved state.
    fn save(&self, state: &T) -> RepoResult<()>;
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    state: &'a T,
    version: u32,
}

#[derive(Deserialize)]
struct Envelope<T> {
    state: T,
    #[serde(default)]
    version: u32,
}

fn encode<T: Serialize>(state: &T) -> RepoResult<String> {
    Ok(serde_json::to_string(&EnvelopeRef {
        state,
        version: SNAPSHOT_VERSION,
    })?)
}

fn decode<T: DeserializeOwned>(key: &str, payload: &str) -> RepoResult<T> {
    let envelope: Envelope<T> = serde_json::from_str(payload)?;
    if envelope.version > SNAPSHOT_VERSION {
        warn!(
            "event=snapshot_load module=repo status=error key={} version={} error_code=unsupported_version",
            key, envelope.version
        );
        return Err(RepoError::InvalidData(format!(
            "snapshot `{key}` has version {} newer than supported {SNAPSHOT_VERSION}",
            envelope.version
        )));
    }
    Ok(envelope.state)
}

/// SQLite-backed snapshot repository bound to one storage key.
pub struct SqliteSnapshotRepository<'conn, T> {
    conn: &'conn Connection,
    key: String,
    _state: PhantomData<fn() -> T>,
}

impl<'conn, T> SqliteSnapshotRepository<'conn, T> {
    pub fn new(conn: &'conn Connection, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
            _state: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Deletes the stored snapshot, if any. Returns whether a row was removed.
    pub fn clear(&self) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM snapshots WHERE key = ?1;", [self.key.as_str()])?;
        Ok(changed > 0)
    }
}

impl<T> SnapshotRepository<T> for SqliteSnapshotRepository<'_, T>
where
    T: Serialize + DeserializeOwned,
{
    fn load(&self) -> RepoResult<Option<T>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM snapshots WHERE key = ?1;",
                [self.key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(payload) => {
                debug!(
                    "event=snapshot_load module=repo status=ok key={} bytes={}",
                    self.key,
                    payload.len()
                );
                decode(&self.key, &payload).map(Some)
            }
            None => {
                debug!(
                    "event=snapshot_load module=repo status=empty key={}",
                    self.key
                );
                Ok(None)
            }
        }
    }

    fn save(&self, state: &T) -> RepoResult<()> {
        let payload = encode(state)?;
        self.conn.execute(
            "INSERT INTO snapshots (key, payload, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at;",
            params![self.key.as_str(), payload.as_str()],
        )?;
        debug!(
            "event=snapshot_save module=repo status=ok key={} bytes={}",
            self.key,
            payload.len()
        );
        Ok(())
    }
}

/// In-process snapshot repository holding the serialized blob.
///
/// Goes through the same JSON envelope as the SQLite backend.
pub struct MemorySnapshotRepository<T> {
    key: String,
    payload: RefCell<Option<String>>,
    _state: PhantomData<fn() -> T>,
}

impl<T> MemorySnapshotRepository<T> {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            payload: RefCell::new(None),
            _state: PhantomData,
        }
    }

    /// Seeds the repository with a raw payload, as if written earlier.
    pub fn with_payload(key: impl Into<String>, payload: impl Into<String>) -> Self {
        let repo = Self::new(key);
        *repo.payload.borrow_mut() = Some(payload.into());
        repo
    }

    /// Raw JSON blob currently held.
    pub fn payload(&self) -> Option<String> {
        self.payload.borrow().clone()
    }
}

impl<T> SnapshotRepository<T> for MemorySnapshotRepository<T>
where
    T: Serialize + DeserializeOwned,
{
    fn load(&self) -> RepoResult<Option<T>> {
        match self.payload.borrow().as_deref() {
            Some(payload) => decode(&self.key, payload).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, state: &T) -> RepoResult<()> {
        let payload = encode(state)?;
        *self.payload.borrow_mut() = Some(payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MemorySnapshotRepository, RepoError, SnapshotRepository};

    #[test]
    fn memory_repository_wraps_state_in_versioned_envelope() {
        let repo = MemorySnapshotRepository::<Vec<u32>>::new("numbers");
        repo.save(&vec![1, 2, 3]).unwrap();
        assert_eq!(repo.payload().unwrap(), r#"{"state":[1,2,3],"version":0}"#);
        assert_eq!(repo.load().unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn newer_snapshot_version_is_rejected() {
        let repo = MemorySnapshotRepository::<Vec<u32>>::with_payload(
            "numbers",
            r#"{"state":[1],"version":7}"#,
        );
        let err = repo.load().unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(message) if message.contains("version 7")));
    }

    #[test]
    fn malformed_payload_surfaces_serialization_error() {
        let repo = MemorySnapshotRepository::<Vec<u32>>::with_payload("numbers", "not json");
        assert!(matches!(repo.load(), Err(RepoError::Serialization(_))));
    }
}
