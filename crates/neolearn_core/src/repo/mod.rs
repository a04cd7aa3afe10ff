//! Repository layer for persisted store snapshots.
//!
//! # Responsibility
//! - Define the `load()`/`save()` contract stores are persisted through.
//! - Isolate SQLite and JSON details from store business logic.
//!
//! # Invariants
//! - Snapshots are whole-state blobs; there is no partial write API.
//! - Read paths reject snapshots written by a newer format version.

pub mod snapshot_repo;
