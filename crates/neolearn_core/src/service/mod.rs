//! Core use-case services and stores.
//!
//! # Responsibility
//! - Hold in-memory store state and the mutations/queries over it.
//! - Keep persistence behind `SnapshotRepository` so stores stay
//!   storage-agnostic.

pub mod accessibility_store;
pub mod assistant;
pub mod auth_store;
pub mod calendar_store;
pub mod progress;
pub mod session;
pub mod validation;
