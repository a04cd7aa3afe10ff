//! Domain model for study planning state.
//!
//! # Responsibility
//! - Define canonical records shared by the calendar, profile and
//!   accessibility stores.
//! - Keep the persisted JSON field naming (`camelCase`) in one place.
//!
//! # Invariants
//! - Task and event ids are unique within their owning store.
//! - Calendar days are plain dates; only reminders carry a time of day.

pub mod accessibility;
pub mod event;
pub mod profile;
pub mod task;
