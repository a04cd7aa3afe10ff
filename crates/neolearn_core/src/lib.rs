//! Core study-planning logic for NeoLearn.
//! This crate owns task/calendar state, the learner profile, accessibility
//! preferences and their persisted snapshots.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::accessibility::{AccessibilitySettings, FontSize};
pub use model::event::{CalendarEvent, EventId, EventKind, EventPatch, NewEvent};
pub use model::profile::{
    Course, DisabilityType, Exam, Preferences, ProfilePatch, UserProfile,
};
pub use model::task::{NewTask, Task, TaskId, TaskKind, TaskPatch, TaskStatus};
pub use repo::snapshot_repo::{
    MemorySnapshotRepository, RepoError, RepoResult, SnapshotRepository,
    SqliteSnapshotRepository, ACCESSIBILITY_STORAGE_KEY, AUTH_STORAGE_KEY, CALENDAR_STORAGE_KEY,
};
pub use service::accessibility_store::{AccessibilityStore, LogSynthesizer, SpeechSynthesizer};
pub use service::assistant::{AssistantService, AssistantTopic};
pub use service::auth_store::{
    AccountIdentity, AuthBackend, AuthError, AuthResult, AuthState, AuthStore, BackendError,
    LocalAuthBackend, RegisterPayload,
};
pub use service::calendar_store::{CalendarState, CalendarStore, DateRange};
pub use service::progress::{
    calculate_level, calculate_progress, days_until, xp_for_next_level, ProgressReport,
    ReportError,
};
pub use service::session::Session;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
