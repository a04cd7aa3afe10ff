//! Application session wiring the stores to persisted snapshots.
//!
//! # Responsibility
//! - Rehydrate auth, calendar and accessibility stores on startup.
//! - Save all snapshots at explicit lifecycle points.
//! - Run use-cases that span more than one store.
//!
//! # Invariants
//! - `save` writes the three snapshots in one SQLite transaction.
//! - Stores never persist themselves; only the session calls `save_to`.

use crate::model::accessibility::AccessibilitySettings;
use crate::model::task::TaskStatus;
use crate::repo::snapshot_repo::{
    RepoResult, SqliteSnapshotRepository, ACCESSIBILITY_STORAGE_KEY, AUTH_STORAGE_KEY,
    CALENDAR_STORAGE_KEY,
};
use crate::service::accessibility_store::{AccessibilityStore, SpeechSynthesizer};
use crate::service::assistant::AssistantService;
use crate::service::auth_store::{AuthBackend, AuthResult, AuthState, AuthStore};
use crate::service::calendar_store::{CalendarState, CalendarStore};
use crate::service::progress::ProgressReport;
use chrono::NaiveDate;
use log::info;
use rusqlite::Connection;

/// All stores of one running application instance.
pub struct Session<B: AuthBackend, S: SpeechSynthesizer> {
    pub auth: AuthStore<B>,
    pub calendar: CalendarStore,
    pub accessibility: AccessibilityStore<S>,
    assistant: AssistantService,
}

impl<B: AuthBackend, S: SpeechSynthesizer> Session<B, S> {
    /// Session with empty stores.
    pub fn new(backend: B, synthesizer: S) -> Self {
        Self {
            auth: AuthStore::new(backend),
            calendar: CalendarStore::new(),
            accessibility: AccessibilityStore::new(synthesizer),
            assistant: AssistantService::new(),
        }
    }

    /// Rehydrates every store from the snapshot table.
    pub fn load(conn: &Connection, backend: B, synthesizer: S) -> RepoResult<Self> {
        let auth = AuthStore::load_from(
            backend,
            &SqliteSnapshotRepository::<AuthState>::new(conn, AUTH_STORAGE_KEY),
        )?;
        let calendar = CalendarStore::load_from(&SqliteSnapshotRepository::<CalendarState>::new(
            conn,
            CALENDAR_STORAGE_KEY,
        ))?;
        let accessibility = AccessibilityStore::load_from(
            synthesizer,
            &SqliteSnapshotRepository::<AccessibilitySettings>::new(
                conn,
                ACCESSIBILITY_STORAGE_KEY,
            ),
        )?;

        info!(
            "event=session_load module=session status=ok signed_in={}",
            auth.is_signed_in()
        );
        Ok(Self {
            auth,
            calendar,
            accessibility,
            assistant: AssistantService::new(),
        })
    }

    /// Persists every store.
    pub fn save(&self, conn: &Connection) -> RepoResult<()> {
        let tx = conn.unchecked_transaction()?;
        self.auth
            .save_to(&SqliteSnapshotRepository::<AuthState>::new(&tx, AUTH_STORAGE_KEY))?;
        self.calendar
            .save_to(&SqliteSnapshotRepository::<CalendarState>::new(
                &tx,
                CALENDAR_STORAGE_KEY,
            ))?;
        self.accessibility
            .save_to(&SqliteSnapshotRepository::<AccessibilitySettings>::new(
                &tx,
                ACCESSIBILITY_STORAGE_KEY,
            ))?;
        tx.commit()?;
        info!("event=session_save module=session status=ok");
        Ok(())
    }

    /// Adds calendar markers for the signed-in user's courses and exams.
    pub fn sync_derived_events(&mut self) -> usize {
        self.calendar
            .sync_derived_events(self.auth.courses(), self.auth.exams())
    }

    /// Marks a task completed and credits its XP to the profile.
    ///
    /// XP is credited only on the transition into `completed`, and before
    /// the status changes: a failed profile write leaves the task as it was.
    /// Returns `Ok(false)` when the task does not exist.
    pub fn complete_task(&mut self, task_id: &str) -> AuthResult<bool> {
        let Some(task) = self.calendar.task(task_id) else {
            return Ok(false);
        };
        let already_completed = task.status == TaskStatus::Completed;
        let xp = task.xp;

        if !already_completed && xp > 0 {
            self.auth.add_xp(xp)?;
        }
        self.calendar
            .update_task_status(task_id, TaskStatus::Completed);
        Ok(true)
    }

    /// Builds the progress report as of `today`.
    pub fn progress_report(&self, today: NaiveDate) -> ProgressReport {
        ProgressReport::build(self.auth.user(), &self.calendar, today)
    }

    /// Answers an assistant message and reads the reply aloud if TTS is on.
    pub fn ask_assistant(&self, message: &str) -> String {
        let reply = self.assistant.reply(message, self.auth.user());
        self.accessibility.speak(&reply);
        reply
    }
}
