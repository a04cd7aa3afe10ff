//! Task domain model.
//!
//! # Responsibility
//! - Define the planned study item shown on calendar days.
//! - Provide create/patch request shapes used by `CalendarStore`.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused.
//! - `status` is an open field: any value may follow any other.
//! - No field validation happens here; negative or empty values are kept.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable task identifier.
pub type TaskId = String;

/// Task progress label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Missed,
}

impl TaskStatus {
    /// Ordering rank used when listing tasks for one day.
    ///
    /// `pending < in-progress < completed < missed`.
    pub fn sort_rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
            Self::Missed => 3,
        }
    }

    /// Returns the persisted label (`in-progress`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Missed => "missed",
        }
    }
}

/// Kind of study activity a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Study,
    Practice,
    Revision,
    Exam,
    Reminder,
}

/// Planned study item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub subject: String,
    /// Calendar day the task is planned for.
    pub date: NaiveDate,
    /// Planned effort in hours.
    pub duration: f64,
    /// Reward granted when the task is completed. Never negative; a
    /// persisted negative value fails to load.
    pub xp: u32,
    pub status: TaskStatus,
    /// Serialized as `type` to match the persisted blob naming.
    #[serde(rename = "type")]
    pub kind: TaskKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_reminder: Option<bool>,
    /// Time of day; meaningful only for reminders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Materializes a create request with a generated id and timestamps.
    pub fn from_new(new_task: NewTask, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: new_task.title,
            subject: new_task.subject,
            date: new_task.date,
            duration: new_task.duration,
            xp: new_task.xp,
            status: new_task.status,
            kind: new_task.kind,
            goal_id: new_task.goal_id,
            is_reminder: new_task.is_reminder,
            reminder_time: new_task.reminder_time,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns whether this task was entered as a reminder.
    pub fn is_reminder(&self) -> bool {
        self.is_reminder.unwrap_or(false) || self.kind == TaskKind::Reminder
    }
}

/// Create request for a task; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub subject: String,
    pub date: NaiveDate,
    pub duration: f64,
    pub xp: u32,
    pub status: TaskStatus,
    pub kind: TaskKind,
    pub goal_id: Option<String>,
    pub is_reminder: Option<bool>,
    pub reminder_time: Option<NaiveTime>,
}

impl NewTask {
    /// Pending task with no goal or reminder metadata.
    pub fn new(
        title: impl Into<String>,
        subject: impl Into<String>,
        date: NaiveDate,
        kind: TaskKind,
    ) -> Self {
        Self {
            title: title.into(),
            subject: subject.into(),
            date,
            duration: 0.0,
            xp: 0,
            status: TaskStatus::Pending,
            kind,
            goal_id: None,
            is_reminder: None,
            reminder_time: None,
        }
    }

    /// Reminder variant: no duration or XP, carries a time of day.
    pub fn reminder(title: impl Into<String>, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            is_reminder: Some(true),
            reminder_time: Some(time),
            ..Self::new(title, "Reminder", date, TaskKind::Reminder)
        }
    }

    pub fn with_duration(mut self, hours: f64) -> Self {
        self.duration = hours;
        self
    }

    pub fn with_xp(mut self, xp: u32) -> Self {
        self.xp = xp;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_goal(mut self, goal_id: impl Into<String>) -> Self {
        self.goal_id = Some(goal_id.into());
        self
    }
}

/// Partial update merged into an existing task.
///
/// `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub date: Option<NaiveDate>,
    pub duration: Option<f64>,
    pub xp: Option<u32>,
    pub status: Option<TaskStatus>,
    pub kind: Option<TaskKind>,
    pub goal_id: Option<String>,
    pub is_reminder: Option<bool>,
    pub reminder_time: Option<NaiveTime>,
}

impl TaskPatch {
    /// Merges set fields into `task`. Does not touch timestamps.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(subject) = &self.subject {
            task.subject = subject.clone();
        }
        if let Some(date) = self.date {
            task.date = date;
        }
        if let Some(duration) = self.duration {
            task.duration = duration;
        }
        if let Some(xp) = self.xp {
            task.xp = xp;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(kind) = self.kind {
            task.kind = kind;
        }
        if let Some(goal_id) = &self.goal_id {
            task.goal_id = Some(goal_id.clone());
        }
        if let Some(is_reminder) = self.is_reminder {
            task.is_reminder = Some(is_reminder);
        }
        if let Some(time) = self.reminder_time {
            task.reminder_time = Some(time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NewTask, Task, TaskKind, TaskPatch, TaskStatus};
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn status_serializes_with_kebab_case_labels() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        assert_eq!(TaskStatus::InProgress.as_str(), "in-progress");
    }

    #[test]
    fn task_json_uses_persisted_field_names() {
        let task = Task::from_new(
            NewTask::new("Review", "Math", day(2024, 3, 1), TaskKind::Study).with_xp(25),
            Utc::now(),
        );
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["type"], "study");
        assert_eq!(value["date"], "2024-03-01");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("goalId").is_none());
    }

    #[test]
    fn reminder_request_marks_reminder_fields() {
        let time = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        let task = Task::from_new(NewTask::reminder("Call tutor", day(2024, 3, 2), time), Utc::now());
        assert!(task.is_reminder());
        assert_eq!(task.reminder_time, Some(time));
        assert_eq!(task.xp, 0);
    }

    #[test]
    fn patch_only_touches_set_fields() {
        let mut task = Task::from_new(
            NewTask::new("Review", "Math", day(2024, 3, 1), TaskKind::Study),
            Utc::now(),
        );
        let patch = TaskPatch {
            title: Some("Review ch. 2".to_string()),
            duration: Some(-1.0),
            ..TaskPatch::default()
        };
        patch.apply_to(&mut task);
        assert_eq!(task.title, "Review ch. 2");
        assert_eq!(task.subject, "Math");
        assert_eq!(task.duration, -1.0);
    }

    #[test]
    fn negative_xp_in_persisted_task_is_rejected() {
        let task = Task::from_new(
            NewTask::new("Review", "Math", day(2024, 3, 1), TaskKind::Study),
            Utc::now(),
        );
        let mut value = serde_json::to_value(&task).unwrap();
        value["xp"] = serde_json::json!(-5);
        assert!(serde_json::from_value::<Task>(value).is_err());
    }
}
