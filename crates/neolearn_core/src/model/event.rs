//! Calendar event domain model.
//!
//! # Responsibility
//! - Define calendar markers for course due dates, exams and reminders.
//!
//! # Invariants
//! - At most one derived event exists per `(course_id | exam_id, date)`;
//!   the store checks this before insertion.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable event identifier.
pub type EventId = String;

/// Calendar marker category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Course,
    Exam,
    Reminder,
}

impl EventKind {
    /// Ordering rank used when listing events for one day.
    ///
    /// `exam < course < reminder`.
    pub fn sort_rank(self) -> u8 {
        match self {
            Self::Exam => 0,
            Self::Course => 1,
            Self::Reminder => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: EventId,
    pub title: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CalendarEvent {
    /// Materializes a create request, generating an id when none is given.
    pub fn from_new(new_event: NewEvent) -> Self {
        Self {
            id: new_event
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: new_event.title,
            date: new_event.date,
            kind: new_event.kind,
            course_id: new_event.course_id,
            exam_id: new_event.exam_id,
            due_date: new_event.due_date,
            description: new_event.description,
        }
    }

    /// Returns whether this event was generated from a course or exam.
    pub fn is_derived(&self) -> bool {
        self.course_id.is_some() || self.exam_id.is_some()
    }
}

/// Create request for an event.
///
/// `id` is optional: derived events carry a deterministic id
/// (`course-{id}` / `exam-{id}`), user reminders get a generated one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub id: Option<EventId>,
    pub title: String,
    pub date: NaiveDate,
    pub kind: EventKind,
    pub course_id: Option<String>,
    pub exam_id: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl NewEvent {
    /// User-entered reminder marker.
    pub fn reminder(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: None,
            title: title.into(),
            date,
            kind: EventKind::Reminder,
            course_id: None,
            exam_id: None,
            due_date: None,
            description: None,
        }
    }

    /// Due-date marker derived from a course.
    pub fn for_course(course_id: &str, course_name: &str, date: NaiveDate) -> Self {
        Self {
            id: Some(format!("course-{course_id}")),
            title: format!("{course_name} - Course Due"),
            date,
            kind: EventKind::Course,
            course_id: Some(course_id.to_string()),
            exam_id: None,
            due_date: Some(date),
            description: None,
        }
    }

    /// Exam-day marker derived from an exam.
    pub fn for_exam(exam_id: &str, exam_name: &str, date: NaiveDate) -> Self {
        Self {
            id: Some(format!("exam-{exam_id}")),
            title: format!("{exam_name} - Exam"),
            date,
            kind: EventKind::Exam,
            course_id: None,
            exam_id: Some(exam_id.to_string()),
            due_date: Some(date),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update merged into an existing event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub kind: Option<EventKind>,
    pub course_id: Option<String>,
    pub exam_id: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl EventPatch {
    pub fn apply_to(&self, event: &mut CalendarEvent) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(kind) = self.kind {
            event.kind = kind;
        }
        if let Some(course_id) = &self.course_id {
            event.course_id = Some(course_id.clone());
        }
        if let Some(exam_id) = &self.exam_id {
            event.exam_id = Some(exam_id.clone());
        }
        if let Some(due_date) = self.due_date {
            event.due_date = Some(due_date);
        }
        if let Some(description) = &self.description {
            event.description = Some(description.clone());
        }
    }
}
