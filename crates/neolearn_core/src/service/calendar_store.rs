//! Task and calendar event store.
//!
//! # Responsibility
//! - Hold the learner's tasks and calendar events in memory.
//! - Answer day, range and "relative to today" queries.
//! - Derive completion statistics (counts, XP, completion rate).
//!
//! # Invariants
//! - Mutations never fail; unknown ids are ignored and reported as `false`.
//! - `add_event` never inserts a second event with the same id or the same
//!   `(course_id, exam_id, date)` key.
//! - Listing order is stable for records with equal sort rank.

use crate::model::event::{CalendarEvent, EventId, EventPatch, NewEvent};
use crate::model::profile::{Course, Exam};
use crate::model::task::{NewTask, Task, TaskId, TaskPatch, TaskStatus};
use crate::repo::snapshot_repo::{RepoResult, SnapshotRepository};
use chrono::{Days, Local, NaiveDate, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Persisted shape of the calendar store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarState {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
}

/// Inclusive calendar-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Range covering exactly one day.
    pub fn day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    /// `true` when `date` lies in `[start, end]`. Empty when `start > end`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Today's date in the local time zone.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// In-memory task/event store.
#[derive(Debug, Clone, Default)]
pub struct CalendarStore {
    state: CalendarState,
}

impl CalendarStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from previously captured state.
    pub fn with_state(state: CalendarState) -> Self {
        Self { state }
    }

    /// Rehydrates from `repo`, falling back to an empty store.
    pub fn load_from<R: SnapshotRepository<CalendarState>>(repo: &R) -> RepoResult<Self> {
        let state = repo.load()?.unwrap_or_default();
        info!(
            "event=calendar_load module=calendar status=ok tasks={} events={}",
            state.tasks.len(),
            state.events.len()
        );
        Ok(Self::with_state(state))
    }

    /// Writes the whole current state to `repo`.
    pub fn save_to<R: SnapshotRepository<CalendarState>>(&self, repo: &R) -> RepoResult<()> {
        repo.save(&self.state)
    }

    pub fn state(&self) -> &CalendarState {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.state.events
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.state.tasks.iter().find(|task| task.id == id)
    }

    pub fn event(&self, id: &str) -> Option<&CalendarEvent> {
        self.state.events.iter().find(|event| event.id == id)
    }

    // -- task mutations --

    /// Appends a task with a generated id and fresh timestamps.
    ///
    /// Field values are stored as given.
    pub fn add_task(&mut self, new_task: NewTask) -> TaskId {
        let task = Task::from_new(new_task, Utc::now());
        let id = task.id.clone();
        debug!(
            "event=task_add module=calendar status=ok task_id={} date={}",
            id, task.date
        );
        self.state.tasks.push(task);
        id
    }

    /// Merges `patch` into the task and refreshes `updated_at`.
    ///
    /// Returns `false` when no task has `id`.
    pub fn update_task(&mut self, id: &str, patch: &TaskPatch) -> bool {
        match self.task_mut(id) {
            Some(task) => {
                patch.apply_to(task);
                task.updated_at = Utc::now();
                true
            }
            None => {
                debug!("event=task_update module=calendar status=skipped task_id={id}");
                false
            }
        }
    }

    /// Sets the status of one task. Any status may follow any other.
    pub fn update_task_status(&mut self, id: &str, status: TaskStatus) -> bool {
        self.update_task(
            id,
            &TaskPatch {
                status: Some(status),
                ..TaskPatch::default()
            },
        )
    }

    /// Removes the task with `id`. Returns whether something was removed.
    pub fn delete_task(&mut self, id: &str) -> bool {
        let before = self.state.tasks.len();
        self.state.tasks.retain(|task| task.id != id);
        before != self.state.tasks.len()
    }

    fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.state.tasks.iter_mut().find(|task| task.id == id)
    }

    // -- event mutations --

    /// Appends an event unless an equivalent one already exists.
    ///
    /// An event is equivalent when it shares the requested id or the same
    /// `(course_id, exam_id, date)` key. Two plain reminders on one day
    /// share the `(None, None, date)` key.
    /// Returns the stored id, or `None` when insertion was skipped.
    pub fn add_event(&mut self, new_event: NewEvent) -> Option<EventId> {
        if let Some(existing) = self.find_equivalent_event(&new_event) {
            debug!(
                "event=event_add module=calendar status=skipped existing_id={}",
                existing.id
            );
            return None;
        }

        let event = CalendarEvent::from_new(new_event);
        let id = event.id.clone();
        self.state.events.push(event);
        Some(id)
    }

    fn find_equivalent_event(&self, new_event: &NewEvent) -> Option<&CalendarEvent> {
        self.state.events.iter().find(|event| {
            let same_id = new_event
                .id
                .as_deref()
                .is_some_and(|id| id == event.id);
            let same_source = event.course_id == new_event.course_id
                && event.exam_id == new_event.exam_id
                && event.date == new_event.date;
            same_id || same_source
        })
    }

    /// Merges `patch` into the event with `id`.
    pub fn update_event(&mut self, id: &str, patch: &EventPatch) -> bool {
        match self.state.events.iter_mut().find(|event| event.id == id) {
            Some(event) => {
                patch.apply_to(event);
                true
            }
            None => false,
        }
    }

    pub fn delete_event(&mut self, id: &str) -> bool {
        let before = self.state.events.len();
        self.state.events.retain(|event| event.id != id);
        before != self.state.events.len()
    }

    /// Creates due-date events for courses with a target date and for every
    /// exam. Existing markers are left untouched.
    ///
    /// Returns the number of newly inserted events.
    pub fn sync_derived_events(&mut self, courses: &[Course], exams: &[Exam]) -> usize {
        let course_events = courses.iter().filter_map(|course| {
            course
                .target_date
                .map(|date| NewEvent::for_course(&course.id, &course.name, date))
        });
        let exam_events = exams
            .iter()
            .map(|exam| NewEvent::for_exam(&exam.id, &exam.name, exam.target_date));

        let inserted = course_events
            .chain(exam_events)
            .filter_map(|event| self.add_event(event))
            .count();

        if inserted > 0 {
            info!("event=derived_events_sync module=calendar status=ok inserted={inserted}");
        }
        inserted
    }

    // -- queries --

    /// Tasks planned for `date`: pending, in-progress, completed, missed.
    pub fn tasks_for_date(&self, date: NaiveDate) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .state
            .tasks
            .iter()
            .filter(|task| task.date == date)
            .collect();
        tasks.sort_by_key(|task| task.status.sort_rank());
        tasks
    }

    /// Events on `date`: exams, courses, reminders.
    pub fn events_for_date(&self, date: NaiveDate) -> Vec<&CalendarEvent> {
        let mut events: Vec<&CalendarEvent> = self
            .state
            .events
            .iter()
            .filter(|event| event.date == date)
            .collect();
        events.sort_by_key(|event| event.kind.sort_rank());
        events
    }

    /// Tasks whose date lies in `[start, end]`, in insertion order.
    pub fn tasks_for_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<&Task> {
        let range = DateRange::new(start, end);
        self.state
            .tasks
            .iter()
            .filter(|task| range.contains(task.date))
            .collect()
    }

    /// Pending tasks due within the next `days` days, counting today.
    pub fn upcoming_tasks(&self, days: u32) -> Vec<&Task> {
        self.upcoming_tasks_on(local_today(), days)
    }

    /// Pending tasks in `[today, today + days]`, ascending by date.
    pub fn upcoming_tasks_on(&self, today: NaiveDate, days: u32) -> Vec<&Task> {
        let horizon = today
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MAX);
        let range = DateRange::new(today, horizon);
        let mut tasks: Vec<&Task> = self
            .state
            .tasks
            .iter()
            .filter(|task| task.status == TaskStatus::Pending && range.contains(task.date))
            .collect();
        tasks.sort_by_key(|task| task.date);
        tasks
    }

    /// Pending tasks dated before today.
    pub fn overdue_tasks(&self) -> Vec<&Task> {
        self.overdue_tasks_on(local_today())
    }

    /// Pending tasks dated strictly before `today`.
    pub fn overdue_tasks_on(&self, today: NaiveDate) -> Vec<&Task> {
        self.state
            .tasks
            .iter()
            .filter(|task| task.status == TaskStatus::Pending && task.date < today)
            .collect()
    }

    // -- statistics --

    fn tasks_in(&self, range: Option<DateRange>) -> impl Iterator<Item = &Task> {
        self.state
            .tasks
            .iter()
            .filter(move |task| range.map_or(true, |range| range.contains(task.date)))
    }

    /// Completed tasks, optionally restricted to `range`.
    pub fn completed_tasks_count(&self, range: Option<DateRange>) -> usize {
        self.tasks_in(range)
            .filter(|task| task.status == TaskStatus::Completed)
            .count()
    }

    /// Sum of XP over completed tasks, optionally restricted to `range`.
    pub fn total_xp_earned(&self, range: Option<DateRange>) -> u64 {
        self.tasks_in(range)
            .filter(|task| task.status == TaskStatus::Completed)
            .map(|task| u64::from(task.xp))
            .sum()
    }

    /// Tasks with `status`, optionally restricted to `range`.
    pub fn count_with_status(&self, status: TaskStatus, range: Option<DateRange>) -> usize {
        self.tasks_in(range)
            .filter(|task| task.status == status)
            .count()
    }

    /// Completed share of tasks as a rounded percentage.
    ///
    /// Returns `0` when no task falls in `range`.
    pub fn task_completion_rate(&self, range: Option<DateRange>) -> u32 {
        let (total, completed) = self.tasks_in(range).fold((0u64, 0u64), |(total, done), task| {
            let done = done + u64::from(task.status == TaskStatus::Completed);
            (total + 1, done)
        });
        rounded_percent(completed, total)
    }
}

/// `round(part / total * 100)` with halves rounded up; `0` when `total == 0`.
pub(crate) fn rounded_percent(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let scaled = (part * 200 + total) / (total * 2);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{rounded_percent, DateRange};
    use chrono::NaiveDate;

    #[test]
    fn rounded_percent_matches_half_up_rounding() {
        assert_eq!(rounded_percent(0, 0), 0);
        assert_eq!(rounded_percent(1, 3), 33);
        assert_eq!(rounded_percent(2, 3), 67);
        assert_eq!(rounded_percent(1, 8), 13);
        assert_eq!(rounded_percent(5, 5), 100);
    }

    #[test]
    fn inverted_range_is_empty() {
        let a = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert!(DateRange::new(a, b).contains(a));
        assert!(!DateRange::new(b, a).contains(a));
    }
}
