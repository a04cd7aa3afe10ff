//! XP levels, progress math and the plain-text progress report.
//!
//! # Responsibility
//! - Map accumulated XP to a gamified level.
//! - Aggregate calendar and profile data into a `ProgressReport`.
//! - Render and export the report as a downloadable text file.
//!
//! # Invariants
//! - Percentages are rounded integers and never divide by zero.
//! - Report rendering is pure; only `export_report` touches the filesystem.

use crate::model::profile::UserProfile;
use crate::model::task::{Task, TaskStatus};
use crate::service::calendar_store::{rounded_percent, CalendarStore, DateRange};
use chrono::{Datelike, Days, NaiveDate};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter, Write as _};
use std::path::{Path, PathBuf};

/// Minimum XP for each level; index `i` is level `i + 1`.
pub const LEVEL_THRESHOLDS: [u32; 11] = [0, 100, 250, 500, 1000, 1750, 2750, 4000, 5500, 7250, 9250];

/// XP granted per activity.
pub mod xp_rewards {
    pub const TASK_COMPLETION: u32 = 25;
    pub const NOTE_UPLOAD: u32 = 15;
    pub const DAILY_LOGIN: u32 = 5;
    pub const STREAK_BONUS: u32 = 10;
    pub const QUIZ_COMPLETION: u32 = 30;
    pub const ACHIEVEMENT_UNLOCK: u32 = 50;
    pub const COMMUNITY_HELP: u32 = 20;
    pub const COURSE_COMPLETION: u32 = 100;
    pub const EXAM_COMPLETION: u32 = 150;
}

const RECENT_TASK_LIMIT: usize = 10;

/// Level reached with `xp` points, starting at 1.
pub fn calculate_level(xp: u32) -> u32 {
    let reached = LEVEL_THRESHOLDS
        .iter()
        .take_while(|threshold| xp >= **threshold)
        .count();
    u32::try_from(reached.max(1)).unwrap_or(1)
}

/// XP still missing for the next level; `0` at the top level.
pub fn xp_for_next_level(xp: u32) -> u32 {
    let level = calculate_level(xp) as usize;
    LEVEL_THRESHOLDS
        .get(level)
        .map_or(0, |next| next.saturating_sub(xp))
}

/// Rounded completion percentage; `0` when `total == 0`.
pub fn calculate_progress(completed: usize, total: usize) -> u32 {
    rounded_percent(completed as u64, total as u64)
}

/// Whole days from `today` to `target`; negative once the date passed.
pub fn days_until(target: NaiveDate, today: NaiveDate) -> i64 {
    (target - today).num_days()
}

/// Error raised while writing a report file.
#[derive(Debug)]
pub enum ReportError {
    Io { path: PathBuf, source: std::io::Error },
}

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to write report `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ReportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Progress of one course or exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectProgress {
    pub name: String,
    pub kind: &'static str,
    pub progress: u8,
    pub total_topics: usize,
    pub completed_topics: usize,
    pub days_remaining: Option<i64>,
}

/// Completed study hours on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub hours: f64,
}

/// Task line shown in the "recent tasks" section.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentTask {
    pub title: String,
    pub subject: String,
    pub status: TaskStatus,
    pub date: NaiveDate,
    pub xp_earned: Option<u32>,
}

impl From<&Task> for RecentTask {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            subject: task.subject.clone(),
            status: task.status,
            date: task.date,
            xp_earned: (task.status == TaskStatus::Completed).then_some(task.xp),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSummary {
    pub total_topics: usize,
    pub completed_topics: usize,
    pub study_hours: f64,
    pub completed_tasks: usize,
    pub missed_tasks: usize,
    pub pending_tasks: usize,
    pub overdue_tasks: usize,
}

/// Snapshot of the learner's progress at one day.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub generated_on: NaiveDate,
    pub student: String,
    pub overall_progress: u32,
    pub level: u32,
    pub profile_xp: u32,
    pub xp_to_next_level: u32,
    pub task_xp_earned: u64,
    pub streak: u32,
    pub completion_rate: u32,
    pub weekly_hours_completed: f64,
    pub weekly_hours_planned: f64,
    pub subjects: Vec<SubjectProgress>,
    pub weekly_activity: Vec<DailyActivity>,
    pub recent_tasks: Vec<RecentTask>,
    pub summary: ReportSummary,
}

impl ProgressReport {
    /// Aggregates profile and calendar data as of `today`.
    pub fn build(profile: Option<&UserProfile>, calendar: &CalendarStore, today: NaiveDate) -> Self {
        let subjects = profile.map_or_else(Vec::new, |profile| subject_progress(profile, today));
        let week_start = today.checked_sub_days(Days::new(6)).unwrap_or(today);
        let week = DateRange::new(week_start, today);

        let weekly_activity = week_start
            .iter_days()
            .take_while(|day| *day <= today)
            .map(|date| DailyActivity {
                date,
                hours: completed_hours(calendar.tasks_for_date_range(date, date)),
            })
            .collect();
        let week_tasks = calendar.tasks_for_date_range(week.start, week.end);
        let weekly_hours_planned = week_tasks
            .iter()
            .filter(|task| !task.is_reminder())
            .map(|task| task.duration)
            .sum();
        let weekly_hours_completed = completed_hours(week_tasks);

        let mut recent: Vec<&Task> = calendar
            .tasks()
            .iter()
            .filter(|task| !task.is_reminder() && task.date <= today)
            .collect();
        recent.sort_by(|a, b| b.date.cmp(&a.date));
        let recent_tasks = recent
            .into_iter()
            .take(RECENT_TASK_LIMIT)
            .map(RecentTask::from)
            .collect();

        let overall_progress = if subjects.is_empty() {
            0
        } else {
            let sum: u64 = subjects.iter().map(|s| u64::from(s.progress)).sum();
            rounded_percent(sum, subjects.len() as u64 * 100)
        };

        let summary = ReportSummary {
            total_topics: subjects.iter().map(|s| s.total_topics).sum(),
            completed_topics: subjects.iter().map(|s| s.completed_topics).sum(),
            study_hours: completed_hours(calendar.tasks().iter().collect()),
            completed_tasks: calendar.count_with_status(TaskStatus::Completed, None),
            missed_tasks: calendar.count_with_status(TaskStatus::Missed, None),
            pending_tasks: calendar.count_with_status(TaskStatus::Pending, None),
            overdue_tasks: calendar.overdue_tasks_on(today).len(),
        };

        let profile_xp = profile.map_or(0, |p| p.xp);
        Self {
            generated_on: today,
            student: profile.map_or("Student", UserProfile::display_name).to_string(),
            overall_progress,
            level: calculate_level(profile_xp),
            profile_xp,
            xp_to_next_level: xp_for_next_level(profile_xp),
            task_xp_earned: calendar.total_xp_earned(None),
            streak: profile.map_or(0, |p| p.streak),
            completion_rate: calendar.task_completion_rate(None),
            weekly_hours_completed,
            weekly_hours_planned,
            subjects,
            weekly_activity,
            recent_tasks,
            summary,
        }
    }

    /// Download file name, e.g. `neolearn-progress-report-2024-03-01.txt`.
    pub fn file_name(&self) -> String {
        report_file_name(self.generated_on)
    }

    /// Renders the report as plain text.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "NeoLearn Progress Report")?;
        writeln!(out, "Generated: {}", self.generated_on.format("%b %-d, %Y"))?;
        writeln!(out, "Student: {}", self.student)?;

        section(out, "OVERALL PROGRESS")?;
        writeln!(out, "Overall Completion: {}%", self.overall_progress)?;
        writeln!(out, "Current Streak: {} days", self.streak)?;
        writeln!(
            out,
            "Level: {} ({} XP, {} XP to next level)",
            self.level, self.profile_xp, self.xp_to_next_level
        )?;
        writeln!(out, "Task XP Earned: {}", self.task_xp_earned)?;
        writeln!(out, "Task Completion Rate: {}%", self.completion_rate)?;
        writeln!(
            out,
            "Weekly Progress: {}/{} hours ({}%)",
            self.weekly_hours_completed,
            self.weekly_hours_planned,
            percent_of(self.weekly_hours_completed, self.weekly_hours_planned)
        )?;

        section(out, "SUBJECT BREAKDOWN")?;
        if self.subjects.is_empty() {
            writeln!(out, "No courses or exams yet")?;
        }
        for subject in &self.subjects {
            write!(
                out,
                "{} [{}]: {}% ({}/{} topics",
                subject.name,
                subject.kind,
                subject.progress,
                subject.completed_topics,
                subject.total_topics
            )?;
            if let Some(days) = subject.days_remaining {
                write!(out, ", {days} days remaining")?;
            }
            writeln!(out, ")")?;
        }

        section(out, "WEEKLY ACTIVITY")?;
        for day in &self.weekly_activity {
            writeln!(out, "{}: {}h", day.date.weekday(), day.hours)?;
        }

        section(out, "RECENT TASKS")?;
        if self.recent_tasks.is_empty() {
            writeln!(out, "No tasks yet")?;
        }
        for task in &self.recent_tasks {
            write!(
                out,
                "{} ({}) - {}",
                task.title,
                task.subject,
                task.status.as_str().to_uppercase()
            )?;
            if let Some(xp) = task.xp_earned {
                write!(out, " - {xp} XP")?;
            }
            writeln!(out)?;
        }

        section(out, "SUMMARY STATISTICS")?;
        writeln!(out, "Total Topics: {}", self.summary.total_topics)?;
        writeln!(out, "Completed Topics: {}", self.summary.completed_topics)?;
        writeln!(out, "Total Study Time: {} hours", self.summary.study_hours)?;
        writeln!(out, "Completed Tasks: {}", self.summary.completed_tasks)?;
        writeln!(out, "Missed Tasks: {}", self.summary.missed_tasks)?;
        writeln!(out, "Pending Tasks: {}", self.summary.pending_tasks)?;
        writeln!(out, "Overdue Tasks: {}", self.summary.overdue_tasks)?;
        Ok(())
    }

    /// Writes the rendered report into `dir` and returns the file path.
    pub fn export_report(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ReportError> {
        let path = dir.as_ref().join(self.file_name());
        match std::fs::write(&path, self.render_text()) {
            Ok(()) => {
                info!(
                    "event=report_export module=progress status=ok path={}",
                    path.display()
                );
                Ok(path)
            }
            Err(source) => {
                error!(
                    "event=report_export module=progress status=error path={} error={}",
                    path.display(),
                    source
                );
                Err(ReportError::Io { path, source })
            }
        }
    }
}

/// File name used for the report generated on `day`.
pub fn report_file_name(day: NaiveDate) -> String {
    format!("neolearn-progress-report-{}.txt", day.format("%Y-%m-%d"))
}

fn section(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "=".repeat(title.len()))
}

fn subject_progress(profile: &UserProfile, today: NaiveDate) -> Vec<SubjectProgress> {
    let courses = profile.courses.iter().map(|course| SubjectProgress {
        name: course.name.clone(),
        kind: "Course",
        progress: course.progress.min(100),
        total_topics: course.syllabus.len(),
        completed_topics: course.completed_topics.len(),
        days_remaining: course.target_date.map(|date| days_until(date, today)),
    });
    let exams = profile.exams.iter().map(|exam| SubjectProgress {
        name: exam.name.clone(),
        kind: "Exam",
        progress: exam.progress.min(100),
        total_topics: exam.syllabus.len(),
        completed_topics: exam.completed_topics.len(),
        days_remaining: Some(days_until(exam.target_date, today)),
    });
    courses.chain(exams).collect()
}

fn completed_hours(tasks: Vec<&Task>) -> f64 {
    tasks
        .into_iter()
        .filter(|task| task.status == TaskStatus::Completed && !task.is_reminder())
        .map(|task| task.duration)
        .sum()
}

fn percent_of(part: f64, total: f64) -> u32 {
    if total <= 0.0 {
        return 0;
    }
    (part / total * 100.0).round().max(0.0) as u32
}
