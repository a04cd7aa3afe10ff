use chrono::{Days, NaiveDate, NaiveTime};
use neolearn_core::{
    CalendarStore, DateRange, NewTask, TaskKind, TaskPatch, TaskStatus,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn study(title: &str, date: NaiveDate) -> NewTask {
    NewTask::new(title, "Math", date, TaskKind::Study)
}

#[test]
fn added_task_is_listed_once_for_its_date() {
    let mut store = CalendarStore::new();
    let date = day(2024, 3, 1);
    let id = store.add_task(study("Review", date).with_duration(1.0).with_xp(25));
    store.add_task(study("Other day", day(2024, 3, 2)));

    let tasks = store.tasks_for_date(date);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, id);
    assert_eq!(tasks[0].title, "Review");
    assert_eq!(tasks[0].created_at, tasks[0].updated_at);
}

#[test]
fn generated_ids_are_unique() {
    let mut store = CalendarStore::new();
    let date = day(2024, 3, 1);
    let first = store.add_task(study("A", date));
    let second = store.add_task(study("A", date));
    assert_ne!(first, second);
    assert_eq!(store.tasks().len(), 2);
}

#[test]
fn completing_task_counts_its_xp_in_range() {
    let mut store = CalendarStore::new();
    let date = day(2024, 3, 1);
    let id = store.add_task(
        NewTask::new("Review", "Math", date, TaskKind::Study)
            .with_duration(1.0)
            .with_xp(25),
    );

    assert_eq!(store.total_xp_earned(Some(DateRange::day(date))), 0);
    assert!(store.update_task_status(&id, TaskStatus::Completed));
    assert_eq!(store.total_xp_earned(Some(DateRange::day(date))), 25);
    assert_eq!(store.completed_tasks_count(Some(DateRange::day(date))), 1);
}

#[test]
fn tasks_for_date_sorts_by_status_priority_keeping_insertion_order() {
    let mut store = CalendarStore::new();
    let date = day(2024, 3, 1);
    store.add_task(study("missed", date).with_status(TaskStatus::Missed));
    store.add_task(study("done", date).with_status(TaskStatus::Completed));
    store.add_task(study("pending-1", date));
    store.add_task(study("doing", date).with_status(TaskStatus::InProgress));
    store.add_task(study("pending-2", date));

    let titles: Vec<&str> = store
        .tasks_for_date(date)
        .iter()
        .map(|task| task.title.as_str())
        .collect();
    assert_eq!(titles, ["pending-1", "pending-2", "doing", "done", "missed"]);
}

#[test]
fn unknown_ids_are_ignored() {
    let mut store = CalendarStore::new();
    store.add_task(study("keep", day(2024, 3, 1)));
    let before = store.tasks().to_vec();

    assert!(!store.delete_task("missing"));
    assert!(!store.update_task_status("missing", TaskStatus::Completed));
    assert!(!store.update_task("missing", &TaskPatch::default()));
    assert_eq!(store.tasks(), before.as_slice());
}

#[test]
fn update_task_merges_fields_and_refreshes_updated_at() {
    let mut store = CalendarStore::new();
    let id = store.add_task(study("Review", day(2024, 3, 1)));
    let created = store.task(&id).unwrap().updated_at;

    let patch = TaskPatch {
        title: Some("Review chapter 4".to_string()),
        date: Some(day(2024, 3, 4)),
        duration: Some(-2.0),
        ..TaskPatch::default()
    };
    assert!(store.update_task(&id, &patch));

    let task = store.task(&id).unwrap();
    assert_eq!(task.title, "Review chapter 4");
    assert_eq!(task.subject, "Math");
    assert_eq!(task.date, day(2024, 3, 4));
    assert_eq!(task.duration, -2.0);
    assert!(task.updated_at >= created);
    assert!(store.tasks_for_date(day(2024, 3, 1)).is_empty());
}

#[test]
fn status_may_move_backwards() {
    let mut store = CalendarStore::new();
    let id = store.add_task(study("Review", day(2024, 3, 1)));
    store.update_task_status(&id, TaskStatus::Missed);
    store.update_task_status(&id, TaskStatus::Pending);
    assert_eq!(store.task(&id).unwrap().status, TaskStatus::Pending);
}

#[test]
fn delete_removes_only_matching_task() {
    let mut store = CalendarStore::new();
    let date = day(2024, 3, 1);
    let gone = store.add_task(study("gone", date));
    store.add_task(study("stays", date));

    assert!(store.delete_task(&gone));
    let tasks = store.tasks_for_date(date);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "stays");
}

#[test]
fn date_range_is_inclusive() {
    let mut store = CalendarStore::new();
    store.add_task(study("before", day(2024, 2, 29)));
    store.add_task(study("start", day(2024, 3, 1)));
    store.add_task(study("end", day(2024, 3, 7)));
    store.add_task(study("after", day(2024, 3, 8)));

    let titles: Vec<&str> = store
        .tasks_for_date_range(day(2024, 3, 1), day(2024, 3, 7))
        .iter()
        .map(|task| task.title.as_str())
        .collect();
    assert_eq!(titles, ["start", "end"]);
}

#[test]
fn upcoming_tasks_are_pending_within_horizon_sorted_by_date() {
    let mut store = CalendarStore::new();
    let today = day(2024, 3, 10);
    store.add_task(study("in five", today + Days::new(5)));
    store.add_task(study("today", today));
    store.add_task(study("edge", today + Days::new(7)));
    store.add_task(study("too far", today + Days::new(8)));
    store.add_task(study("yesterday", today - Days::new(1)));
    store.add_task(study("done", today + Days::new(1)).with_status(TaskStatus::Completed));

    let titles: Vec<&str> = store
        .upcoming_tasks_on(today, 7)
        .iter()
        .map(|task| task.title.as_str())
        .collect();
    assert_eq!(titles, ["today", "in five", "edge"]);
}

#[test]
fn overdue_tasks_are_pending_and_strictly_before_today() {
    let mut store = CalendarStore::new();
    let today = day(2024, 3, 10);
    store.add_task(study("late", today - Days::new(3)));
    store.add_task(study("due today", today));
    store.add_task(study("future", today + Days::new(1)));
    store.add_task(study("late but done", today - Days::new(2)).with_status(TaskStatus::Completed));
    store.add_task(study("late and missed", today - Days::new(2)).with_status(TaskStatus::Missed));

    let overdue = store.overdue_tasks_on(today);
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].title, "late");
    assert!(overdue
        .iter()
        .all(|task| task.date < today && task.status == TaskStatus::Pending));
}

#[test]
fn completion_rate_is_zero_for_empty_range_and_rounded_otherwise() {
    let mut store = CalendarStore::new();
    let empty = DateRange::new(day(2030, 1, 1), day(2030, 1, 31));
    assert_eq!(store.task_completion_rate(None), 0);
    assert_eq!(store.task_completion_rate(Some(empty)), 0);

    let date = day(2024, 3, 1);
    let a = store.add_task(study("a", date));
    store.add_task(study("b", date));
    store.add_task(study("c", date));
    store.update_task_status(&a, TaskStatus::Completed);

    assert_eq!(store.task_completion_rate(Some(DateRange::day(date))), 33);
    assert_eq!(store.task_completion_rate(Some(empty)), 0);
}

#[test]
fn statistics_without_range_cover_all_tasks() {
    let mut store = CalendarStore::new();
    store.add_task(study("a", day(2024, 1, 1)).with_xp(10).with_status(TaskStatus::Completed));
    store.add_task(study("b", day(2024, 6, 1)).with_xp(30).with_status(TaskStatus::Completed));
    store.add_task(study("c", day(2024, 6, 2)).with_xp(99));

    assert_eq!(store.completed_tasks_count(None), 2);
    assert_eq!(store.total_xp_earned(None), 40);
    assert_eq!(store.task_completion_rate(None), 67);
    assert_eq!(store.count_with_status(TaskStatus::Pending, None), 1);
}

#[test]
fn reminders_keep_time_of_day() {
    let mut store = CalendarStore::new();
    let time = NaiveTime::from_hms_opt(18, 45, 0).unwrap();
    let id = store.add_task(NewTask::reminder("Submit form", day(2024, 3, 1), time));

    let task = store.task(&id).unwrap();
    assert!(task.is_reminder());
    assert_eq!(task.reminder_time, Some(time));
    assert_eq!(task.kind, TaskKind::Reminder);
}
