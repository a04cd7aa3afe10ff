//! CLI entry point for inspecting a local NeoLearn database.
//!
//! # Usage
//! `neolearn_cli [DB_PATH [REPORT_DIR]]`
//!
//! - Without arguments prints the core version.
//! - With `DB_PATH` loads the persisted stores and prints today's agenda.
//! - With `REPORT_DIR` also exports the plain-text progress report.
//!
//! Logging is enabled when `NEOLEARN_LOG_DIR` is set; the level comes from
//! `NEOLEARN_LOG_LEVEL` or the build-mode default.

use neolearn_core::db::open_db;
use neolearn_core::service::calendar_store::local_today;
use neolearn_core::{
    core_version, default_log_level, init_logging, DateRange, LocalAuthBackend, LogSynthesizer,
    Session,
};
use std::error::Error;
use std::process::ExitCode;

const UPCOMING_DAYS: u32 = 7;

fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var("NEOLEARN_LOG_DIR") {
        let level = std::env::var("NEOLEARN_LOG_LEVEL")
            .unwrap_or_else(|_| default_log_level().to_string());
        if let Err(err) = init_logging(&level, &log_dir) {
            eprintln!("warning: {err}");
        }
    }

    println!("neolearn_core version={}", core_version());

    let mut args = std::env::args().skip(1);
    let Some(db_path) = args.next() else {
        return ExitCode::SUCCESS;
    };
    let report_dir = args.next();

    match run(&db_path, report_dir.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: &str, report_dir: Option<&str>) -> Result<(), Box<dyn Error>> {
    let conn = open_db(db_path)?;
    let mut session = Session::load(&conn, LocalAuthBackend::new(), LogSynthesizer)?;
    let today = local_today();

    let inserted = session.sync_derived_events();
    match session.auth.user() {
        Some(user) => println!(
            "user={} level={} xp={} streak={}",
            user.display_name(),
            user.level,
            user.xp,
            user.streak
        ),
        None => println!("user=<signed out>"),
    }
    if inserted > 0 {
        println!("derived_events_added={inserted}");
    }

    println!("today={today}");
    for event in session.calendar.events_for_date(today) {
        println!("  [{:?}] {}", event.kind, event.title);
    }
    for task in session.calendar.tasks_for_date(today) {
        println!(
            "  {} ({}) - {} - {}h",
            task.title,
            task.subject,
            task.status.as_str(),
            task.duration
        );
    }

    let upcoming = session.calendar.upcoming_tasks_on(today, UPCOMING_DAYS);
    let overdue = session.calendar.overdue_tasks_on(today);
    println!(
        "upcoming_{UPCOMING_DAYS}d={} overdue={} completion_rate={}% xp_today={}",
        upcoming.len(),
        overdue.len(),
        session.calendar.task_completion_rate(None),
        session.calendar.total_xp_earned(Some(DateRange::day(today)))
    );

    if let Some(dir) = report_dir {
        let path = session.progress_report(today).export_report(dir)?;
        println!("report={}", path.display());
    }

    session.save(&conn)?;
    Ok(())
}
