//! `studyplan timetable` command: print the per-day timetable for a request.

use anyhow::Result;
use chrono::NaiveDate;

use studyplan_core::plan::ValidationPolicy;
use studyplan_core::timetable::{Timetable, build_timetable_validated};

use crate::plan_cmd::read_request;

/// Run the timetable command.
pub fn run_timetable(file: &str, today: NaiveDate, policy: ValidationPolicy) -> Result<()> {
    let request = read_request(file)?;
    let timetable = build_timetable_validated(&request, today, policy)?;
    print!("{}", render_timetable(&timetable));
    Ok(())
}

/// Render the timetable as a fixed-width text table, one block per day.
pub fn render_timetable(timetable: &Timetable) -> String {
    if timetable.days.is_empty() {
        return "No upcoming exams.\n".to_string();
    }

    let mut lines = Vec::new();
    for day in &timetable.days {
        lines.push(day.date.format("%a %Y-%m-%d").to_string());
        if day.entries.is_empty() {
            lines.push("  (no study hours)".to_string());
            lines.push(String::new());
            continue;
        }

        lines.push(format!(
            "  {:<20} {:<28} {:>6} {:>10}",
            "SUBJECT", "CHAPTER", "HOURS", "EXAM IN"
        ));
        lines.push(format!("  {}", "-".repeat(67)));
        for entry in &day.entries {
            lines.push(format!(
                "  {:<20} {:<28} {:>6} {:>10}",
                truncate(&entry.subject, 20),
                truncate(&entry.chapter, 28),
                entry.hours,
                format!("{} days", entry.exam_in_days),
            ));
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "Total: {} hours over {} days",
        timetable.total_hours(),
        timetable.days.len()
    ));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let head: String = s.chars().take(width - 3).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}
