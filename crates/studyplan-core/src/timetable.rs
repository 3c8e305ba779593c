//! Per-day timetable view.
//!
//! Unlike the plan generator, which pins each chapter to a single day, the
//! timetable revisits every still-active chapter on every day up to its exam
//! and shares the whole daily budget between them in whole hours.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{StudyPlanRequest, Subject};
use crate::plan::{PlanError, ValidationPolicy, validate_request};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    pub days: Vec<TimetableDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableDay {
    pub date: NaiveDate,
    pub entries: Vec<TimetableEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub subject: String,
    pub chapter: String,
    pub hours: i64,
    /// Days from this entry's date to the subject's exam day.
    pub exam_in_days: i64,
}

impl Timetable {
    /// Sum of scheduled hours across all days.
    pub fn total_hours(&self) -> i64 {
        self.days
            .iter()
            .flat_map(|d| d.entries.iter())
            .map(|e| e.hours)
            .sum()
    }
}

/// Build the timetable for `request` as seen on `today`.
///
/// Covers `today` through the day before the last upcoming exam. On each day:
/// - subjects whose exam day is still ahead are active, most urgent first;
/// - `daily_hours` is floor-divided across all active chapters, and the
///   remainder goes one extra hour at a time to the earliest chapters;
/// - chapters left with no positive hours are dropped from the day.
///
/// Days with no active chapters at all are omitted.
pub fn build_timetable(request: &StudyPlanRequest, today: NaiveDate) -> Timetable {
    let mut upcoming: Vec<(&Subject, i64)> = request
        .subjects
        .iter()
        .map(|s| (s, s.days_until_exam(today)))
        .filter(|(_, days)| *days > 0)
        .collect();
    upcoming.sort_by_key(|(s, _)| s.exam_day());

    let Some(horizon) = upcoming.iter().map(|(_, days)| *days).max() else {
        return Timetable::default();
    };

    let mut days = Vec::new();
    for offset in 0..horizon {
        let date = today + Days::new(offset as u64);
        let active: Vec<&(&Subject, i64)> = upcoming
            .iter()
            .filter(|(s, _)| s.exam_day() > date)
            .collect();

        let total_chapters: i64 = active.iter().map(|(s, _)| s.chapters.len() as i64).sum();
        if total_chapters == 0 {
            continue;
        }

        let per_chapter = request.daily_hours.div_euclid(total_chapters);
        let mut leftover = request.daily_hours - per_chapter * total_chapters;

        let mut entries = Vec::new();
        for (subject, days_until_exam) in active {
            for chapter in &subject.chapters {
                let mut hours = per_chapter;
                if leftover > 0 {
                    hours += 1;
                    leftover -= 1;
                }
                if hours > 0 {
                    entries.push(TimetableEntry {
                        subject: subject.name.clone(),
                        chapter: chapter.name.clone(),
                        hours,
                        exam_in_days: (days_until_exam - offset).max(0),
                    });
                }
            }
        }

        days.push(TimetableDay { date, entries });
    }

    tracing::debug!(days = days.len(), %today, "built timetable");

    Timetable { days }
}

/// Validate `request` against `policy`, then build its timetable.
///
/// Fails when the last exam day lies more than `policy.max_timetable_days`
/// days after `today`.
pub fn build_timetable_validated(
    request: &StudyPlanRequest,
    today: NaiveDate,
    policy: ValidationPolicy,
) -> Result<Timetable, PlanError> {
    validate_request(request, policy)?;

    let horizon = request
        .subjects
        .iter()
        .map(|s| s.days_until_exam(today))
        .max()
        .unwrap_or(0);
    if horizon > i64::from(policy.max_timetable_days) {
        return Err(PlanError::InvalidRequest(format!(
            "timetable would span {horizon} days (limit {})",
            policy.max_timetable_days
        )));
    }

    Ok(build_timetable(request, today))
}
