//! Shared fixtures for studyplan tests.
//!
//! Every helper is anchored on a caller-supplied reference date so tests stay
//! independent of the wall clock. [`reference_date`] is the conventional
//! "today" used across the workspace.

use chrono::{DateTime, Days, FixedOffset, NaiveDate};
use serde_json::{Value, json};

use studyplan_core::models::{Chapter, StudyPlanRequest, Subject};

/// Fixed "today" for deterministic tests.
pub fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid reference date")
}

/// Midnight UTC `days` after (or before, if negative) `today`.
pub fn days_from(today: NaiveDate, days: i64) -> DateTime<FixedOffset> {
    let day = if days >= 0 {
        today + Days::new(days as u64)
    } else {
        today - Days::new(days.unsigned_abs())
    };
    day.and_hms_opt(0, 0, 0)
        .expect("midnight is valid")
        .and_utc()
        .fixed_offset()
}

/// A subject whose exam falls `exam_in_days` after `today`.
pub fn subject(name: &str, chapters: &[&str], today: NaiveDate, exam_in_days: i64) -> Subject {
    Subject {
        name: name.to_owned(),
        chapters: chapters.iter().map(|c| Chapter::new(*c)).collect(),
        exam_date: days_from(today, exam_in_days),
    }
}

pub fn request(subjects: Vec<Subject>, daily_hours: i64) -> StudyPlanRequest {
    StudyPlanRequest {
        subjects,
        daily_hours,
    }
}

/// The request as the JSON body a client would send.
pub fn request_json(request: &StudyPlanRequest) -> Value {
    let subjects: Vec<Value> = request
        .subjects
        .iter()
        .map(|s| {
            json!({
                "name": s.name,
                "chapters": s.chapters.iter().map(|c| json!({ "name": c.name })).collect::<Vec<_>>(),
                "exam_date": s.exam_date.to_rfc3339(),
            })
        })
        .collect();
    json!({ "subjects": subjects, "daily_hours": request.daily_hours })
}

/// One subject, two chapters, exam in two days, four hours a day.
pub fn single_subject_request(today: NaiveDate) -> StudyPlanRequest {
    request(
        vec![subject("Math", &["Algebra", "Geometry"], today, 2)],
        4,
    )
}
