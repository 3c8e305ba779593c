//! Chapter-to-date allocation.
//!
//! Subjects are handled in order of exam urgency. Each subject receives an
//! equal share of the daily budget (divided by the number of subjects in the
//! request, including any that are skipped), and that share is split evenly
//! across its chapters. Chapter `i` lands on `today + (i mod days_left)`, so
//! once chapters outnumber the remaining days they double up on the earliest
//! days instead of spilling onto or past the exam day.

use chrono::{Days, NaiveDate};

use super::validate::{PlanError, ValidationPolicy, validate_request};
use crate::models::{DailyTask, StudyPlanRequest, StudyPlanResponse, Subject};

/// Build the day-by-day plan for `request` as seen on `today`.
///
/// Subjects whose exam day is `today` or earlier contribute nothing. Empty
/// inputs are not rejected here: no subjects yields an empty plan and a
/// subject without chapters yields no tasks.
pub fn generate_study_plan(request: &StudyPlanRequest, today: NaiveDate) -> StudyPlanResponse {
    let mut subjects: Vec<&Subject> = request.subjects.iter().collect();
    // Instants compare across offsets. `sort_by_key` is stable: equal exam
    // instants keep request order.
    subjects.sort_by_key(|s| s.exam_date);

    let subject_count = request.subjects.len();
    let mut plan = Vec::new();

    for subject in subjects {
        let days_left = subject.days_until_exam(today);
        if days_left <= 0 {
            tracing::debug!(
                subject = %subject.name,
                exam_day = %subject.exam_day(),
                "exam day reached, skipping subject"
            );
            continue;
        }
        if subject.chapters.is_empty() {
            continue;
        }

        let hours_per_day = request.daily_hours as f64 / subject_count as f64;
        let hours = round_hours(hours_per_day / subject.chapters.len() as f64);

        for (i, chapter) in subject.chapters.iter().enumerate() {
            // i % days_left < days_left, so the date stays before the exam day.
            let offset = i as u64 % days_left as u64;
            plan.push(DailyTask {
                date: today + Days::new(offset),
                subject: subject.name.clone(),
                chapter: chapter.name.clone(),
                hours,
            });
        }
    }

    tracing::debug!(
        subjects = subject_count,
        tasks = plan.len(),
        %today,
        "generated study plan"
    );

    StudyPlanResponse { plan }
}

/// Validate `request` against `policy`, then generate its plan.
pub fn generate_validated(
    request: &StudyPlanRequest,
    today: NaiveDate,
    policy: ValidationPolicy,
) -> Result<StudyPlanResponse, PlanError> {
    validate_request(request, policy)?;
    Ok(generate_study_plan(request, today))
}

/// Round to two decimal places, halves away from zero.
fn round_hours(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
