//! Request validation ahead of plan generation.
//!
//! Rejects requests that would otherwise divide the daily budget by zero:
//! - at least one subject must be present,
//! - every subject must list at least one chapter.
//!
//! Rejecting subject and chapter names that are blank after trimming is
//! opt-in. Zero or negative `daily_hours` is accepted and flows through
//! arithmetically.
//!
//! The policy also carries the longest timetable, in days, that
//! [`build_timetable_validated`](crate::timetable::build_timetable_validated)
//! will build.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::StudyPlanRequest;

/// Errors returned by the validated plan entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Which checks [`validate_request`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    /// Reject an empty `subjects` list and subjects without chapters.
    #[serde(default = "default_true")]
    pub reject_empty: bool,
    /// Reject subject or chapter names that are empty after trimming.
    #[serde(default)]
    pub reject_blank_names: bool,
    /// Longest timetable accepted, counted from today to the last exam day.
    #[serde(default = "default_max_timetable_days")]
    pub max_timetable_days: u32,
}

/// One year, leap day included.
pub const DEFAULT_MAX_TIMETABLE_DAYS: u32 = 366;

impl ValidationPolicy {
    /// Accept every well-formed request, as the unvalidated generator does.
    /// The timetable horizon stays bounded.
    pub const LENIENT: Self = Self {
        reject_empty: false,
        reject_blank_names: false,
        max_timetable_days: DEFAULT_MAX_TIMETABLE_DAYS,
    };
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            reject_empty: true,
            reject_blank_names: false,
            max_timetable_days: DEFAULT_MAX_TIMETABLE_DAYS,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_timetable_days() -> u32 {
    DEFAULT_MAX_TIMETABLE_DAYS
}

/// Validate a request against `policy`.
pub fn validate_request(
    request: &StudyPlanRequest,
    policy: ValidationPolicy,
) -> Result<(), PlanError> {
    if policy.reject_empty && request.subjects.is_empty() {
        return Err(PlanError::InvalidRequest(
            "subjects must not be empty".to_owned(),
        ));
    }

    for (idx, subject) in request.subjects.iter().enumerate() {
        if policy.reject_blank_names && subject.name.trim().is_empty() {
            return Err(PlanError::InvalidRequest(format!(
                "subject at position {idx} has a blank name"
            )));
        }

        if policy.reject_empty && subject.chapters.is_empty() {
            return Err(PlanError::InvalidRequest(format!(
                "subject {:?} has no chapters",
                subject.name
            )));
        }

        if policy.reject_blank_names {
            if let Some(pos) = subject.chapters.iter().position(|c| c.name.trim().is_empty()) {
                return Err(PlanError::InvalidRequest(format!(
                    "chapter at position {pos} of subject {:?} has a blank name",
                    subject.name
                )));
            }
        }
    }

    Ok(())
}
