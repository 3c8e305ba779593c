//! Plan generation: request validation and chapter-to-date allocation.

pub mod generate;
pub mod validate;

pub use generate::{generate_study_plan, generate_validated};
pub use validate::{DEFAULT_MAX_TIMETABLE_DAYS, PlanError, ValidationPolicy, validate_request};
