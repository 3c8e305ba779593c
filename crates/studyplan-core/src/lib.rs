//! Study plan generation: request model, chapter-to-day allocation, and the
//! per-day timetable view.

pub mod models;
pub mod plan;
pub mod timetable;
