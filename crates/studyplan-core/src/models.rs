use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// A named unit of study material within a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub name: String,
}

impl Chapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A topic with an exam date and the ordered chapters to cover before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub chapters: Vec<Chapter>,
    /// Exam time with its UTC offset. Ordering compares instants; the
    /// calendar date in the exam's own offset drives scheduling.
    #[serde(with = "exam_date")]
    pub exam_date: DateTime<FixedOffset>,
}

impl Subject {
    /// Calendar day of the exam, in the exam's own offset.
    pub fn exam_day(&self) -> NaiveDate {
        self.exam_date.date_naive()
    }

    /// Whole days from `today` to the exam day. Zero or negative once the
    /// exam day has been reached.
    pub fn days_until_exam(&self, today: NaiveDate) -> i64 {
        (self.exam_day() - today).num_days()
    }
}

/// Body of `POST /study-plan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPlanRequest {
    pub subjects: Vec<Subject>,
    /// Total hours available per day across all subjects.
    pub daily_hours: i64,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// One chapter assigned to one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTask {
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub subject: String,
    pub chapter: String,
    /// Rounded to two decimal places.
    pub hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyPlanResponse {
    pub plan: Vec<DailyTask>,
}

// ---------------------------------------------------------------------------
// Exam date wire format
// ---------------------------------------------------------------------------

/// Error returned when an exam date string matches none of the accepted forms.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid exam date {0:?} (expected an ISO-8601 date or date-time)")]
pub struct ExamDateParseError(pub String);

/// Serde adapter for [`Subject::exam_date`].
///
/// Accepts, in order:
/// - RFC 3339 with an offset (`2025-06-01T09:00:00+02:00`); the offset is kept,
/// - a naive date-time (`2025-06-01T09:00:00`, `2025-06-01 09:00`, optional
///   fractional seconds), read as UTC,
/// - a bare date (`2025-06-01`), read as midnight UTC.
///
/// Serializes as RFC 3339.
pub mod exam_date {
    use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::ExamDateParseError;

    const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    pub fn parse(raw: &str) -> Result<DateTime<FixedOffset>, ExamDateParseError> {
        let s = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt);
        }
        for fmt in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(dt.and_utc().fixed_offset());
            }
        }
        if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(day.and_time(NaiveTime::MIN).and_utc().fixed_offset());
        }

        Err(ExamDateParseError(raw.to_owned()))
    }

    pub fn serialize<S>(value: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(OUTPUT_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
