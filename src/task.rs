//! Sticky-note task data structure and related helpers.
//!
//! A `Task` is one note on the board: its text, completion flag, priority,
//! optional deadline, and where (and at what tilt) it is pinned.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BoardError;
use crate::fields::Priority;
use crate::geometry::Point;

/// Opaque, process-unique task identifier.
///
/// New ids are UUID v4 strings; ids read back from storage are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        TaskId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, enough to address a task from the command line.
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        TaskId(s)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One note on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub is_done: bool,
    pub priority: Priority,
    #[serde(default, with = "deadline_format")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    pub x: f64,
    pub y: f64,
    /// Tilt in degrees. Purely cosmetic.
    pub rotate: f64,
}

impl Task {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Past its deadline and still open.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_done && self.deadline.is_some_and(|d| d < now)
    }
}

/// Fields collected from the add form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub name: String,
    pub priority: Priority,
    pub deadline: Option<DateTime<Utc>>,
    pub description: String,
}

impl NewTask {
    pub fn new(name: impl Into<String>) -> Self {
        NewTask {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<DateTime<Utc>>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Deadlines are stored the way a browser's `Date#toJSON` writes them:
/// RFC 3339 in UTC with millisecond precision, or `null`.
pub(crate) mod deadline_format {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => super::parse_timestamp(text)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("unrecognised deadline '{text}'"))),
        }
    }
}

/// Resolve a local wall-clock time to an instant. Times inside a DST gap
/// fall back to reading the wall clock as UTC.
pub fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    match Local.from_local_datetime(&naive).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&naive),
    }
}

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Read an RFC 3339 timestamp, or an ISO 8601 date or date-time without an
/// offset as local time. Precision is cut to milliseconds, the most storage keeps.
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let instant = if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        dt.with_timezone(&Utc)
    } else if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        local_to_utc(naive)
    } else {
        let naive = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0)?;
        local_to_utc(naive)
    };
    Some(instant.trunc_subsecs(3))
}

/// Parse deadline form input.
///
/// Accepts `YYYY-MM-DDTHH:MM` (what a `datetime-local` field produces),
/// the same with a space or seconds, a bare `YYYY-MM-DD` (midnight), or a full
/// RFC 3339 timestamp. Blank input means no deadline.
pub fn parse_deadline_input(s: &str) -> Result<Option<DateTime<Utc>>, BoardError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    parse_timestamp(s)
        .map(Some)
        .ok_or_else(|| BoardError::InvalidDeadline(s.to_string()))
}

/// Human-readable deadline in local time, e.g. `2025-6-1 10:00`.
pub fn format_deadline(deadline: DateTime<Utc>) -> String {
    deadline.with_timezone(&Local).format("%Y-%-m-%-d %-H:%M").to_string()
}
