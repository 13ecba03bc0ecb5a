//! Core data model.
//!
//! A worker is a registered person identified by a caller-supplied id (a
//! tax registration number in practice). A session is one clock-in to
//! clock-out interval for a single worker; it is open while `clock_out`
//! is unset.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// A registered worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// Unique, caller-supplied identifier. Immutable after registration.
    pub id: String,
    pub name: String,
    pub company: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for registering a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWorker {
    pub id: String,
    pub name: String,
    pub company: String,
    pub location: String,
}

impl NewWorker {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            company: company.into(),
            location: location.into(),
        }
    }
}

/// Partial update for a worker. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerPatch {
    pub(crate) name: Option<String>,
    pub(crate) company: Option<String>,
    pub(crate) location: Option<String>,
}

impl WorkerPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.company.is_none() && self.location.is_none()
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Newtype for session IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short display: first 8 chars of UUID
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// One continuous work period for one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    /// Back-reference to the owning worker's id.
    pub worker_id: String,
    pub clock_in: DateTime<Utc>,
    /// `None` while the session is open.
    pub clock_out: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl Session {
    pub fn is_open(&self) -> bool {
        self.clock_out.is_none()
    }

    /// Elapsed time of a closed session. Open sessions have no duration.
    pub fn duration(&self) -> Option<SessionDuration> {
        self.clock_out
            .map(|out| SessionDuration::between(self.clock_in, out))
    }
}

// ---------------------------------------------------------------------------
// Clock status
// ---------------------------------------------------------------------------

/// Derived per-worker state: whether an open session exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockStatus {
    ClockedIn,
    ClockedOut,
}

impl std::fmt::Display for ClockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ClockStatus::ClockedIn => "clocked_in",
            ClockStatus::ClockedOut => "clocked_out",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Duration
// ---------------------------------------------------------------------------

/// Whole hours plus truncated whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionDuration {
    pub hours: i64,
    /// Always in `0..60`.
    pub minutes: i64,
}

impl SessionDuration {
    /// Duration from `start` to `end`. A negative span counts as zero.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let secs = (end - start).num_seconds().max(0);
        Self {
            hours: secs / 3600,
            minutes: (secs % 3600) / 60,
        }
    }

    /// Fractional hours, at minute resolution.
    pub fn total(&self) -> f64 {
        self.hours as f64 + self.minutes as f64 / 60.0
    }

    pub fn total_minutes(&self) -> i64 {
        self.hours * 60 + self.minutes
    }
}

impl std::fmt::Display for SessionDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

// ---------------------------------------------------------------------------
// Date range
// ---------------------------------------------------------------------------

/// Calendar-date filter on session clock-in, both ends inclusive, in UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if ts < start.and_time(NaiveTime::MIN).and_utc() {
                return false;
            }
        }
        if let Some(end) = self.end {
            // Past the last representable date, everything is before it.
            if let Some(next) = end.checked_add_days(Days::new(1)) {
                if ts >= next.and_time(NaiveTime::MIN).and_utc() {
                    return false;
                }
            }
        }
        true
    }
}
