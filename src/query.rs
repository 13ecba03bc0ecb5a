//! Read-only views over the ledger: search, location grouping, hour totals
//! and reports. Nothing here mutates state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::model::*;

/// Everything the detail page shows about one worker.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerOverview {
    pub worker: Worker,
    pub status: ClockStatus,
    /// Clock-in of the open session, if clocked in.
    pub clocked_in_since: Option<DateTime<Utc>>,
    pub last_clock_out: Option<DateTime<Utc>>,
    pub total_hours: f64,
    pub completed_sessions: usize,
    pub active_sessions: usize,
}

/// Which sessions a report covers.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub range: DateRange,
    /// Restrict to one worker.
    pub worker: Option<String>,
}

/// Per-worker line of a report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub worker: Worker,
    pub status: ClockStatus,
    pub sessions: usize,
    pub completed_sessions: usize,
    pub active_sessions: usize,
    /// Closed sessions only.
    pub total_hours: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub total_hours: f64,
    pub completed_sessions: usize,
    pub active_sessions: usize,
}

impl Ledger {
    /// Case-insensitive substring match on id, name, company and location.
    ///
    /// A blank query returns every worker.
    pub fn search(&self, query: &str) -> Vec<Worker> {
        let query = query.trim();
        if query.is_empty() {
            return self.list_all();
        }

        let needle = query.to_lowercase();
        let hits: Vec<Worker> = self
            .list_all()
            .into_iter()
            .filter(|w| {
                [&w.id, &w.name, &w.company, &w.location]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect();

        tracing::debug!(query, hits = hits.len(), "worker search");
        hits
    }

    /// Workers partitioned by exact location, each group in name order.
    pub fn group_by_location(&self) -> BTreeMap<String, Vec<Worker>> {
        let mut groups: BTreeMap<String, Vec<Worker>> = BTreeMap::new();
        for worker in self.list_all() {
            groups
                .entry(worker.location.clone())
                .or_default()
                .push(worker);
        }
        groups
    }

    /// Hours over the worker's closed sessions that clocked in within `range`.
    ///
    /// Open sessions never count, even partially.
    pub fn aggregate_hours(&self, worker_id: &str, range: Option<DateRange>) -> f64 {
        minutes_to_hours(self.closed_minutes(worker_id, range.unwrap_or_default()))
    }

    /// Whole minutes of closed sessions. Integer so the sum is independent
    /// of map iteration order.
    fn closed_minutes(&self, worker_id: &str, range: DateRange) -> i64 {
        self.sessions
            .values()
            .map(|e| &e.record)
            .filter(|s| s.worker_id == worker_id && range.contains(s.clock_in))
            .filter_map(Session::duration)
            .map(|d| d.total_minutes())
            .sum()
    }

    pub fn overview(&self, worker_id: &str) -> Result<WorkerOverview> {
        let worker = self
            .get(worker_id)
            .ok_or_else(|| Error::NotFound(format!("worker {worker_id}")))?;

        let sessions = self.sessions_of(worker_id);
        let completed_sessions = sessions.iter().filter(|s| !s.is_open()).count();
        let last_clock_out = sessions.iter().filter_map(|s| s.clock_out).max();

        Ok(WorkerOverview {
            status: self.status_of(worker_id),
            clocked_in_since: self.open_session(worker_id).map(|s| s.clock_in),
            last_clock_out,
            total_hours: self.aggregate_hours(worker_id, None),
            completed_sessions,
            active_sessions: sessions.len() - completed_sessions,
            worker,
        })
    }

    /// Per-worker session counts and hours, in worker name order.
    pub fn report(&self, filter: &ReportFilter) -> Result<Report> {
        let workers = match filter.worker.as_deref() {
            Some(id) => vec![
                self.get(id)
                    .ok_or_else(|| Error::NotFound(format!("worker {id}")))?,
            ],
            None => self.list_all(),
        };

        let mut report = Report::default();
        let mut report_minutes = 0;
        for worker in workers {
            let sessions: Vec<Session> = self
                .sessions_of(&worker.id)
                .into_iter()
                .filter(|s| filter.range.contains(s.clock_in))
                .collect();
            let completed_sessions = sessions.iter().filter(|s| !s.is_open()).count();
            let active_sessions = sessions.len() - completed_sessions;
            let minutes = self.closed_minutes(&worker.id, filter.range);
            let total_hours = minutes_to_hours(minutes);

            report_minutes += minutes;
            report.completed_sessions += completed_sessions;
            report.active_sessions += active_sessions;
            report.rows.push(ReportRow {
                status: self.status_of(&worker.id),
                sessions: sessions.len(),
                completed_sessions,
                active_sessions,
                total_hours,
                worker,
            });
        }

        report.total_hours = minutes_to_hours(report_minutes);

        tracing::debug!(
            rows = report.rows.len(),
            total_hours = report.total_hours,
            "report built"
        );
        Ok(report)
    }
}

fn minutes_to_hours(minutes: i64) -> f64 {
    minutes as f64 / 60.0
}
