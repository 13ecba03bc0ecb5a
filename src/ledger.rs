//! The workforce ledger. Owns every worker and session record.
//!
//! All mutations go through here. Each operation checks its preconditions
//! before touching any map, so a failed call leaves the ledger exactly as
//! it was. Callers only ever receive clones of stored records.

use opentelemetry::KeyValue;
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::event::{Event, EventKind};
use crate::model::*;
use crate::storage::{SNAPSHOT_VERSION, Snapshot};
use crate::telemetry::ledger::{record_status_transition, start_operation_span};
use crate::telemetry::metrics;

/// A stored record plus its insertion sequence, used for stable ordering.
#[derive(Debug, Clone)]
pub(crate) struct Entry<T> {
    pub(crate) seq: u64,
    pub(crate) record: T,
}

/// Worker registry and session tracker sharing one consistency boundary.
pub struct Ledger {
    clock: Arc<dyn Clock>,
    pub(crate) workers: HashMap<String, Entry<Worker>>,
    pub(crate) sessions: HashMap<SessionId, Entry<Session>>,
    /// worker id -> its open session. At most one per worker.
    open: HashMap<String, SessionId>,
    next_seq: u64,
    /// Most recent events, oldest first, capped at `event_capacity`.
    events: VecDeque<Event>,
    event_capacity: usize,
    next_event_seq: u64,
}

/// Events kept in memory before the oldest are dropped.
pub const DEFAULT_EVENT_CAPACITY: usize = 4096;

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// An empty ledger on the wall clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// An empty ledger on the given clock.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
            workers: HashMap::new(),
            sessions: HashMap::new(),
            open: HashMap::new(),
            next_seq: 0,
            events: VecDeque::new(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            next_event_seq: 0,
        }
    }

    /// Keep at most `capacity` events; older ones are dropped first.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self.trim_events();
        self
    }

    /// Rebuild a ledger from a snapshot, rejecting any that break an invariant.
    pub fn from_snapshot(snapshot: Snapshot, clock: impl Clock + 'static) -> Result<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::CorruptSnapshot(format!(
                "unsupported version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }

        let mut ledger = Self::with_clock(clock);

        for worker in snapshot.workers {
            if worker.id.trim().is_empty() {
                return Err(Error::CorruptSnapshot("worker with empty id".into()));
            }
            if ledger.workers.contains_key(&worker.id) {
                return Err(Error::CorruptSnapshot(format!(
                    "duplicate worker id {}",
                    worker.id
                )));
            }
            let seq = ledger.bump_seq();
            ledger
                .workers
                .insert(worker.id.clone(), Entry { seq, record: worker });
        }

        for session in snapshot.sessions {
            if !ledger.workers.contains_key(&session.worker_id) {
                return Err(Error::CorruptSnapshot(format!(
                    "session {} references unknown worker {}",
                    session.id, session.worker_id
                )));
            }
            if ledger.sessions.contains_key(&session.id) {
                return Err(Error::CorruptSnapshot(format!(
                    "duplicate session id {}",
                    session.id
                )));
            }
            match session.clock_out {
                Some(out) if out < session.clock_in => {
                    return Err(Error::CorruptSnapshot(format!(
                        "session {} clocks out before it clocks in",
                        session.id
                    )));
                }
                Some(_) => {}
                None => {
                    if ledger.open.contains_key(&session.worker_id) {
                        return Err(Error::CorruptSnapshot(format!(
                            "worker {} has more than one open session",
                            session.worker_id
                        )));
                    }
                    ledger.open.insert(session.worker_id.clone(), session.id);
                }
            }
            let seq = ledger.bump_seq();
            ledger.sessions.insert(
                session.id,
                Entry {
                    seq,
                    record: session,
                },
            );
        }

        tracing::info!(
            workers = ledger.workers.len(),
            sessions = ledger.sessions.len(),
            open = ledger.open.len(),
            "ledger restored from snapshot"
        );
        Ok(ledger)
    }

    /// Export every record, in insertion order.
    pub fn snapshot(&self) -> Snapshot {
        let mut workers: Vec<_> = self.workers.values().collect();
        workers.sort_by_key(|e| e.seq);
        let mut sessions: Vec<_> = self.sessions.values().collect();
        sessions.sort_by_key(|e| e.seq);

        Snapshot {
            version: SNAPSHOT_VERSION,
            workers: workers.into_iter().map(|e| e.record.clone()).collect(),
            sessions: sessions.into_iter().map(|e| e.record.clone()).collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Worker registry
    // -----------------------------------------------------------------------

    /// Register a new worker. Fails if the id is already taken.
    pub fn register(&mut self, new: NewWorker) -> Result<Worker> {
        let new = normalize_new_worker(new)?;
        if self.workers.contains_key(&new.id) {
            return Err(Error::DuplicateIdentity(new.id));
        }
        Ok(self.insert_worker(new))
    }

    /// Register several workers at once. Either all are registered or none.
    pub fn register_many(&mut self, batch: Vec<NewWorker>) -> Result<Vec<Worker>> {
        let mut seen = HashSet::new();
        let mut validated = Vec::with_capacity(batch.len());
        for new in batch {
            let new = normalize_new_worker(new)?;
            if self.workers.contains_key(&new.id) || !seen.insert(new.id.clone()) {
                return Err(Error::DuplicateIdentity(new.id));
            }
            validated.push(new);
        }

        Ok(validated
            .into_iter()
            .map(|new| self.insert_worker(new))
            .collect())
    }

    fn insert_worker(&mut self, new: NewWorker) -> Worker {
        let now = self.clock.now();
        let worker = Worker {
            id: new.id,
            name: new.name,
            company: new.company,
            location: new.location,
            created_at: now,
            updated_at: now,
        };

        let seq = self.bump_seq();
        self.workers.insert(
            worker.id.clone(),
            Entry {
                seq,
                record: worker.clone(),
            },
        );

        metrics::workers_registered().add(1, &[]);
        tracing::info!(worker_id = %worker.id, name = %worker.name, "worker registered");
        self.record_event(EventKind::WorkerRegistered {
            worker_id: worker.id.clone(),
        });
        worker
    }

    /// Apply the supplied fields to a worker and refresh `updated_at`.
    pub fn update(&mut self, id: &str, patch: WorkerPatch) -> Result<Worker> {
        let name = patch.name.map(|v| required("name", v)).transpose()?;
        let company = patch.company.map(|v| required("company", v)).transpose()?;
        let location = patch.location.map(|v| required("location", v)).transpose()?;

        let now = self.clock.now();
        let entry = self
            .workers
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("worker {id}")))?;

        let worker = &mut entry.record;
        if let Some(name) = name {
            worker.name = name;
        }
        if let Some(company) = company {
            worker.company = company;
        }
        if let Some(location) = location {
            worker.location = location;
        }
        worker.updated_at = now;
        let worker = worker.clone();

        tracing::info!(worker_id = %id, "worker updated");
        self.record_event(EventKind::WorkerUpdated {
            worker_id: worker.id.clone(),
        });
        Ok(worker)
    }

    pub fn get(&self, id: &str) -> Option<Worker> {
        self.workers.get(id).map(|e| e.record.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.workers.contains_key(id)
    }

    /// Remove a worker and every session that references it.
    ///
    /// An open session is discarded along with the rest. Returns whether
    /// a worker was actually removed.
    pub fn delete(&mut self, id: &str) -> bool {
        if !self.workers.contains_key(id) {
            return false;
        }

        let before = self.sessions.len();
        self.sessions.retain(|_, e| e.record.worker_id != id);
        let sessions_removed = before - self.sessions.len();
        let was_open = self.open.remove(id).is_some();
        self.workers.remove(id);

        metrics::workers_deleted().add(1, &[]);
        tracing::info!(
            worker_id = %id,
            sessions_removed,
            was_open,
            "worker deleted"
        );
        self.record_event(EventKind::WorkerDeleted {
            worker_id: id.to_string(),
            sessions_removed,
        });
        true
    }

    /// All workers, by name, ties in registration order.
    pub fn list_all(&self) -> Vec<Worker> {
        let mut entries: Vec<_> = self.workers.values().collect();
        entries.sort_by(|a, b| {
            name_order(&a.record.name, &b.record.name).then(a.seq.cmp(&b.seq))
        });
        entries.into_iter().map(|e| e.record.clone()).collect()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    // -----------------------------------------------------------------------
    // Session tracker
    // -----------------------------------------------------------------------

    /// Open a session for a clocked-out worker.
    pub fn clock_in(&mut self, worker_id: &str, notes: Option<&str>) -> Result<Session> {
        let span = start_operation_span("clock_in", worker_id);
        let _enter = span.enter();

        if let Err(e) = self.check_clock_in(worker_id) {
            reject(&e);
            return Err(e);
        }

        let session = Session {
            id: SessionId::new(),
            worker_id: worker_id.to_string(),
            clock_in: self.clock.now(),
            clock_out: None,
            notes: clean_note(notes),
        };

        let seq = self.bump_seq();
        self.open.insert(worker_id.to_string(), session.id);
        self.sessions.insert(
            session.id,
            Entry {
                seq,
                record: session.clone(),
            },
        );

        record_status_transition(&span, ClockStatus::ClockedOut, ClockStatus::ClockedIn);
        metrics::clock_events().add(1, &[KeyValue::new("direction", "in")]);
        self.record_event(EventKind::ClockedIn {
            worker_id: worker_id.to_string(),
            session_id: session.id,
        });
        Ok(session)
    }

    fn check_clock_in(&self, worker_id: &str) -> Result<()> {
        if !self.workers.contains_key(worker_id) {
            return Err(Error::NotFound(format!("worker {worker_id}")));
        }
        if self.open.contains_key(worker_id) {
            return Err(Error::AlreadyClockedIn(worker_id.to_string()));
        }
        Ok(())
    }

    /// Close the worker's open session, merging any new note.
    ///
    /// The lookup and the update happen under the same `&mut self`, so no
    /// other operation can observe the session half-closed.
    pub fn clock_out(&mut self, worker_id: &str, notes: Option<&str>) -> Result<Session> {
        let span = start_operation_span("clock_out", worker_id);
        let _enter = span.enter();

        let session_id = match self.check_clock_out(worker_id) {
            Ok(id) => id,
            Err(e) => {
                reject(&e);
                return Err(e);
            }
        };

        let now = self.clock.now();
        let entry = self.sessions.get_mut(&session_id).ok_or_else(|| {
            Error::Other(format!(
                "open-session index points at missing session {session_id}"
            ))
        })?;

        let session = &mut entry.record;
        // A clock that went backwards must not yield a negative session.
        session.clock_out = Some(now.max(session.clock_in));
        session.notes = merge_notes(session.notes.take(), clean_note(notes));
        let session = session.clone();
        self.open.remove(worker_id);

        let minutes = session.duration().map(|d| d.total_minutes()).unwrap_or(0);
        record_status_transition(&span, ClockStatus::ClockedIn, ClockStatus::ClockedOut);
        metrics::clock_events().add(1, &[KeyValue::new("direction", "out")]);
        metrics::session_minutes().record(minutes as f64, &[]);
        self.record_event(EventKind::ClockedOut {
            worker_id: worker_id.to_string(),
            session_id,
            minutes,
        });
        Ok(session)
    }

    fn check_clock_out(&self, worker_id: &str) -> Result<SessionId> {
        if !self.workers.contains_key(worker_id) {
            return Err(Error::NotFound(format!("worker {worker_id}")));
        }
        self.open
            .get(worker_id)
            .copied()
            .ok_or_else(|| Error::NoActiveSession(worker_id.to_string()))
    }

    /// Derived from the presence of an open session. Unknown workers are
    /// clocked out.
    pub fn status_of(&self, worker_id: &str) -> ClockStatus {
        if self.open.contains_key(worker_id) {
            ClockStatus::ClockedIn
        } else {
            ClockStatus::ClockedOut
        }
    }

    /// The worker's open session, if any.
    pub fn open_session(&self, worker_id: &str) -> Option<Session> {
        self.open
            .get(worker_id)
            .and_then(|id| self.sessions.get(id))
            .map(|e| e.record.clone())
    }

    /// All sessions of one worker, most recent clock-in first.
    pub fn sessions_of(&self, worker_id: &str) -> Vec<Session> {
        self.sorted_sessions(|s| s.worker_id == worker_id)
    }

    /// Every session, most recent clock-in first.
    pub fn all_sessions(&self) -> Vec<Session> {
        self.sorted_sessions(|_| true)
    }

    /// Every open session, most recent clock-in first.
    pub fn open_sessions(&self) -> Vec<Session> {
        self.sorted_sessions(Session::is_open)
    }

    pub fn duration(&self, session: &Session) -> Option<SessionDuration> {
        session.duration()
    }

    pub(crate) fn sorted_sessions(&self, keep: impl Fn(&Session) -> bool) -> Vec<Session> {
        let mut entries: Vec<_> = self
            .sessions
            .values()
            .filter(|e| keep(&e.record))
            .collect();
        entries.sort_by(|a, b| {
            b.record
                .clock_in
                .cmp(&a.record.clock_in)
                .then(b.seq.cmp(&a.seq))
        });
        entries.into_iter().map(|e| e.record.clone()).collect()
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Retained events with a sequence number greater than `since_seq`.
    ///
    /// Sequence numbers keep counting after old events are dropped, so a
    /// caller that fell behind sees a gap between its last seq and the first
    /// one returned.
    pub fn events_since(&self, since_seq: u64) -> Vec<Event> {
        let start = self.events.partition_point(|e| e.seq <= since_seq);
        self.events.range(start..).cloned().collect()
    }

    fn record_event(&mut self, kind: EventKind) {
        self.next_event_seq += 1;
        self.events.push_back(Event {
            seq: self.next_event_seq,
            timestamp: self.clock.now(),
            kind,
        });
        self.trim_events();
    }

    fn trim_events(&mut self) {
        let excess = self.events.len().saturating_sub(self.event_capacity);
        self.events.drain(..excess);
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

// ---------------------------------------------------------------------------
// Shared handle
// ---------------------------------------------------------------------------

/// Cloneable handle to one ledger for concurrent callers.
///
/// Every call runs under a single lock, so a check-then-act sequence such
/// as "clock in unless already clocked in" cannot interleave with another.
#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Run `f` with exclusive access to the ledger.
    pub fn with<T>(&self, f: impl FnOnce(&mut Ledger) -> T) -> T {
        let mut ledger = self.inner.lock();
        f(&mut *ledger)
    }

    pub fn clock_in(&self, worker_id: &str, notes: Option<&str>) -> Result<Session> {
        self.with(|l| l.clock_in(worker_id, notes))
    }

    pub fn clock_out(&self, worker_id: &str, notes: Option<&str>) -> Result<Session> {
        self.with(|l| l.clock_out(worker_id, notes))
    }

    pub fn snapshot(&self) -> Snapshot {
        self.with(|l| l.snapshot())
    }
}

// ---------------------------------------------------------------------------
// Input helpers
// ---------------------------------------------------------------------------

/// Name ordering for listings. Names compare case-insensitively first; names
/// that differ only by case put the lowercase letter first.
pub(crate) fn name_order(a: &str, b: &str) -> Ordering {
    let folded = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<String>();
    folded(a).cmp(&folded(b)).then_with(|| {
        a.chars()
            .zip(b.chars())
            .map(|(x, y)| x.is_uppercase().cmp(&y.is_uppercase()))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.cmp(b))
    })
}

fn required(field: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn normalize_new_worker(new: NewWorker) -> Result<NewWorker> {
    Ok(NewWorker {
        id: required("id", new.id)?,
        name: required("name", new.name)?,
        company: required("company", new.company)?,
        location: required("location", new.location)?,
    })
}

fn clean_note(note: Option<&str>) -> Option<String> {
    note.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// `"<existing> | <new>"` when both exist; otherwise whichever one does.
fn merge_notes(existing: Option<String>, new: Option<String>) -> Option<String> {
    match (existing, new) {
        (Some(old), Some(new)) => Some(format!("{old} | {new}")),
        (old, None) => old,
        (None, new) => new,
    }
}

fn reject(e: &Error) {
    tracing::warn!(error = %e, "clock transition rejected");
    metrics::clock_rejected().add(1, &[KeyValue::new("reason", e.kind())]);
}
