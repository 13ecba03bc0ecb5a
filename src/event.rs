//! Structured events emitted by the ledger on every successful mutation.
//!
//! Consumers poll `Ledger::events_since` to build audit trails or refresh
//! views. Rejected operations never produce events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::SessionId;

/// A structured event emitted by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Monotonic sequence number, starting at 1.
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    WorkerRegistered {
        worker_id: String,
    },
    WorkerUpdated {
        worker_id: String,
    },
    WorkerDeleted {
        worker_id: String,
        /// Sessions removed by the cascade, open ones included.
        sessions_removed: usize,
    },
    ClockedIn {
        worker_id: String,
        session_id: SessionId,
    },
    ClockedOut {
        worker_id: String,
        session_id: SessionId,
        minutes: i64,
    },
}
