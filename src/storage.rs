//! JSON snapshot storage.
//!
//! The ledger itself is purely in-memory. This module moves whole
//! snapshots to and from a file so that a process can start from the
//! state a previous one left behind. Writes go to a sibling temp file
//! that is renamed over the target.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::{Session, Worker};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable copy of a ledger's records.
///
/// Workers are kept in registration order and sessions in creation order
/// so that tie-breaking survives a round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub workers: Vec<Worker>,
    pub sessions: Vec<Session>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            workers: Vec::new(),
            sessions: Vec::new(),
        }
    }
}

/// File-backed snapshot store.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored snapshot, or an empty one if the file does not exist.
    pub fn load(&self) -> Result<Snapshot> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no snapshot yet, starting empty");
                return Ok(Snapshot::empty());
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: Snapshot = serde_json::from_str(&content)?;
        tracing::debug!(
            path = %self.path.display(),
            workers = snapshot.workers.len(),
            sessions = snapshot.sessions.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Write a snapshot, replacing whatever was there.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        tracing::debug!(
            path = %self.path.display(),
            workers = snapshot.workers.len(),
            sessions = snapshot.sessions.len(),
            "snapshot saved"
        );
        Ok(())
    }
}
