//! TOML worker rosters for bulk registration.
//!
//! ```toml
//! [[worker]]
//! id = "TRN001"
//! name = "John Smith"
//! company = "ABC Construction"
//! location = "Kingston"
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::model::{NewWorker, Worker};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Roster {
    #[serde(default, rename = "worker")]
    pub workers: Vec<NewWorker>,
}

impl Roster {
    /// Parse a roster file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read roster {}: {e}", path.display())))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The three demo workers the dashboard ships with.
    pub fn sample() -> Self {
        Self {
            workers: vec![
                NewWorker::new("TRN001", "John Smith", "ABC Construction", "Kingston"),
                NewWorker::new("TRN002", "Maria Garcia", "Elite Builders", "Spanish Town"),
                NewWorker::new("TRN003", "David Brown", "Pro Construction", "Portmore"),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Register every worker in the roster, or none of them.
    pub fn import_into(self, ledger: &mut Ledger) -> Result<Vec<Worker>> {
        let count = self.workers.len();
        let workers = ledger.register_many(self.workers)?;
        tracing::info!(count, "roster imported");
        Ok(workers)
    }
}
