use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::{MatchRecord, StoreError};

/// One finished match in the history log.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u32,
    pub finished_at: DateTime<Utc>,
    pub record: MatchRecord,
}

/// Chronological log of finished matches, persisted as JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a finished match and returns its id. Ids start at 1 and
    /// follow insertion order.
    pub fn add(&mut self, record: MatchRecord) -> u32 {
        let id = self.entries.len() as u32 + 1;
        self.entries.push(HistoryEntry {
            id,
            finished_at: Utc::now(),
            record,
        });
        log::debug!("history entry {id} added, winner: {}", record.winner);
        id
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
