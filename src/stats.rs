//! Run leaderboard
//!
//! Tracks the ten best generations of a run by best fitness and writes
//! them out as a JSON summary when the run ends.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::settings::SettingsError;

/// Maximum number of generation records to keep
pub const MAX_RECORDS: usize = 10;

/// Result of one generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: u32,
    pub best_fitness: f32,
    pub mean_fitness: f32,
    /// Pipes cleared before the episode ended
    pub score: u64,
    pub ticks: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    pub records: Vec<GenerationRecord>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Check if a fitness would make the board
    pub fn qualifies(&self, best_fitness: f32) -> bool {
        if self.records.len() < MAX_RECORDS {
            return true;
        }
        self.records
            .last()
            .map(|r| best_fitness > r.best_fitness)
            .unwrap_or(true)
    }

    /// Rank a fitness would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, best_fitness: f32) -> Option<usize> {
        if !self.qualifies(best_fitness) {
            return None;
        }
        let rank = self
            .records
            .iter()
            .position(|r| best_fitness > r.best_fitness);
        Some(rank.unwrap_or(self.records.len()) + 1)
    }

    /// Insert a record in descending fitness order
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify
    pub fn add(&mut self, record: GenerationRecord) -> Option<usize> {
        let rank = self.potential_rank(record.best_fitness)?;
        self.records.insert(rank - 1, record);
        self.records.truncate(MAX_RECORDS);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn best(&self) -> Option<&GenerationRecord> {
        self.records.first()
    }

    /// Write the board as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!(
            "Leaderboard saved to {} ({} entries)",
            path.display(),
            self.records.len()
        );
        Ok(())
    }
}
