// src/record.rs
// Final standings of a finished game and their JSON archive.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of the final standings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub name: String,
    pub points: u32,
}

/// Serializable summary of a finished game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub scores: Vec<Score>,
}

impl GameRecord {
    /// Write the record as `<dir>/<id>.json`, creating `dir` if needed.
    pub fn dump_to(&self, dir: &Path) -> Result<PathBuf, String> {
        let filepath = dir.join(format!("{}.json", self.id));

        if let Err(e) = fs::create_dir_all(dir) {
            return Err(format!("Failed to create directory {dir:?}: {e}"));
        }

        let json_content = match serde_json::to_string_pretty(self) {
            Ok(json) => json,
            Err(e) => return Err(format!("Failed to serialize game record: {e}")),
        };

        match fs::write(&filepath, json_content) {
            Ok(_) => Ok(filepath),
            Err(e) => Err(format!("Failed to write file {filepath:?}: {e}")),
        }
    }
}
