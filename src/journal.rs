//! Side journal kept next to `gee.toml`.
//!
//! `<config dir>/.gee/gee.json` remembers, per repository, the commit it
//! was on before its local changes were last stashed for a pull, so that
//! state can be found again if a recovery needs a human.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::defaults::{JOURNAL_DIR, JOURNAL_FILE_NAME};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub repo: String,
    pub last_commit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    #[serde(default)]
    pub repos: Vec<JournalEntry>,
}

impl Journal {
    /// Path of the journal for a workspace rooted at `config_dir`.
    pub fn path(config_dir: &Path) -> PathBuf {
        config_dir.join(JOURNAL_DIR).join(JOURNAL_FILE_NAME)
    }

    /// Read the journal, or an empty one if it does not exist yet.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let path = Self::path(config_dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Insert or replace the entry for `repo`.
    pub fn record(&mut self, repo: &str, last_commit: &str) {
        match self.repos.iter_mut().find(|entry| entry.repo == repo) {
            Some(entry) => entry.last_commit = last_commit.to_string(),
            None => self.repos.push(JournalEntry {
                repo: repo.to_string(),
                last_commit: last_commit.to_string(),
            }),
        }
    }

    pub fn save(&self, config_dir: &Path) -> Result<()> {
        let path = Self::path(config_dir);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        debug!("journal written to {}", path.display());
        Ok(())
    }
}
