//! Timer state persistence
//!
//! Mirrors the timer to a JSON file so that a restart keeps the selected mode,
//! the remaining time, and today's completed-session count.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use super::TimerState;

/// JSON file holding the last saved timer state
#[derive(Debug, Clone)]
pub struct TimerStore {
    path: PathBuf,
}

impl TimerStore {
    /// Create a store at `path`, creating its parent directory if needed
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create state directory: {}", parent.display()))?;
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved timer, if any
    pub fn load(&self) -> Result<Option<TimerState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read timer state: {}", self.path.display()))?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        let state = serde_json::from_str(&content).context("Failed to parse timer state JSON")?;
        Ok(Some(state))
    }

    pub fn save(&self, state: &TimerState) -> Result<()> {
        let content = serde_json::to_string_pretty(state).context("Failed to serialize timer state")?;

        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write timer state: {}", self.path.display()))
    }
}
