//! Persisted rule storage
//!
//! The editor reads its baseline from a [`RuleStore`] once when it opens and
//! only the form host writes back, after the user confirms.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::RewriteError;
use crate::rule::StoredRule;

pub trait RuleStore {
    /// Current persisted rules, in application order
    fn read(&self) -> Result<Vec<StoredRule>, RewriteError>;

    /// Replace the persisted rules
    fn write(&mut self, rules: &[StoredRule]) -> Result<(), RewriteError>;
}

/// In-process store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rules: Vec<StoredRule>,
    writes: usize,
}

impl MemoryStore {
    pub fn new(rules: Vec<StoredRule>) -> Self {
        Self { rules, writes: 0 }
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl RuleStore for MemoryStore {
    fn read(&self) -> Result<Vec<StoredRule>, RewriteError> {
        Ok(self.rules.clone())
    }

    fn write(&mut self, rules: &[StoredRule]) -> Result<(), RewriteError> {
        self.rules = rules.to_vec();
        self.writes += 1;
        Ok(())
    }
}

/// Rules kept as a JSON array in a file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RuleStore for JsonFileStore {
    fn read(&self) -> Result<Vec<StoredRule>, RewriteError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "rule store does not exist yet, starting empty");
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| RewriteError::store("read", format!("{}: {}", self.path.display(), e)))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let rules: Vec<StoredRule> = serde_json::from_str(&content)?;
        debug!(path = %self.path.display(), rules = rules.len(), "rule store read");
        Ok(rules)
    }

    fn write(&mut self, rules: &[StoredRule]) -> Result<(), RewriteError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| RewriteError::store("write", format!("{}: {}", parent.display(), e)))?;
        }

        let content = serde_json::to_string_pretty(rules)?;
        std::fs::write(&self.path, content)
            .map_err(|e| RewriteError::store("write", format!("{}: {}", self.path.display(), e)))?;

        info!(path = %self.path.display(), rules = rules.len(), "rule store written");
        Ok(())
    }
}
