//! Configuration types and utilities

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::RewriteError;

pub const ENV_ID_LENGTH: &str = "URL_REWRITE_ID_LENGTH";
pub const ENV_MAX_ID_ATTEMPTS: &str = "URL_REWRITE_MAX_ID_ATTEMPTS";
pub const ENV_PENDING_FEEDBACK: &str = "URL_REWRITE_PENDING_FEEDBACK";

/// Rule editor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Characters in a generated rule identifier
    pub id_length: usize,
    /// How often identifier generation is retried on collision
    pub max_id_attempts: u32,
    /// Keep rules pending deletion visible in the working list until commit
    pub pending_feedback: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            id_length: 8,
            max_id_attempts: 16,
            pending_feedback: true,
        }
    }
}

impl EditorConfig {
    /// Load configuration from an optional JSON file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, RewriteError> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Like [`EditorConfig::load`] with an explicit environment lookup
    pub fn load_with_env<F>(path: Option<&Path>, env: F) -> Result<Self, RewriteError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    RewriteError::configuration(
                        "file",
                        &format!("failed to read {}: {}", path.display(), e),
                    )
                })?;
                serde_json::from_str(&content).map_err(|e| {
                    RewriteError::configuration(
                        "file",
                        &format!("failed to parse {}: {}", path.display(), e),
                    )
                })?
            }
            None => EditorConfig::default(),
        };

        if let Some(value) = env(ENV_ID_LENGTH) {
            config.id_length = value
                .parse()
                .map_err(|_| RewriteError::configuration(ENV_ID_LENGTH, "expected an integer"))?;
        }
        if let Some(value) = env(ENV_MAX_ID_ATTEMPTS) {
            config.max_id_attempts = value.parse().map_err(|_| {
                RewriteError::configuration(ENV_MAX_ID_ATTEMPTS, "expected an integer")
            })?;
        }
        if let Some(value) = env(ENV_PENDING_FEEDBACK) {
            config.pending_feedback = parse_bool(&value).ok_or_else(|| {
                RewriteError::configuration(ENV_PENDING_FEEDBACK, "expected true or false")
            })?;
        }

        config.validate()?;
        debug!(?config, "editor configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RewriteError> {
        if !(4..=32).contains(&self.id_length) {
            return Err(RewriteError::configuration(
                "id_length",
                "must be between 4 and 32",
            ));
        }
        if self.max_id_attempts == 0 {
            return Err(RewriteError::configuration(
                "max_id_attempts",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
