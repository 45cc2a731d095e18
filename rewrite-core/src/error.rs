//! Error types for rule editing and persistence

use thiserror::Error;

/// Main error type for rewrite rule operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RewriteError {
    #[error("Invalid regex: {message}")]
    InvalidRegex { message: String },

    #[error("Incomplete rule: match and replace must both be non-empty")]
    IncompleteRule,

    #[error("Identifier collision: {id}")]
    KeyCollision { id: String },

    #[error("Identifier space exhausted after {attempts} attempts")]
    IdSpaceExhausted { attempts: u32 },

    #[error("Rule not found: {id}")]
    RuleNotFound { id: String },

    #[error("Rule set is not committable: {invalid} invalid rule(s)")]
    NotCommittable { invalid: usize },

    #[error("Store error: {operation} - {reason}")]
    Store { operation: String, reason: String },

    #[error("Serialization error: {error}")]
    Serialization { error: String },

    #[error("Configuration error: {component} - {reason}")]
    Configuration { component: String, reason: String },
}

impl RewriteError {
    /// Create a store error for the given operation
    pub fn store(operation: &str, reason: impl ToString) -> Self {
        Self::Store {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a configuration error
    pub fn configuration(component: &str, reason: &str) -> Self {
        Self::Configuration {
            component: component.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn rule_not_found(id: impl ToString) -> Self {
        Self::RuleNotFound { id: id.to_string() }
    }

    /// Check if the editor session can carry on after this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Local to a single rule or action
            RewriteError::InvalidRegex { .. } => true,
            RewriteError::IncompleteRule => true,
            RewriteError::KeyCollision { .. } => true,
            RewriteError::RuleNotFound { .. } => true,
            RewriteError::NotCommittable { .. } => true,

            RewriteError::IdSpaceExhausted { .. } => false,
            RewriteError::Store { .. } => false,
            RewriteError::Serialization { .. } => false,
            RewriteError::Configuration { .. } => false,
        }
    }

    /// Whether the error should be shown next to the rule that caused it.
    ///
    /// Incomplete rules are treated as "still typing" and stay silent, and
    /// identifier collisions are resolved internally.
    pub fn is_user_visible(&self) -> bool {
        !matches!(
            self,
            RewriteError::IncompleteRule | RewriteError::KeyCollision { .. }
        )
    }
}

impl From<serde_json::Error> for RewriteError {
    fn from(err: serde_json::Error) -> Self {
        RewriteError::Serialization {
            error: err.to_string(),
        }
    }
}
