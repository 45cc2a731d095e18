//! Rewrite Core Library
//!
//! This library provides the rule editing engine behind URL rewrite settings:
//! rule validation, per-rule edit state, reconciliation of edits into the
//! working rule list, the draft slot for new rules, and projection of the
//! value that gets persisted. It also contains the persisted store contract
//! and the function that applies committed rules to URLs.

/// Configuration types and utilities
pub mod config;

/// Error types for rule operations
pub mod error;

pub mod draft;
pub mod ids;
pub mod projector;
pub mod reconcile;
pub mod rewrite;
pub mod rule;
pub mod session;
pub mod state;
pub mod store;
pub mod validator;

pub use config::EditorConfig;
pub use draft::DraftSlot;
pub use error::RewriteError;
pub use ids::{fresh_id, IdGenerator, RandomIdGenerator, RuleId};
pub use projector::{project, Projection};
pub use reconcile::{reconcile, RuleChange};
pub use rewrite::{apply_rewrites, Rewriter};
pub use rule::{EditState, Rule, RuleFields, StoredRule};
pub use session::EditorSession;
pub use state::{transition, RuleEvent, Transition};
pub use store::{JsonFileStore, MemoryStore, RuleStore};
pub use validator::{validate, Validation};

/// Result type alias for rule operations
pub type Result<T> = std::result::Result<T, RewriteError>;
