//! Derives the value proposed for persistence from the working list

use tracing::debug;

use crate::rule::{Rule, StoredRule};

/// The commit candidate plus the aggregate validity flag handed to the form host
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Projection {
    /// Working list without pending deletions, stripped to the persisted shape
    pub candidate: Vec<StoredRule>,
    /// True iff every rule not pending deletion is valid
    pub committable: bool,
    /// Number of rules not pending deletion that are invalid
    pub invalid: usize,
}

pub fn project(working: &[Rule]) -> Projection {
    let live: Vec<&Rule> = working.iter().filter(|r| !r.is_pending_delete()).collect();
    let invalid = live.iter().filter(|r| !r.valid()).count();
    let candidate = live.iter().map(|r| r.to_stored()).collect::<Vec<_>>();

    debug!(rules = candidate.len(), invalid, "projected commit candidate");
    Projection {
        candidate,
        committable: invalid == 0,
        invalid,
    }
}
