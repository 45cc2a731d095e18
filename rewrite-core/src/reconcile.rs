//! Folding single-rule changes into the working list

use tracing::{debug, warn};

use crate::ids::RuleId;
use crate::rule::Rule;

/// A change to one rule of the working list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleChange {
    /// Insert a new entry or overwrite the rule with the same id
    Upsert(Rule),
    Remove(RuleId),
}

impl RuleChange {
    pub fn id(&self) -> &RuleId {
        match self {
            RuleChange::Upsert(rule) => &rule.id,
            RuleChange::Remove(id) => id,
        }
    }
}

/// A rule created and deleted in the same session
fn is_tombstone(rule: &Rule) -> bool {
    rule.new_entry && rule.is_pending_delete()
}

/// Apply `change` to `working` and return the new working list.
///
/// New entries are appended, existing rules are overwritten in place (last
/// writer wins) so order is preserved. Never-saved rules pending deletion are
/// dropped instead of lingering as tombstones. Applying the same change twice
/// gives the same list as applying it once.
pub fn reconcile(working: &[Rule], change: &RuleChange) -> Vec<Rule> {
    let mut next = working.to_vec();

    match change {
        RuleChange::Upsert(incoming) => {
            match next.iter_mut().find(|rule| rule.id == incoming.id) {
                Some(existing) => *existing = incoming.clone(),
                None if incoming.new_entry => next.push(incoming.clone()),
                None => {
                    warn!(id = %incoming.id, "change addressed to unknown rule ignored");
                }
            }
        }
        RuleChange::Remove(id) => next.retain(|rule| &rule.id != id),
    }

    next.retain(|rule| !is_tombstone(rule));
    debug!(id = %change.id(), before = working.len(), after = next.len(), "reconciled working list");
    next
}
