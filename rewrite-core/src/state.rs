//! Per-rule state machine
//!
//! Every user action on an existing rule, and the external "committed"
//! notification, is turned into a [`RuleEvent`] and run through
//! [`transition`]. The result is either the rule's next value or a request to
//! drop it from the working list.

use tracing::debug;

use crate::rule::{EditState, Rule, RuleFields};

/// Input to the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleEvent {
    /// Field edit carrying the full resulting field values
    Edit(RuleFields),
    Delete,
    /// Restore baseline values and clear any pending delete
    Reset,
    /// The working list was persisted
    Committed,
}

/// Output of the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Keep(Rule),
    Remove,
}

/// Pristine when the fields equal the baseline record, Dirty otherwise.
///
/// A rule without a baseline record is always Dirty.
pub fn edit_state_for(fields: &RuleFields, baseline: Option<&RuleFields>) -> EditState {
    match baseline {
        Some(before) if before == fields => EditState::Pristine,
        _ => EditState::Dirty,
    }
}

/// Compute the next value of `rule` for `event`.
///
/// `baseline` is the last-persisted record with the same id, if any.
pub fn transition(rule: &Rule, event: RuleEvent, baseline: Option<&RuleFields>) -> Transition {
    if rule.edit_state == EditState::Draft {
        debug!(id = %rule.id, ?event, "draft rules are not driven by the state machine");
        return Transition::Keep(rule.clone());
    }

    let from = rule.edit_state;
    let mut next = rule.clone();

    match event {
        RuleEvent::Edit(fields) => {
            next.set_fields(fields);
            // Edits do not undo a pending delete, only reset does
            if from != EditState::PendingDelete {
                next.edit_state = edit_state_for(&next.fields, baseline);
            }
        }
        RuleEvent::Delete => {
            next.edit_state = EditState::PendingDelete;
        }
        RuleEvent::Reset => match baseline {
            Some(before) => {
                next.set_fields(before.clone());
                next.edit_state = EditState::Pristine;
            }
            None => {
                debug!(id = %rule.id, ?from, "reset of never-saved rule removes it");
                return Transition::Remove;
            }
        },
        RuleEvent::Committed => {
            if from == EditState::PendingDelete {
                return Transition::Remove;
            }
            next.edit_state = EditState::Pristine;
            next.new_entry = false;
        }
    }

    debug!(id = %rule.id, ?from, to = ?next.edit_state, "rule transition");
    Transition::Keep(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::RuleId;
    use crate::rule::StoredRule;

    fn saved(pattern: &str, replace: &str) -> (Rule, RuleFields) {
        let fields = RuleFields::new(pattern, replace, false);
        let rule = Rule::from_stored(&StoredRule::new("k1", fields.clone()));
        (rule, fields)
    }

    fn kept(t: Transition) -> Rule {
        match t {
            Transition::Keep(rule) => rule,
            Transition::Remove => panic!("expected rule to be kept"),
        }
    }

    #[test]
    fn test_pristine_to_dirty_and_back() {
        let (rule, base) = saved("foo", "bar");

        let dirty = kept(transition(
            &rule,
            RuleEvent::Edit(RuleFields::new("foo", "baz", false)),
            Some(&base),
        ));
        assert_eq!(dirty.edit_state, EditState::Dirty);

        let restored = kept(transition(&dirty, RuleEvent::Edit(base.clone()), Some(&base)));
        assert_eq!(restored.edit_state, EditState::Pristine);
    }

    #[test]
    fn test_toggling_regex_is_a_change() {
        let (rule, base) = saved("foo", "bar");
        let next = kept(transition(
            &rule,
            RuleEvent::Edit(RuleFields::new("foo", "bar", true)),
            Some(&base),
        ));
        assert_eq!(next.edit_state, EditState::Dirty);
    }

    #[test]
    fn test_delete_then_reset_restores_baseline() {
        let (rule, base) = saved("foo", "bar");
        let edited = kept(transition(
            &rule,
            RuleEvent::Edit(RuleFields::new("x", "y", false)),
            Some(&base),
        ));
        let deleted = kept(transition(&edited, RuleEvent::Delete, Some(&base)));
        assert_eq!(deleted.edit_state, EditState::PendingDelete);

        let reset = kept(transition(&deleted, RuleEvent::Reset, Some(&base)));
        assert_eq!(reset.edit_state, EditState::Pristine);
        assert_eq!(reset.fields, base);
        assert_eq!(reset, rule);
    }

    #[test]
    fn test_edit_keeps_pending_delete() {
        let (rule, base) = saved("foo", "bar");
        let deleted = kept(transition(&rule, RuleEvent::Delete, Some(&base)));
        let edited = kept(transition(
            &deleted,
            RuleEvent::Edit(RuleFields::new("foo", "qux", false)),
            Some(&base),
        ));
        assert_eq!(edited.edit_state, EditState::PendingDelete);
        assert_eq!(edited.fields.replace, "qux");
    }

    #[test]
    fn test_reset_without_baseline_removes() {
        let rule = Rule::created(RuleId::from("n1"), RuleFields::new("a", "b", false));
        assert_eq!(transition(&rule, RuleEvent::Reset, None), Transition::Remove);
    }

    #[test]
    fn test_new_rule_stays_dirty_without_baseline() {
        let rule = Rule::created(RuleId::from("n1"), RuleFields::new("a", "b", false));
        let next = kept(transition(
            &rule,
            RuleEvent::Edit(RuleFields::new("a", "c", false)),
            None,
        ));
        assert_eq!(next.edit_state, EditState::Dirty);
        assert!(next.new_entry);
    }

    #[test]
    fn test_committed() {
        let rule = Rule::created(RuleId::from("n1"), RuleFields::new("a", "b", false));
        let committed = kept(transition(&rule, RuleEvent::Committed, None));
        assert_eq!(committed.edit_state, EditState::Pristine);
        assert!(!committed.new_entry);

        let (saved_rule, base) = saved("foo", "bar");
        let deleted = kept(transition(&saved_rule, RuleEvent::Delete, Some(&base)));
        assert_eq!(
            transition(&deleted, RuleEvent::Committed, Some(&base)),
            Transition::Remove
        );
    }

    #[test]
    fn test_draft_is_inert() {
        let mut rule = Rule::created(RuleId::from("d"), RuleFields::default());
        rule.edit_state = EditState::Draft;
        let next = kept(transition(&rule, RuleEvent::Delete, None));
        assert_eq!(next.edit_state, EditState::Draft);
    }
}
