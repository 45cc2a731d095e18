//! Editor session
//!
//! Owns the baseline, the working list and the draft slot for as long as the
//! editor is open. Every action runs the same pipeline synchronously:
//! validator, state machine, reconciler, projector. Dropping the session
//! discards everything that was not confirmed.

use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::draft::DraftSlot;
use crate::error::RewriteError;
use crate::ids::{fresh_id, IdGenerator, RandomIdGenerator, RuleId};
use crate::projector::{project, Projection};
use crate::reconcile::{reconcile, RuleChange};
use crate::rule::{EditState, Rule, RuleFields, StoredRule};
use crate::state::{transition, RuleEvent, Transition};
use crate::store::RuleStore;
use crate::Result;

pub struct EditorSession<G: IdGenerator = RandomIdGenerator> {
    config: EditorConfig,
    baseline: Vec<StoredRule>,
    baseline_index: HashMap<RuleId, RuleFields>,
    working: Vec<Rule>,
    draft: DraftSlot,
    ids: G,
    projection: Projection,
}

impl EditorSession<RandomIdGenerator> {
    /// Read the baseline from `store` and open an editor on it
    pub fn open<S: RuleStore + ?Sized>(store: &S, config: EditorConfig) -> Result<Self> {
        config.validate()?;
        let baseline = store.read()?;
        let ids = RandomIdGenerator::new(config.id_length);
        Ok(Self::from_baseline(baseline, config, ids))
    }
}

fn index(baseline: &[StoredRule]) -> HashMap<RuleId, RuleFields> {
    baseline
        .iter()
        .map(|rule| (rule.id.clone(), rule.fields()))
        .collect()
}

impl<G: IdGenerator> EditorSession<G> {
    pub fn from_baseline(baseline: Vec<StoredRule>, config: EditorConfig, ids: G) -> Self {
        let mut unique = Vec::with_capacity(baseline.len());
        let mut seen = std::collections::HashSet::new();
        for rule in baseline {
            if seen.insert(rule.id.clone()) {
                unique.push(rule);
            } else {
                warn!(id = %rule.id, "duplicate id in persisted rules, keeping the first");
            }
        }

        let working: Vec<Rule> = unique.iter().map(Rule::from_stored).collect();
        let projection = project(&working);
        debug!(rules = working.len(), committable = projection.committable, "editor session opened");

        Self {
            config,
            baseline_index: index(&unique),
            baseline: unique,
            working,
            draft: DraftSlot::new(),
            ids,
            projection,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn rules(&self) -> &[Rule] {
        &self.working
    }

    pub fn rule(&self, id: &RuleId) -> Option<&Rule> {
        self.working.iter().find(|rule| &rule.id == id)
    }

    pub fn baseline(&self) -> &[StoredRule] {
        &self.baseline
    }

    pub fn draft(&self) -> &DraftSlot {
        &self.draft
    }

    /// Draft fields are local and revalidated on every setter
    pub fn draft_mut(&mut self) -> &mut DraftSlot {
        &mut self.draft
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn commit_candidate(&self) -> &[StoredRule] {
        &self.projection.candidate
    }

    pub fn is_committable(&self) -> bool {
        self.projection.committable
    }

    /// Whether confirming would change what is persisted
    pub fn is_modified(&self) -> bool {
        self.projection.candidate != self.baseline
    }

    /// Rules that currently block the commit
    pub fn invalid_rules(&self) -> impl Iterator<Item = &Rule> {
        self.working
            .iter()
            .filter(|rule| !rule.is_pending_delete() && !rule.valid())
    }

    /// Replace all fields of an existing rule
    pub fn edit(&mut self, id: &RuleId, fields: RuleFields) -> Result<()> {
        self.dispatch(id, RuleEvent::Edit(fields))
    }

    pub fn set_match(&mut self, id: &RuleId, pattern: impl Into<String>) -> Result<()> {
        let mut fields = self.existing(id)?.fields.clone();
        fields.pattern = pattern.into();
        self.edit(id, fields)
    }

    pub fn set_replace(&mut self, id: &RuleId, replace: impl Into<String>) -> Result<()> {
        let mut fields = self.existing(id)?.fields.clone();
        fields.replace = replace.into();
        self.edit(id, fields)
    }

    pub fn set_regex(&mut self, id: &RuleId, is_regex: bool) -> Result<()> {
        let mut fields = self.existing(id)?.fields.clone();
        fields.is_regex = is_regex;
        self.edit(id, fields)
    }

    pub fn delete(&mut self, id: &RuleId) -> Result<()> {
        self.dispatch(id, RuleEvent::Delete)
    }

    /// Restore the baseline values of a rule, or drop it if it was never saved
    pub fn reset(&mut self, id: &RuleId) -> Result<()> {
        self.dispatch(id, RuleEvent::Reset)
    }

    /// Copy a rule's fields into a new rule appended to the working list
    pub fn duplicate(&mut self, id: &RuleId) -> Result<RuleId> {
        let fields = self.existing(id)?.fields.clone();
        let new_id = {
            let working = &self.working;
            let baseline = &self.baseline_index;
            fresh_id(
                &mut self.ids,
                |candidate| id_in_use(working, baseline, candidate),
                self.config.max_id_attempts,
            )?
        };

        // Goes through the validator again like any edit
        let copy = Rule::created(new_id.clone(), fields);
        info!(source = %id, id = %new_id, valid = copy.valid(), "rule duplicated");
        self.apply(RuleChange::Upsert(copy));
        Ok(new_id)
    }

    /// Promote the draft slot into a new rule.
    ///
    /// Returns `Ok(None)` when the draft is invalid, which leaves everything untouched.
    pub fn save_draft(&mut self) -> Result<Option<RuleId>> {
        let saved = {
            let working = &self.working;
            let baseline = &self.baseline_index;
            self.draft.save(
                &mut self.ids,
                |candidate| id_in_use(working, baseline, candidate),
                self.config.max_id_attempts,
            )?
        };

        Ok(saved.map(|rule| {
            let id = rule.id.clone();
            self.apply(RuleChange::Upsert(rule));
            id
        }))
    }

    /// The working list was persisted: it becomes the new baseline
    pub fn mark_committed(&mut self) {
        let working: Vec<Rule> = self
            .working
            .iter()
            .filter_map(|rule| {
                let before = self.baseline_index.get(&rule.id);
                match transition(rule, RuleEvent::Committed, before) {
                    Transition::Keep(next) => Some(next),
                    Transition::Remove => None,
                }
            })
            .collect();

        self.baseline = working.iter().map(Rule::to_stored).collect();
        self.baseline_index = index(&self.baseline);
        self.working = working;
        self.projection = project(&self.working);
        debug!(rules = self.working.len(), "session rebased on committed rules");
    }

    /// Confirm action of the form host.
    ///
    /// Writes the commit candidate only when every live rule is valid.
    pub fn confirm<S: RuleStore + ?Sized>(&mut self, store: &mut S) -> Result<()> {
        if !self.projection.committable {
            return Err(RewriteError::NotCommittable {
                invalid: self.projection.invalid,
            });
        }

        store.write(&self.projection.candidate)?;
        info!(rules = self.projection.candidate.len(), "rule set committed");
        self.mark_committed();
        Ok(())
    }

    fn existing(&self, id: &RuleId) -> Result<&Rule> {
        self.rule(id).ok_or_else(|| RewriteError::rule_not_found(id))
    }

    fn dispatch(&mut self, id: &RuleId, event: RuleEvent) -> Result<()> {
        let rule = self.existing(id)?;
        let change = match transition(rule, event, self.baseline_index.get(id)) {
            Transition::Keep(next) => RuleChange::Upsert(next),
            Transition::Remove => RuleChange::Remove(id.clone()),
        };
        self.apply(change);
        Ok(())
    }

    fn apply(&mut self, change: RuleChange) {
        let mut working = reconcile(&self.working, &change);
        if !self.config.pending_feedback {
            working.retain(|rule| rule.edit_state != EditState::PendingDelete);
        }
        self.working = working;
        self.projection = project(&self.working);
    }
}

fn id_in_use(working: &[Rule], baseline: &HashMap<RuleId, RuleFields>, id: &RuleId) -> bool {
    baseline.contains_key(id) || working.iter().any(|rule| &rule.id == id)
}
