//! The always-present "new rule" editor

use tracing::{debug, info};

use crate::error::RewriteError;
use crate::ids::{fresh_id, IdGenerator, RuleId};
use crate::rule::{Rule, RuleFields};
use crate::validator::{validate_fields, Validation};

/// Local editor state for a rule that does not exist yet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftSlot {
    fields: RuleFields,
    validation: Validation,
}

impl DraftSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &RuleFields {
        &self.fields
    }

    pub fn validation(&self) -> &Validation {
        &self.validation
    }

    /// Whether the save control is active
    pub fn can_save(&self) -> bool {
        self.validation.valid
    }

    pub fn set_fields(&mut self, fields: RuleFields) {
        self.validation = validate_fields(&fields);
        self.fields = fields;
    }

    pub fn set_match(&mut self, pattern: impl Into<String>) {
        let mut fields = self.fields.clone();
        fields.pattern = pattern.into();
        self.set_fields(fields);
    }

    pub fn set_replace(&mut self, replace: impl Into<String>) {
        let mut fields = self.fields.clone();
        fields.replace = replace.into();
        self.set_fields(fields);
    }

    pub fn set_regex(&mut self, is_regex: bool) {
        let mut fields = self.fields.clone();
        fields.is_regex = is_regex;
        self.set_fields(fields);
    }

    /// Discard the draft
    pub fn clear(&mut self) {
        self.set_fields(RuleFields::default());
    }

    /// Promote the draft into a new rule.
    ///
    /// Returns `Ok(None)` without touching the draft when it is invalid.
    /// Otherwise the new rule gets an id for which `is_taken` is false, is
    /// marked Dirty, and the draft is cleared.
    pub fn save<G, F>(
        &mut self,
        ids: &mut G,
        is_taken: F,
        max_attempts: u32,
    ) -> Result<Option<Rule>, RewriteError>
    where
        G: IdGenerator + ?Sized,
        F: Fn(&RuleId) -> bool,
    {
        // Fields may have been set through a stale path; never trust the cached result
        self.validation = validate_fields(&self.fields);
        if !self.validation.valid {
            debug!(issue = ?self.validation.issue(), "draft save ignored, draft is invalid");
            return Ok(None);
        }

        let id = fresh_id(ids, is_taken, max_attempts)?;
        let rule = Rule::created(id, std::mem::take(&mut self.fields));
        self.clear();

        info!(id = %rule.id, "draft promoted to rule");
        Ok(Some(rule))
    }
}
