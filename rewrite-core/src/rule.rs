//! Rewrite rule data model

use serde::{Deserialize, Serialize};

use crate::ids::RuleId;
use crate::validator::{validate_fields, Validation};

/// The user-editable part of a rule
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleFields {
    /// Literal substring or, for regex rules, a regular expression
    #[serde(rename = "match")]
    pub pattern: String,
    /// Replacement text, may reference capture groups for regex rules
    pub replace: String,
    #[serde(rename = "isRegex", default)]
    pub is_regex: bool,
}

impl RuleFields {
    pub fn new(pattern: impl Into<String>, replace: impl Into<String>, is_regex: bool) -> Self {
        Self {
            pattern: pattern.into(),
            replace: replace.into(),
            is_regex,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty() && self.replace.is_empty() && !self.is_regex
    }
}

/// Per-rule edit state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditState {
    /// Equal to the baseline, nothing pending
    Pristine,
    /// Differs from the baseline, written on commit
    Dirty,
    /// Removed on commit
    PendingDelete,
    /// Lives in the draft slot only
    Draft,
}

/// A rule in the working list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub id: RuleId,
    pub fields: RuleFields,
    pub edit_state: EditState,
    /// Never part of the baseline
    pub new_entry: bool,
    validation: Validation,
}

impl Rule {
    /// A rule loaded from the persisted store
    pub fn from_stored(stored: &StoredRule) -> Self {
        let fields = stored.fields();
        Self {
            id: stored.id.clone(),
            validation: validate_fields(&fields),
            fields,
            edit_state: EditState::Pristine,
            new_entry: false,
        }
    }

    /// A rule created during the session (draft promotion or duplication)
    pub fn created(id: RuleId, fields: RuleFields) -> Self {
        Self {
            id,
            validation: validate_fields(&fields),
            fields,
            edit_state: EditState::Dirty,
            new_entry: true,
        }
    }

    /// Replace the fields and revalidate.
    pub fn set_fields(&mut self, fields: RuleFields) {
        self.validation = validate_fields(&fields);
        self.fields = fields;
    }

    pub fn valid(&self) -> bool {
        self.validation.valid
    }

    pub fn error(&self) -> Option<&str> {
        self.validation.error.as_deref()
    }

    pub fn validation(&self) -> &Validation {
        &self.validation
    }

    pub fn is_pending_delete(&self) -> bool {
        self.edit_state == EditState::PendingDelete
    }

    /// Strip bookkeeping for persistence
    pub fn to_stored(&self) -> StoredRule {
        StoredRule {
            pattern: self.fields.pattern.clone(),
            replace: self.fields.replace.clone(),
            is_regex: self.fields.is_regex,
            id: self.id.clone(),
        }
    }
}

/// Persisted shape of a rule, also the commit candidate element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRule {
    #[serde(rename = "match")]
    pub pattern: String,
    pub replace: String,
    #[serde(rename = "isRegex", default)]
    pub is_regex: bool,
    #[serde(alias = "key")]
    pub id: RuleId,
}

impl StoredRule {
    pub fn new(id: impl Into<RuleId>, fields: RuleFields) -> Self {
        Self {
            pattern: fields.pattern,
            replace: fields.replace,
            is_regex: fields.is_regex,
            id: id.into(),
        }
    }

    pub fn fields(&self) -> RuleFields {
        RuleFields {
            pattern: self.pattern.clone(),
            replace: self.replace.clone(),
            is_regex: self.is_regex,
        }
    }
}
