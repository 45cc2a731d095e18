//! Rule validation
//!
//! Pure and cheap enough to run on every keystroke. The only costly step is
//! compiling the match pattern when the rule is a regex rule.

use regex::Regex;

use crate::error::RewriteError;
use crate::rule::RuleFields;

/// Outcome of validating one rule's fields
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validation {
    /// True iff match and replace are non-empty and a regex match compiles
    pub valid: bool,
    /// Regex engine diagnostic, only set for regex rules that fail to compile
    pub error: Option<String>,
}

impl Validation {
    /// Classify an invalid result.
    ///
    /// Returns `None` for valid rules.
    pub fn issue(&self) -> Option<RewriteError> {
        if let Some(message) = &self.error {
            return Some(RewriteError::InvalidRegex {
                message: message.clone(),
            });
        }
        if !self.valid {
            return Some(RewriteError::IncompleteRule);
        }
        None
    }
}

/// Validate a rule given as loose fields
pub fn validate(pattern: &str, replace: &str, is_regex: bool) -> Validation {
    let mut valid = !pattern.is_empty() && !replace.is_empty();
    let mut error = None;

    if is_regex {
        if let Err(e) = Regex::new(pattern) {
            error = Some(e.to_string());
            valid = false;
        }
    }

    Validation { valid, error }
}

pub fn validate_fields(fields: &RuleFields) -> Validation {
    validate(&fields.pattern, &fields.replace, fields.is_regex)
}
