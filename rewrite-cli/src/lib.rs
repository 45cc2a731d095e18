//! URL Rewrite command line tool
//!
//! Acts as the form host for the rule editor: every invocation opens an
//! editor session on a JSON rule store, applies one action and confirms it.
//! Nothing is written unless every remaining rule is valid.

use anyhow::Context;
use clap::{Parser, Subcommand};
use rewrite_core::{
    EditorConfig, EditorSession, JsonFileStore, RewriteError, Rewriter, Rule, RuleFields, RuleId,
    Validation,
};
use std::io::Write;
use std::path::PathBuf;

pub mod logging;

#[derive(Parser, Debug, Clone)]
#[command(name = "url-rewrite", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON rule store
    #[arg(long, default_value = "url-rewrites.json")]
    pub store: PathBuf,

    /// Path to an editor configuration file (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write logs to this file in addition to stderr
    #[arg(long)]
    pub log_file: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the stored rules in application order
    List,

    /// Create a new rule
    Add {
        #[arg(long = "match")]
        pattern: String,
        #[arg(long)]
        replace: String,
        /// Treat the match as a regular expression
        #[arg(long)]
        regex: bool,
    },

    /// Change fields of an existing rule
    Edit {
        id: String,
        #[arg(long = "match")]
        pattern: Option<String>,
        #[arg(long)]
        replace: Option<String>,
        #[arg(long)]
        regex: Option<bool>,
    },

    /// Remove a rule
    Delete { id: String },

    /// Copy a rule under a new id
    Duplicate { id: String },

    /// Validate the stored rules
    Check,

    /// Rewrite URLs with the stored rules
    Apply {
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

/// Result of a command that ran to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The rule set is not committable, nothing was written
    Rejected,
}

/// Execute `cli`, writing user-facing output to `out`
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> anyhow::Result<Outcome> {
    let config = EditorConfig::load(cli.config.as_deref()).context("loading editor configuration")?;
    let mut store = JsonFileStore::new(&cli.store);
    let mut session = EditorSession::open(&store, config)
        .with_context(|| format!("opening rule store {}", cli.store.display()))?;

    match &cli.command {
        Command::List => {
            print_rules(out, session.rules())?;
            Ok(Outcome::Success)
        }
        Command::Add {
            pattern,
            replace,
            regex,
        } => {
            session
                .draft_mut()
                .set_fields(RuleFields::new(pattern.as_str(), replace.as_str(), *regex));
            match session.save_draft()? {
                Some(id) => {
                    writeln!(out, "added {}", id)?;
                    confirm(&mut session, &mut store, out)
                }
                None => {
                    match visible_issue(session.draft().validation()) {
                        Some(reason) => writeln!(out, "rule not added: {}", reason)?,
                        None => writeln!(out, "rule not added")?,
                    }
                    Ok(Outcome::Rejected)
                }
            }
        }
        Command::Edit {
            id,
            pattern,
            replace,
            regex,
        } => {
            let id = RuleId::from(id.as_str());
            let mut fields = session
                .rule(&id)
                .ok_or_else(|| RewriteError::rule_not_found(&id))?
                .fields
                .clone();
            if let Some(pattern) = pattern {
                fields.pattern = pattern.clone();
            }
            if let Some(replace) = replace {
                fields.replace = replace.clone();
            }
            if let Some(regex) = regex {
                fields.is_regex = *regex;
            }
            session.edit(&id, fields)?;
            confirm(&mut session, &mut store, out)
        }
        Command::Delete { id } => {
            session.delete(&RuleId::from(id.as_str()))?;
            confirm(&mut session, &mut store, out)
        }
        Command::Duplicate { id } => {
            let copy = session.duplicate(&RuleId::from(id.as_str()))?;
            writeln!(out, "duplicated {} as {}", id, copy)?;
            confirm(&mut session, &mut store, out)
        }
        Command::Check => {
            if session.is_committable() {
                writeln!(out, "{} rule(s), all valid", session.rules().len())?;
                Ok(Outcome::Success)
            } else {
                print_invalid(out, &session)?;
                Ok(Outcome::Rejected)
            }
        }
        Command::Apply { urls } => {
            let rewriter = Rewriter::new(session.baseline());
            for url in urls {
                writeln!(out, "{}", rewriter.apply(url))?;
            }
            Ok(Outcome::Success)
        }
    }
}

fn confirm<W: Write>(
    session: &mut EditorSession,
    store: &mut JsonFileStore,
    out: &mut W,
) -> anyhow::Result<Outcome> {
    if !session.is_modified() {
        writeln!(out, "no changes")?;
        return Ok(Outcome::Success);
    }

    match session.confirm(store) {
        Ok(()) => {
            writeln!(out, "saved {} rule(s)", session.rules().len())?;
            Ok(Outcome::Success)
        }
        Err(RewriteError::NotCommittable { .. }) => {
            print_invalid(out, session)?;
            writeln!(out, "nothing saved")?;
            Ok(Outcome::Rejected)
        }
        Err(e) => Err(e).context("saving rules"),
    }
}

fn print_invalid<W: Write>(out: &mut W, session: &EditorSession) -> anyhow::Result<()> {
    for rule in session.invalid_rules() {
        match visible_issue(rule.validation()) {
            Some(reason) => writeln!(out, "invalid {}: {}", rule.id, reason)?,
            None => writeln!(out, "invalid {}", rule.id)?,
        }
    }
    Ok(())
}

/// The validation error worth showing; incomplete rules carry no message
fn visible_issue(validation: &Validation) -> Option<RewriteError> {
    validation.issue().filter(RewriteError::is_user_visible)
}

fn print_rules<W: Write>(out: &mut W, rules: &[Rule]) -> anyhow::Result<()> {
    if rules.is_empty() {
        writeln!(out, "no rules")?;
        return Ok(());
    }

    let width = rules.iter().map(|r| r.id.as_str().len()).max().unwrap_or(2).max(2);
    writeln!(out, "{:<width$}  {:<5}  {:<7}  {} -> {}", "ID", "KIND", "STATUS", "MATCH", "REPLACE")?;
    for rule in rules {
        let kind = if rule.fields.is_regex { "regex" } else { "text" };
        let status = if rule.valid() { "ok" } else { "invalid" };
        writeln!(
            out,
            "{:<width$}  {:<5}  {:<7}  {} -> {}",
            rule.id, kind, status, rule.fields.pattern, rule.fields.replace
        )?;
    }
    Ok(())
}
