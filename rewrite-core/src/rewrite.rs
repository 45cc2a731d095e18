//! Applying committed rules to URLs
//!
//! Rules run in list order and each rule sees the output of the previous one.

use regex::Regex;
use tracing::warn;

use crate::rule::StoredRule;

#[derive(Debug, Clone)]
enum Matcher {
    Literal(String),
    Pattern(Regex),
}

#[derive(Debug, Clone)]
struct CompiledRule {
    matcher: Matcher,
    replace: String,
}

/// A rule list compiled once for repeated application
#[derive(Debug, Clone, Default)]
pub struct Rewriter {
    rules: Vec<CompiledRule>,
}

impl Rewriter {
    /// Compile `rules`, skipping any that could not apply.
    pub fn new(rules: &[StoredRule]) -> Self {
        let rules = rules
            .iter()
            .filter_map(|rule| {
                if rule.pattern.is_empty() {
                    warn!(id = %rule.id, "skipping rewrite rule with empty match");
                    return None;
                }
                let matcher = if rule.is_regex {
                    match Regex::new(&rule.pattern) {
                        Ok(re) => Matcher::Pattern(re),
                        Err(e) => {
                            warn!(id = %rule.id, "skipping rewrite rule with invalid regex '{}': {}", rule.pattern, e);
                            return None;
                        }
                    }
                } else {
                    Matcher::Literal(rule.pattern.clone())
                };
                let replace = match &matcher {
                    Matcher::Pattern(_) => braced_group_refs(&rule.replace),
                    Matcher::Literal(_) => rule.replace.clone(),
                };
                Some(CompiledRule { matcher, replace })
            })
            .collect();

        Self { rules }
    }

    /// Number of rules that will be applied
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn apply(&self, url: &str) -> String {
        self.rules
            .iter()
            .fold(url.to_string(), |current, rule| match &rule.matcher {
                Matcher::Literal(needle) => current.replace(needle.as_str(), &rule.replace),
                Matcher::Pattern(re) => re.replace_all(&current, rule.replace.as_str()).into_owned(),
            })
    }
}

/// Wrap numbered group references in braces so `$1_embed` means group 1
/// followed by `_embed`, not a group named `1_embed`.
fn braced_group_refs(replace: &str) -> String {
    let mut out = String::with_capacity(replace.len());
    let mut chars = replace.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                out.push_str("$$");
            }
            Some(d) if d.is_ascii_digit() => {
                out.push_str("${");
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                    out.push(d);
                    chars.next();
                }
                out.push('}');
            }
            _ => out.push('$'),
        }
    }
    out
}

/// Apply `rules` to `url` in order
pub fn apply_rewrites(url: &str, rules: &[StoredRule]) -> String {
    Rewriter::new(rules).apply(url)
}
