use clap::Parser;
use rewrite_cli::{run, Cli, Outcome};
use std::path::Path;
use tempfile::TempDir;

fn invoke(store: &Path, args: &[&str]) -> (Outcome, String) {
    let store = store.to_string_lossy().to_string();
    let mut argv = vec!["url-rewrite", "--store", store.as_str()];
    argv.extend_from_slice(args);

    let cli = Cli::try_parse_from(argv).expect("arguments should parse");
    let mut out = Vec::new();
    let outcome = run(&cli, &mut out).expect("command should run");
    (outcome, String::from_utf8(out).unwrap())
}

fn stored(store: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(store).unwrap()).unwrap()
}

fn first_id(store: &Path) -> String {
    stored(store)[0]["id"].as_str().unwrap().to_string()
}

#[test]
fn test_add_list_apply() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("rules.json");

    let (outcome, output) = invoke(
        &store,
        &["add", "--match", r"^https://(www\.)?x\.com/", "--replace", "https://fixupx.com/", "--regex"],
    );
    assert_eq!(outcome, Outcome::Success);
    assert!(output.contains("added"));
    assert!(output.contains("saved 1 rule(s)"));

    let (_, listing) = invoke(&store, &["list"]);
    assert!(listing.contains("regex"));
    assert!(listing.contains("fixupx.com"));

    let (_, rewritten) = invoke(&store, &["apply", "https://x.com/user/status/42", "https://example.com/"]);
    let lines: Vec<&str> = rewritten.lines().collect();
    assert_eq!(lines, vec!["https://fixupx.com/user/status/42", "https://example.com/"]);
}

#[test]
fn test_add_invalid_regex_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("rules.json");

    let (outcome, output) = invoke(&store, &["add", "--match", "(unterminated", "--replace", "x", "--regex"]);
    assert_eq!(outcome, Outcome::Rejected);
    assert!(output.contains("Invalid regex"));
    assert!(!store.exists());
}

#[test]
fn test_edit_into_invalid_state_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("rules.json");
    invoke(&store, &["add", "--match", "foo", "--replace", "bar"]);
    let id = first_id(&store);

    let (outcome, output) = invoke(&store, &["edit", &id, "--match", "[", "--regex", "true"]);
    assert_eq!(outcome, Outcome::Rejected);
    assert!(output.contains("nothing saved"));
    assert_eq!(stored(&store)[0]["match"], "foo");

    let (outcome, _) = invoke(&store, &["edit", &id, "--replace", "baz"]);
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(stored(&store)[0]["replace"], "baz");
}

#[test]
fn test_duplicate_and_delete() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("rules.json");
    invoke(&store, &["add", "--match", "a", "--replace", "b"]);
    let id = first_id(&store);

    let (outcome, output) = invoke(&store, &["duplicate", &id]);
    assert_eq!(outcome, Outcome::Success);
    assert!(output.contains("duplicated"));
    let rules = stored(&store);
    assert_eq!(rules.as_array().unwrap().len(), 2);
    assert_ne!(rules[0]["id"], rules[1]["id"]);
    assert_eq!(rules[0]["match"], rules[1]["match"]);

    invoke(&store, &["delete", &id]);
    let rules = stored(&store);
    assert_eq!(rules.as_array().unwrap().len(), 1);
    assert_ne!(rules[0]["id"].as_str().unwrap(), id);
}

#[test]
fn test_check_reports_invalid_stored_rules() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("rules.json");
    std::fs::write(
        &store,
        r#"[{"match":"(","replace":"x","isRegex":true,"key":"legacy1","isValid":false}]"#,
    )
    .unwrap();

    let (outcome, output) = invoke(&store, &["check"]);
    assert_eq!(outcome, Outcome::Rejected);
    assert!(output.contains("invalid legacy1"));

    // Deleting the broken rule makes the set committable again
    let (outcome, _) = invoke(&store, &["delete", "legacy1"]);
    assert_eq!(outcome, Outcome::Success);
    let (outcome, output) = invoke(&store, &["check"]);
    assert_eq!(outcome, Outcome::Success);
    assert!(output.contains("0 rule(s), all valid"));
}

#[test]
fn test_incomplete_rules_are_listed_without_message() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("rules.json");
    std::fs::write(
        &store,
        r#"[{"match":"a","replace":"","isRegex":false,"id":"blank"},{"match":"[","replace":"x","isRegex":true,"id":"broken"}]"#,
    )
    .unwrap();

    let (outcome, output) = invoke(&store, &["check"]);
    assert_eq!(outcome, Outcome::Rejected);
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], "invalid blank");
    assert!(lines[1].starts_with("invalid broken: Invalid regex"));
    assert!(!output.contains("Incomplete"));

    let (outcome, output) = invoke(&store, &["add", "--match", "b", "--replace", ""]);
    assert_eq!(outcome, Outcome::Rejected);
    assert_eq!(output.trim_end(), "rule not added");
}

#[test]
fn test_unknown_rule_is_an_error() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("rules.json");

    let cli = Cli::try_parse_from(["url-rewrite", "--store", store.to_str().unwrap(), "delete", "missing"]).unwrap();
    let mut out = Vec::new();
    let err = run(&cli, &mut out).unwrap_err();
    assert!(err.to_string().contains("Rule not found: missing"));
}

#[test]
fn test_apply_requires_urls() {
    assert!(Cli::try_parse_from(["url-rewrite", "apply"]).is_err());
}
