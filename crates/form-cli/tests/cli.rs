use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SPEC: &str = r#"
id: contact
title: Contact us
fields:
  - name: email
    label: Email
    kind: email
  - name: topic
    label: Topic
    kind: select
    options:
      - { value: sales, label: Sales }
      - { value: other, label: Something else }
  - name: details
    label: Tell us more
    kind: textarea
    conditional:
      depends_on: topic
      equals: other
rules:
  email:
    required: true
    email: true
"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("greentic-form").expect("binary");
    cmd.env_remove("GREENTIC_FORM_CONFIG_POLICY");
    cmd
}

fn arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

#[test]
fn render_prints_visible_fields_only() {
    let dir = TempDir::new().expect("tempdir");
    let spec = write(&dir, "contact.yaml", SPEC);
    let values = write(&dir, "values.json", r#"{"topic":"sales"}"#);

    cli()
        .args(["render", "--spec", arg(&spec), "--values", arg(&values)])
        .assert()
        .success()
        .stdout(predicate::str::contains("data-field=\"topic\""))
        .stdout(predicate::str::contains("<option value=\"sales\" selected>Sales</option>"))
        .stdout(predicate::str::contains("data-field=\"details\"").not());
}

#[test]
fn render_shows_supplied_errors() {
    let dir = TempDir::new().expect("tempdir");
    let spec = write(&dir, "contact.yaml", SPEC);
    let errors = write(&dir, "errors.json", r#"{"email":"Enter a valid email address"}"#);

    cli()
        .args(["render", "--spec", arg(&spec), "--errors", arg(&errors)])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<p class=\"gf-error\" role=\"alert\">Enter a valid email address</p>",
        ));
}

#[test]
fn render_json_format() {
    let dir = TempDir::new().expect("tempdir");
    let spec = write(&dir, "contact.yaml", SPEC);
    let values = write(&dir, "values.json", r#"{"topic":"other"}"#);

    cli()
        .args([
            "render",
            "--spec",
            arg(&spec),
            "--values",
            arg(&values),
            "--format",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"control\": \"text_area\""));
}

#[test]
fn submit_invalid_exits_with_validation_code() {
    let dir = TempDir::new().expect("tempdir");
    let spec = write(&dir, "contact.yaml", SPEC);
    let values = write(&dir, "values.json", r#"{"email":"not-an-email"}"#);

    cli()
        .args(["submit", "--spec", arg(&spec), "--values", arg(&values)])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("\"ok\": false"))
        .stdout(predicate::str::contains("Enter a valid email address"));
}

#[test]
fn submit_valid_prints_all_values() {
    let dir = TempDir::new().expect("tempdir");
    let spec = write(&dir, "contact.yaml", SPEC);
    let values = write(
        &dir,
        "values.json",
        r#"{"email":"ada@example.com","topic":"sales","details":"hidden but kept"}"#,
    );

    cli()
        .args(["submit", "--spec", arg(&spec), "--values", arg(&values)])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ok\": true"))
        .stdout(predicate::str::contains("hidden but kept"));
}

#[test]
fn example_values_uses_first_option() {
    let dir = TempDir::new().expect("tempdir");
    let spec = write(&dir, "contact.yaml", SPEC);

    cli()
        .args(["example-values", "--spec", arg(&spec)])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"topic\": \"sales\""));
}

#[test]
fn missing_options_fail_unless_permissive() {
    let dir = TempDir::new().expect("tempdir");
    let spec = write(
        &dir,
        "broken.yaml",
        "fields:\n  - name: plan\n    label: Plan\n    kind: radio\n",
    );

    cli()
        .args(["render", "--spec", arg(&spec)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("requires at least one option"));

    cli()
        .env("GREENTIC_FORM_CONFIG_POLICY", "permissive")
        .args(["render", "--spec", arg(&spec)])
        .assert()
        .success()
        .stdout(predicate::str::contains("data-field=\"plan\""));
}

#[test]
fn env_policy_applies_when_config_file_omits_it() {
    let dir = TempDir::new().expect("tempdir");
    let spec = write(
        &dir,
        "broken.yaml",
        "fields:\n  - name: plan\n    label: Plan\n    kind: radio\n",
    );
    let config = write(&dir, "form.yaml", "validation_trigger: change\n");

    cli()
        .env("GREENTIC_FORM_CONFIG_POLICY", "permissive")
        .args(["render", "--spec", arg(&spec), "--config", arg(&config)])
        .assert()
        .success()
        .stdout(predicate::str::contains("data-field=\"plan\""));

    let strict = write(&dir, "strict.yaml", "policy: strict\n");
    cli()
        .env("GREENTIC_FORM_CONFIG_POLICY", "permissive")
        .args(["render", "--spec", arg(&spec), "--config", arg(&strict)])
        .assert()
        .code(1);
}

#[test]
fn unknown_initial_values_are_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let spec = write(&dir, "contact.yaml", SPEC);
    let values = write(&dir, "values.json", r#"{"email":"ada@example.com","junk":1}"#);

    cli()
        .args(["submit", "--spec", arg(&spec), "--values", arg(&values)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown field `junk`"));
}

#[test]
fn unknown_kind_is_a_spec_error() {
    let dir = TempDir::new().expect("tempdir");
    let spec = write(&dir, "typo.yaml", "fields:\n  - name: a\n    kind: txet\n");

    cli()
        .args(["render", "--spec", arg(&spec)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("spec load failed"));
}
