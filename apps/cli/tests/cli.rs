use std::fs;
use std::path::{Path, PathBuf};

use predicates::prelude::*;
use tempfile::{TempDir, tempdir};

fn bin() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("valexp").expect("binary");
    cmd.env_remove("OAS_VALEXP_LANG")
        .env_remove("VALEXP_LOCALE")
        .env_remove("VALEXP_CONFIG");
    cmd
}

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).expect("write fixture");
    path
}

fn limit_parameter() -> (TempDir, PathBuf) {
    let tmp = tempdir().expect("tmpdir");
    let path = write(
        tmp.path(),
        "limit.json",
        r#"{"name": "limit", "required": true,
            "schema": {"type": "integer", "minimum": 1, "maximum": 100, "default": 20}}"#,
    );
    (tmp, path)
}

#[test]
fn valid_value_from_stdin() {
    let (_tmp, parameter) = limit_parameter();
    bin()
        .arg("--parameter")
        .arg(&parameter)
        .write_stdin("10")
        .assert()
        .success()
        .stdout("OK\n");
}

#[test]
fn invalid_value_reports_path_and_code() {
    let (_tmp, parameter) = limit_parameter();
    bin()
        .args(["--locale", "en", "--parameter"])
        .arg(&parameter)
        .write_stdin("101")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[limit] ERR_VALUE_INTEGER_MAXIMUM"))
        .stdout(predicate::str::contains(
            "The `limit` must be less than or equal to 100.",
        ));
}

#[test]
fn every_value_in_every_file_is_checked() {
    let (tmp, parameter) = limit_parameter();
    let good = write(tmp.path(), "good.json", "1 50\n100");
    let bad = write(tmp.path(), "bad.json", "0");

    bin()
        .arg("--parameter")
        .arg(&parameter)
        .arg(&good)
        .arg(&bad)
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("OK\nOK\nOK\n"))
        .stdout(predicate::str::contains("bad.json: [limit] ERR_VALUE_INTEGER_MINIMUM"));
}

#[test]
fn exec_prints_defaults() {
    let tmp = tempdir().expect("tmpdir");
    let parameter = write(
        tmp.path(),
        "query.json",
        r#"{"name": "query", "required": true, "schema": {
            "type": "object",
            "properties": {
                "limit": {"type": "integer", "default": 20},
                "order": {"type": "string", "enum": ["asc", "desc"], "default": "asc"}
            }
        }}"#,
    );

    bin()
        .args(["--exec", "--parameter"])
        .arg(&parameter)
        .write_stdin(r#"{"order": "desc"}"#)
        .assert()
        .success()
        .stdout("{\"limit\":20,\"order\":\"desc\"}\n");
}

#[test]
fn absent_optional_value_uses_default() {
    let tmp = tempdir().expect("tmpdir");
    let parameter = write(
        tmp.path(),
        "p.json",
        r#"{"name": "p", "schema": {"type": "string", "default": "hoge"}}"#,
    );

    bin()
        .args(["--absent", "--exec", "--parameter"])
        .arg(&parameter)
        .assert()
        .success()
        .stdout("\"hoge\"\n");
}

#[test]
fn absent_optional_value_without_default() {
    let tmp = tempdir().expect("tmpdir");
    let parameter = write(
        tmp.path(),
        "p.json",
        r#"{"name": "p", "schema": {"type": "string", "nullable": true}}"#,
    );

    bin()
        .args(["--absent", "--exec", "--parameter"])
        .arg(&parameter)
        .assert()
        .success()
        .stdout("<absent>\n");

    bin()
        .args(["--exec", "--parameter"])
        .arg(&parameter)
        .write_stdin("null")
        .assert()
        .success()
        .stdout("null\n");
}

#[test]
fn japanese_locale_from_config_file() {
    let (tmp, parameter) = limit_parameter();
    let config = write(tmp.path(), "valexp.toml", "locale = \"ja\"\n");

    bin()
        .arg("--config")
        .arg(&config)
        .arg("--parameter")
        .arg(&parameter)
        .write_stdin("121")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("`limit` は 100 以下でなければいけません。"));
}

#[test]
fn flags_override_environment() {
    let (_tmp, parameter) = limit_parameter();
    bin()
        .env("VALEXP_LOCALE", "ja")
        .args(["--locale", "en", "--parameter"])
        .arg(&parameter)
        .write_stdin("0")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("greater than or equal to 1"));
}

#[test]
fn malformed_schema_is_a_setup_error() {
    let tmp = tempdir().expect("tmpdir");
    let parameter = write(
        tmp.path(),
        "bad.json",
        r#"{"name": "p", "schema": {"type": "string", "minLength": -1}}"#,
    );

    bin()
        .arg("--parameter")
        .arg(&parameter)
        .write_stdin("\"x\"")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid parameter definition"))
        .stderr(predicate::str::contains("ERR_SCHEMA_MIN_LENGTH"));
}

#[test]
fn strict_flag_rejects_ambiguous_combinators() {
    let tmp = tempdir().expect("tmpdir");
    let parameter = write(
        tmp.path(),
        "p.json",
        r#"{"name": "p", "schema": {"oneOf": [{"type": "string"}], "allOf": [{"type": "string"}]}}"#,
    );

    bin()
        .arg("--parameter")
        .arg(&parameter)
        .write_stdin("\"x\"")
        .assert()
        .success();

    bin()
        .args(["--strict", "--parameter"])
        .arg(&parameter)
        .write_stdin("\"x\"")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("ERR_SCHEMA_COMBINATOR"));
}

#[test]
fn invalid_json_input_is_a_setup_error() {
    let (_tmp, parameter) = limit_parameter();
    bin()
        .arg("--parameter")
        .arg(&parameter)
        .write_stdin("{not json")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<stdin>: invalid JSON"));
}

#[test]
fn missing_parameter_file() {
    bin()
        .args(["--parameter", "/nonexistent/parameter.json"])
        .write_stdin("1")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn print_config_shows_merged_settings() {
    let tmp = tempdir().expect("tmpdir");
    let config = write(tmp.path(), "valexp.toml", "max_depth = 8\n");

    bin()
        .arg("--config")
        .arg(&config)
        .args(["--strict", "--print-config", "--parameter", "unused.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_depth = 8"))
        .stdout(predicate::str::contains("strict_combinators = true"));
}
