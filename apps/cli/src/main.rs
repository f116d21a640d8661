//! # valexp
//!
//! Checks JSON values against an OpenAPI parameter definition.
//!
//! ```text
//! valexp --parameter limit.json values.json
//! echo '{"limit": 5}' | valexp --parameter query.json --exec
//! ```
//!
//! Exit status is 0 when every value passes, 1 when any value fails, and 2
//! when the definition, settings, or input cannot be loaded.

mod config;

use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use oas_valexp::ValExp;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use crate::config::Overrides;

/// Log filter variable; falls back to `RUST_LOG`.
const LOG_ENV_VAR: &str = "VALEXP_LOG";

const STDIN_LABEL: &str = "<stdin>";

/// Printed by `--exec` when an optional value is absent and has no default.
const ABSENT: &str = "<absent>";

/// Validate JSON values against an OpenAPI parameter definition.
#[derive(Parser, Debug)]
#[command(name = "valexp", version, about, long_about = None)]
struct Cli {
    /// Parameter definition file: `{"name", "required", "schema"}`.
    #[arg(short, long, value_name = "FILE")]
    parameter: PathBuf,

    /// TOML settings file.
    #[arg(short, long, value_name = "FILE", env = "VALEXP_CONFIG")]
    config: Option<PathBuf>,

    /// Message locale, e.g. `en`, `ja`, `ja-JP`.
    #[arg(short, long)]
    locale: Option<String>,

    /// Maximum nesting depth for schemas and values.
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Reject ambiguous combinators and `required` names missing from `properties`.
    #[arg(long)]
    strict: bool,

    /// Print each validated value, defaults applied, instead of `OK`.
    /// An absent value with no default prints `<absent>`.
    #[arg(short, long)]
    exec: bool,

    /// Validate an absent value instead of reading input.
    #[arg(long, conflicts_with = "values")]
    absent: bool,

    /// Print the effective settings as TOML and exit.
    #[arg(long)]
    print_config: bool,

    /// Files holding one or more JSON values. Reads stdin when empty or `-`.
    #[arg(value_name = "VALUE_FILE")]
    values: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::debug!(error = ?e, "setup failed");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .compact()
        .init();
}

/// Returns whether every value passed.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let overrides = Overrides {
        locale: cli.locale.clone(),
        max_depth: cli.max_depth,
        strict: cli.strict,
    };
    let config = config::load(cli.config.as_deref(), &overrides)?;

    if cli.print_config {
        print!("{}", config::render(&config)?);
        return Ok(true);
    }

    let raw = read_json(&cli.parameter)?;
    let mut valexp = ValExp::with_config(&raw, config).with_context(|| {
        format!("invalid parameter definition in {}", cli.parameter.display())
    })?;
    tracing::info!(parameter = %valexp.parameter().name(), "parameter loaded");

    let mut out = io::stdout().lock();

    if cli.absent {
        return check(&mut out, &mut valexp, ABSENT, None, cli.exec);
    }

    let mut passed = true;
    for (label, text) in read_sources(&cli.values)? {
        let mut count = 0usize;
        for value in serde_json::Deserializer::from_str(&text).into_iter::<Value>() {
            let value = value.with_context(|| format!("{label}: invalid JSON"))?;
            passed &= check(&mut out, &mut valexp, &label, Some(&value), cli.exec)?;
            count += 1;
        }
        tracing::debug!(source = %label, count, "values checked");
    }
    Ok(passed)
}

fn check(
    out: &mut impl Write,
    valexp: &mut ValExp,
    label: &str,
    value: Option<&Value>,
    exec: bool,
) -> anyhow::Result<bool> {
    match valexp.exec(value) {
        Some(result) if exec => {
            match &result.value {
                Some(value) => writeln!(out, "{}", serde_json::to_string(value)?)?,
                None => writeln!(out, "{ABSENT}")?,
            }
            Ok(true)
        }
        Some(_) => {
            writeln!(out, "OK")?;
            Ok(true)
        }
        None => {
            if let Some(err) = valexp.error() {
                writeln!(out, "{label}: {err}")?;
            }
            Ok(false)
        }
    }
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Labels and contents of every value source, in order.
fn read_sources(paths: &[PathBuf]) -> anyhow::Result<Vec<(String, String)>> {
    if paths.is_empty() {
        return Ok(vec![(STDIN_LABEL.to_owned(), read_stdin()?)]);
    }

    paths
        .iter()
        .map(|path| -> anyhow::Result<(String, String)> {
            if path.as_os_str() == "-" {
                Ok((STDIN_LABEL.to_owned(), read_stdin()?))
            } else {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Ok((path.display().to_string(), text))
            }
        })
        .collect()
}

fn read_stdin() -> anyhow::Result<String> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("failed to read stdin")?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn check_reports_outcome() {
        let mut valexp = ValExp::new(&serde_json::json!({
            "name": "n",
            "required": true,
            "schema": {"type": "integer", "default": 3}
        }))
        .unwrap();

        let mut out = Vec::new();
        assert!(check(&mut out, &mut valexp, "a", Some(&serde_json::json!(1)), false).unwrap());
        assert!(check(&mut out, &mut valexp, "a", Some(&serde_json::json!(2)), true).unwrap());
        assert!(!check(&mut out, &mut valexp, "b", None, false).unwrap());

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            ["OK", "2", "b: [n] ERR_VALUE_REQUIRED: The `n` is required."]
        );
    }

    #[test]
    fn exec_distinguishes_absent_from_null() {
        let mut valexp = ValExp::new(&serde_json::json!({
            "name": "n",
            "schema": {"type": "integer", "nullable": true}
        }))
        .unwrap();

        let mut out = Vec::new();
        assert!(check(&mut out, &mut valexp, "a", None, true).unwrap());
        assert!(check(&mut out, &mut valexp, "a", Some(&Value::Null), true).unwrap());

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().collect::<Vec<_>>(), [ABSENT, "null"]);
    }
}
