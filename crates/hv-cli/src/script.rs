//! Line-oriented driver for an interactive session.
//!
//! Each non-blank line is one command. Lines whose first non-blank
//! character is `#` are comments; a `#` anywhere else belongs to the value.
//!
//! ```text
//! set testResult Abnormal
//! set hospital Mercy General
//! apply
//! show
//! clear hospital
//! reset
//! stats
//! ```

use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::{Context, Result};
use thiserror::Error;

use hv_model::{FilterError, FilterField};
use hv_session::{Publication, Session};

use crate::format::{format_avg_stay, format_count, format_money};
use crate::logging::redact_value;
use crate::summary::cache_table;

/// One parsed script line.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    /// Sets one predicate; the value is the rest of the line.
    Set { name: String, value: String },
    Clear(FilterField),
    Apply,
    Reset,
    Show,
    Stats,
    ClearCache,
    Quit,
}

/// A line that could not be parsed or executed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("'{command}' expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error(transparent)]
    Filter(#[from] FilterError),
}

impl FromStr for ScriptCommand {
    type Err = ScriptError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        match verb.to_ascii_lowercase().as_str() {
            "set" => {
                let (name, value) = match rest.split_once(char::is_whitespace) {
                    Some((name, value)) => (name, value.trim()),
                    None => (rest, ""),
                };
                if name.is_empty() {
                    return Err(ScriptError::MissingArgument {
                        command: "set",
                        expected: "NAME VALUE",
                    });
                }
                Ok(ScriptCommand::Set {
                    name: name.to_string(),
                    value: value.to_string(),
                })
            }
            "clear" => {
                if rest.is_empty() {
                    return Err(ScriptError::MissingArgument {
                        command: "clear",
                        expected: "NAME",
                    });
                }
                Ok(ScriptCommand::Clear(rest.parse()?))
            }
            "apply" => Ok(ScriptCommand::Apply),
            "reset" => Ok(ScriptCommand::Reset),
            "show" => Ok(ScriptCommand::Show),
            "stats" => Ok(ScriptCommand::Stats),
            "clear-cache" | "clear-caches" => Ok(ScriptCommand::ClearCache),
            "quit" | "exit" => Ok(ScriptCommand::Quit),
            _ => Err(ScriptError::UnknownCommand(verb.to_string())),
        }
    }
}

/// Parses one line. Blank lines and comment lines yield `None`.
pub fn parse_line(line: &str) -> Option<Result<ScriptCommand, ScriptError>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        None
    } else {
        Some(line.parse())
    }
}

/// Counters of a finished script run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptOutcome {
    pub executed: usize,
    pub failed: usize,
}

/// Runs commands from `input` against a started session.
///
/// Bad lines are reported to `out` and skipped; only I/O failures abort.
pub fn run_script<R, W>(session: &mut Session, input: R, out: &mut W) -> Result<ScriptOutcome>
where
    R: BufRead,
    W: Write,
{
    let mut outcome = ScriptOutcome::default();
    session.start();

    for (number, line) in input.lines().enumerate() {
        let line = line.context("read script line")?;
        let Some(parsed) = parse_line(&line) else {
            continue;
        };
        let command = match parsed {
            Ok(command) => command,
            Err(error) => {
                outcome.failed += 1;
                writeln!(out, "line {}: error: {error}", number + 1)?;
                continue;
            }
        };
        if command == ScriptCommand::Quit {
            break;
        }
        match execute(session, &command, out)? {
            Ok(()) => outcome.executed += 1,
            Err(error) => {
                outcome.failed += 1;
                writeln!(out, "line {}: error: {error}", number + 1)?;
            }
        }
    }
    Ok(outcome)
}

/// Executes one command. The outer result carries I/O failures, the inner
/// one misuse that leaves the session unchanged.
fn execute<W: Write>(
    session: &mut Session,
    command: &ScriptCommand,
    out: &mut W,
) -> Result<Result<(), ScriptError>> {
    match command {
        ScriptCommand::Set { name, value } => {
            tracing::trace!(name = %name, value = redact_value(value), "Setting predicate");
            if let Err(error) = session.set_predicate(name, value) {
                return Ok(Err(error.into()));
            }
        }
        ScriptCommand::Clear(field) => session.clear_predicate(*field),
        ScriptCommand::Apply => {
            let publication = session.apply_filters();
            writeln!(
                out,
                "applied: {} ({} rows)",
                publication.label,
                format_count(publication.row_count())
            )?;
        }
        ScriptCommand::Reset => {
            let publication = session.reset_filters();
            writeln!(out, "reset: {} rows", format_count(publication.row_count()))?;
        }
        ScriptCommand::Show => {
            if let Some(publication) = session.current() {
                write_publication(out, publication)?;
            }
        }
        ScriptCommand::Stats => writeln!(out, "{}", cache_table(&session.cache_stats()))?,
        ScriptCommand::ClearCache => {
            session.clear_caches();
            writeln!(out, "caches cleared")?;
        }
        ScriptCommand::Quit => {}
    }
    Ok(Ok(()))
}

/// Plain-text KPI strip of a publication.
pub fn write_publication<W: Write>(out: &mut W, publication: &Publication) -> std::io::Result<()> {
    let scalars = &publication.scalars;
    writeln!(out, "selection: {}", publication.label)?;
    writeln!(out, "patients: {}", format_count(scalars.count))?;
    writeln!(out, "total billing: {}", format_money(Some(scalars.total_billing)))?;
    writeln!(out, "avg billing: {}", format_money(Some(scalars.avg_billing)))?;
    writeln!(out, "avg stay: {}", format_avg_stay(scalars.avg_length_of_stay))?;
    writeln!(out, "hospitals: {}", format_count(scalars.distinct_hospitals))?;
    if let Some(top) = publication.hospitals.first() {
        writeln!(
            out,
            "top hospital: {} ({} patients, mostly {})",
            top.hospital,
            format_count(top.count),
            top.dominant_test_result
        )?;
    }
    Ok(())
}
