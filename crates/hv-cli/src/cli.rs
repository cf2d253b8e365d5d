//! CLI argument definitions for `healthviz`.

use std::path::PathBuf;

use clap::{Args, ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tracing::level_filters::LevelFilter;

use hv_cli::logging::{LogConfig, LogFormat};
use hv_model::CategoricalField;

#[derive(Parser)]
#[command(
    name = "healthviz",
    version,
    about = "HealthViz - Explore hospital encounter data from the terminal",
    long_about = "Load a hospital encounter CSV once, then filter and summarize it.\n\n\
                  Filters are set by name (ageGroup, gender, admissionType, condition,\n\
                  testResult, bloodType, insurance, hospital, lengthOfStayMax,\n\
                  billingRange, admissionDateFrom, admissionDateTo); `all` turns one off."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow patient-level values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Session settings (TOML: cache capacities, secondary render delay).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Logging settings implied by the global flags.
    ///
    /// `--log-level` wins over `-v`/`-q`, and either one disables `RUST_LOG`.
    /// JSON records and log files never carry ANSI escapes. Targets are
    /// shown from debug up, where several hv crates interleave.
    pub fn log_config(&self, stderr_is_terminal: bool) -> LogConfig {
        let explicit = self.log_level.map(LevelFilter::from);
        let level_filter = explicit.unwrap_or_else(|| self.verbosity.tracing_level_filter());
        let format = LogFormat::from(self.log_format);
        let plain_sink = self.log_file.is_some() || format == LogFormat::Json;

        LogConfig {
            level_filter,
            use_env_filter: explicit.is_none() && !self.verbosity.is_present(),
            with_target: level_filter >= LevelFilter::DEBUG,
            with_ansi: !plain_sink
                && match self.color.color {
                    ColorChoice::Always => true,
                    ColorChoice::Never => false,
                    ColorChoice::Auto => stderr_is_terminal,
                },
            format,
            log_file: self.log_file.clone(),
            log_data: self.log_data,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Print KPIs, test results and top hospitals for a selection.
    Summary(SummaryArgs),

    /// List the filter options found in a dataset.
    Options(OptionsArgs),

    /// Break a selection down by one categorical field.
    Breakdown(BreakdownArgs),

    /// Drive a session with line commands from a script or stdin.
    Session(SessionArgs),
}

/// Selection shared by the reporting subcommands.
#[derive(Args)]
pub struct SelectionArgs {
    /// Encounter CSV file.
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Predicate as NAME=VALUE; repeatable.
    #[arg(long = "filter", short = 'f', value_name = "NAME=VALUE", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Number of hospitals to list.
    #[arg(long = "top", default_value_t = 10)]
    pub top: usize,
}

#[derive(Args)]
pub struct OptionsArgs {
    /// Encounter CSV file.
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Args)]
pub struct BreakdownArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Categorical field to group by (e.g. bloodType, insurance, region).
    #[arg(long = "by", value_name = "FIELD")]
    pub by: CategoricalField,
}

#[derive(Args)]
pub struct SessionArgs {
    /// Encounter CSV file.
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Command file; stdin when omitted.
    #[arg(long = "script", value_name = "FILE")]
    pub script: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing filter name in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
