use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span, trace};

use hv_ingest::IngestError;
use hv_query::DatasetStore;
use hv_session::{Session, SessionConfig};

use hv_cli::logging::redact_value;
use hv_cli::script::{ScriptOutcome, run_script};
use hv_cli::summary::{
    OptionsReport, SummaryReport, category_table, hospital_table, kpi_table, options_table,
    test_result_table,
};

use crate::cli::{
    BreakdownArgs, OptionsArgs, OutputFormatArg, SelectionArgs, SessionArgs, SummaryArgs,
};

/// Reads and normalizes the encounter file.
pub fn load_store(path: &Path) -> Result<DatasetStore> {
    let span = info_span!("load", path = %path.display());
    let _guard = span.enter();
    let start = Instant::now();

    let records = hv_ingest::read_raw_records(path).map_err(|error| {
        let hint = match &error {
            IngestError::FileNotFound { .. } => " (check the path)",
            IngestError::EmptyCsv { .. } | IngestError::NoHeaderDetected { .. } => {
                " (expected a header row)"
            }
            _ => "",
        };
        anyhow::Error::new(error).context(format!("load {}{hint}", path.display()))
    })?;
    let store = DatasetStore::build(&records);
    if let Some(first) = store.all().first() {
        trace!(name = redact_value(first.name.as_deref().unwrap_or("")), "First row");
    }
    info!(
        rows = store.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Dataset loaded"
    );
    Ok(store)
}

pub fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    match path {
        Some(path) => SessionConfig::load(path).context("load session config"),
        None => Ok(SessionConfig::default()),
    }
}

/// Loads the dataset, applies the requested predicates and starts a session.
fn open_selection(selection: &SelectionArgs, config: SessionConfig) -> Result<Session> {
    let store = load_store(&selection.csv)?;
    let mut session = Session::new(store, config).context("create session")?;
    for (name, value) in &selection.filters {
        session
            .set_predicate(name, value)
            .with_context(|| format!("invalid filter {name}={value}"))?;
    }
    session.start();
    Ok(session)
}

pub fn run_summary(args: &SummaryArgs, config: SessionConfig) -> Result<()> {
    let session = open_selection(&args.selection, config)?;
    let publication = session
        .current()
        .context("session published nothing")?;
    let test_results = session.test_results();

    match args.selection.format {
        OutputFormatArg::Json => {
            let report = SummaryReport::new(publication, test_results, args.top);
            print_json(&report)?;
        }
        OutputFormatArg::Table => {
            println!("{}", kpi_table(&publication.label, &publication.scalars));
            println!("{}", test_result_table(&test_results));
            println!("{}", hospital_table(&publication.hospitals, args.top));
        }
    }
    Ok(())
}

pub fn run_options(args: &OptionsArgs) -> Result<()> {
    let store = load_store(&args.csv)?;
    match args.format {
        OutputFormatArg::Json => print_json(&OptionsReport::new(&store))?,
        OutputFormatArg::Table => println!("{}", options_table(&store)),
    }
    Ok(())
}

pub fn run_breakdown(args: &BreakdownArgs, config: SessionConfig) -> Result<()> {
    let session = open_selection(&args.selection, config)?;
    let stats = session.category_stats(args.by);
    match args.selection.format {
        OutputFormatArg::Json => print_json(&stats)?,
        OutputFormatArg::Table => println!("{}", category_table(args.by, &stats)),
    }
    Ok(())
}

pub fn run_session(args: &SessionArgs, config: SessionConfig) -> Result<ScriptOutcome> {
    let store = load_store(&args.csv)?;
    let mut session = Session::new(store, config).context("create session")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let outcome = match &args.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("open script {}", path.display()))?;
            run_script(&mut session, BufReader::new(file), &mut out)?
        }
        None => run_script(&mut session, io::stdin().lock(), &mut out)?,
    };
    out.flush()?;
    info!(
        executed = outcome.executed,
        failed = outcome.failed,
        "Session script finished"
    );
    Ok(outcome)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize report")?;
    println!("{json}");
    Ok(())
}
