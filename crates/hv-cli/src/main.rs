//! HealthViz command-line front end.

use std::io::{self, IsTerminal};

use clap::Parser;
use hv_cli::logging::init_logging;

mod cli;
mod commands;

use crate::cli::{Cli, Command};
use crate::commands::{load_config, run_breakdown, run_options, run_session, run_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = cli.log_config(io::stderr().is_terminal());
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Command::Summary(args) => run_summary(args, config).map(|()| 0),
        Command::Options(args) => run_options(args).map(|()| 0),
        Command::Breakdown(args) => run_breakdown(args, config).map(|()| 0),
        Command::Session(args) => {
            run_session(args, config).map(|outcome| if outcome.failed > 0 { 1 } else { 0 })
        }
    });
    let exit_code = match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}
