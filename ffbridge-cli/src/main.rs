// ffbridge-cli/src/main.rs
//
// Entry point of the `ffbridge` binary: parses arguments, sets up logging,
// loads settings and dispatches to the command implementations. Any error
// is printed with its cause chain and the process exits with status 1.

use anyhow::Context;
use clap::Parser;
use ffbridge_cli::{Cli, Commands, logging, run_convert, run_probe, run_supports};
use ffbridge_core::Settings;
use owo_colors::OwoColorize;
use std::process;

fn run(cli: Cli) -> anyhow::Result<()> {
    let load = || Settings::load(cli.config.as_deref()).context("Failed to load settings");

    match cli.command {
        Commands::Supports(args) => run_supports(&load()?, &args),
        Commands::Probe(args) => run_probe(&load()?, &args),
        Commands::Convert(args) => run_convert(load()?, &args),
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}
