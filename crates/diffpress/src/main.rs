mod child;
mod cli;
mod commands;
mod git;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use diffpress_core::{init_logging, Config};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }

    // Held until exit so buffered log lines reach the file
    let _log_guard = init_logging(&config.log)?;
    tracing::debug!(version = %config.version, "configuration loaded");

    commands::execute(cli.command, &config)
}
