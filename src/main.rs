//! # gee CLI
//!
//! Binary entry point. Arguments are parsed with `clap` and dispatched to
//! one module per verb under `commands`; everything those modules do is
//! delegated to the `gee` library.
//!
//! Errors that stop a command before any repository is touched (no
//! `gee.toml`, invalid configuration) propagate out of `main` and exit
//! with status 1. Failures of individual repositories are part of the
//! printed report and leave the exit status at 0.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
