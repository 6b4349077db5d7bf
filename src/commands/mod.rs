//! # CLI Command Implementations
//!
//! One module per `gee` subcommand. Each defines an `Args` struct derived
//! with `clap` and an `execute` function that loads the workspace, calls
//! into the `gee` library and prints the result.
//!
//! The batch verbs (`pull`, `status`, `clone`, `exec`) share [`BatchArgs`]
//! and the workspace/option helpers below.

pub mod add;
pub mod clone;
pub mod exec;
pub mod init;
pub mod pull;
pub mod remove;
pub mod status;

use std::env;

use anyhow::{Context, Result};
use clap::Args;
use gee::batch::BatchOptions;
use gee::config::Workspace;
use gee::output::OutputConfig;

/// Options shared by every command that runs across repositories.
#[derive(Args, Debug, Clone, Default)]
pub struct BatchArgs {
    /// Run at most N repositories at a time (default: all at once)
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,
}

impl BatchArgs {
    pub fn options(&self, output: &OutputConfig) -> BatchOptions {
        BatchOptions::new(output.clone()).with_jobs(self.jobs)
    }
}

/// The workspace containing the current directory.
pub fn load_workspace() -> Result<Workspace> {
    let cwd = env::current_dir().context("unable to read the current directory")?;
    Ok(Workspace::discover(&cwd)?)
}
