//! `gee add`: register the repository in the current directory.
//!
//! The directory name becomes the entry's `name`, its parent the `path`,
//! and `remote.origin.url` (when set) the `remote`.

use anyhow::{Context, Result};
use clap::Args;
use log::debug;
use std::env;

use gee::error::Error;
use gee::git::{self, GitRepo};
use gee::output::OutputConfig;
use gee::runner::SystemRunner;

use super::load_workspace;

/// Add the repository in the current directory to gee.toml
#[derive(Args, Debug)]
pub struct AddArgs {}

/// Execute the `add` command.
pub fn execute(_args: AddArgs, output: &OutputConfig) -> Result<()> {
    let cwd = env::current_dir().context("unable to read the current directory")?;
    if !git::is_work_tree(&cwd) {
        return Err(Error::NotAGitRepo { path: cwd }.into());
    }

    let mut workspace = load_workspace()?;
    let remote = GitRepo::new(&SystemRunner, &cwd).remote_url();
    if remote.is_none() {
        debug!("{} has no origin remote", cwd.display());
    }

    let name = workspace.add(&cwd, remote)?.name.clone();
    workspace.save()?;

    println!(
        "{} successfully added {}",
        output.symbol_success(),
        output.repo_name(&name)
    );
    Ok(())
}
