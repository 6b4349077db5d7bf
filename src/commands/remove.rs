//! `gee remove`: drop a repository from `gee.toml`.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::env;

use gee::git;
use gee::output::OutputConfig;

use super::load_workspace;

/// Remove a repository from gee.toml
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Name of the repository to remove (default: the repository in the current directory)
    #[arg(short, long, value_name = "NAME")]
    pub repo: Option<String>,
}

/// Execute the `remove` command.
pub fn execute(args: RemoveArgs, output: &OutputConfig) -> Result<()> {
    let name = match args.repo {
        Some(name) => name,
        None => match current_repo_name()? {
            Some(name) => name,
            None => bail!("please specify the repository name to remove with --repo"),
        },
    };

    let mut workspace = load_workspace()?;
    workspace.remove(&name)?;
    workspace.save()?;

    println!(
        "{} successfully removed {} from gee.toml",
        output.symbol_success(),
        output.repo_name(&name)
    );
    Ok(())
}

/// Name of the current directory when it is a git working tree.
fn current_repo_name() -> Result<Option<String>> {
    let cwd = env::current_dir().context("unable to read the current directory")?;
    if !git::is_work_tree(&cwd) {
        return Ok(None);
    }
    Ok(cwd
        .file_name()
        .map(|name| name.to_string_lossy().into_owned()))
}
