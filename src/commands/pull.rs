//! `gee pull`: pull every repository in the workspace.
//!
//! Local changes are stashed and reapplied around the pull; a repository
//! whose changes no longer apply is rolled back and reported as failed.
//! Repositories missing on disk are cloned when they have a remote.
//! Afterwards the pre-pull commit of every stashed repository is recorded
//! in the side journal.

use anyhow::Result;
use clap::Args;
use log::warn;
use std::path::Path;

use gee::batch::{run_pull, BatchResult};
use gee::journal::Journal;
use gee::output::OutputConfig;
use gee::report::{render_results, Expand};

use super::{load_workspace, BatchArgs};

/// Pull every repository, keeping local changes
#[derive(Args, Debug)]
pub struct PullArgs {
    #[command(flatten)]
    pub batch: BatchArgs,
}

/// Execute the `pull` command.
pub fn execute(args: PullArgs, output: &OutputConfig) -> Result<()> {
    let workspace = load_workspace()?;
    let repos = workspace.repos();

    let result = run_pull(&repos, &args.batch.options(output))?;
    record_original_commits(&workspace.config_dir, &result);

    print!("\n{}", render_results(&result, output, Expand::FailuresOnly));
    Ok(())
}

fn record_original_commits(config_dir: &Path, result: &BatchResult) {
    let stashed: Vec<_> = result
        .outcomes
        .iter()
        .filter_map(|o| o.original_commit.as_deref().map(|c| (&o.repo_name, c)))
        .collect();
    if stashed.is_empty() {
        return;
    }

    let mut journal = Journal::load(config_dir).unwrap_or_else(|e| {
        warn!("unable to read the journal, starting a new one: {}", e);
        Journal::default()
    });
    for (repo, commit) in stashed {
        journal.record(repo, commit);
    }
    if let Err(e) = journal.save(config_dir) {
        warn!("unable to write the journal: {}", e);
    }
}
