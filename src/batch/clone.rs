use std::fs;

use log::debug;

use crate::config::Repo;
use crate::error::Result;
use crate::git;
use crate::runner::CommandRunner;

use super::{run_batch, BatchOptions, BatchResult, OperationOutcome};

const ALREADY_CLONED: &str = "already cloned";

/// Clone every repository that has a remote into its local path.
pub fn run_clone(repos: &[Repo], options: &BatchOptions) -> Result<BatchResult> {
    run_batch("git clone", repos, options, "Cloning...", |repo, runner, _slot| {
        clone_one(repo, runner)
    })
}

/// Clone one repository; an existing working tree counts as success.
///
/// Only a parent directory that cannot be created is returned as `Err`.
pub(super) fn clone_one(repo: &Repo, runner: &dyn CommandRunner) -> Result<OperationOutcome> {
    if git::is_work_tree(&repo.local_path) {
        return Ok(OperationOutcome::success(&repo.name, ALREADY_CLONED));
    }
    let Some(remote) = repo.remote.as_deref() else {
        return Ok(OperationOutcome::failure(&repo.name, "no remote configured"));
    };

    let parent = match repo.local_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => repo.local_path.as_path(),
    };
    fs::create_dir_all(parent)?;

    let out = git::clone(runner, parent, remote, &repo.local_path);

    // Compatibility shim: git reports a pre-existing target only in prose.
    if out.failed() && String::from_utf8_lossy(&out.stderr).contains("already exists") {
        debug!("{}: clone target already exists", repo.name);
        let mut outcome = OperationOutcome::from_output(&repo.name, out, ALREADY_CLONED);
        outcome.failed = false;
        outcome.error = None;
        outcome.message = ALREADY_CLONED.to_string();
        return Ok(outcome);
    }

    let mut outcome = OperationOutcome::from_output(&repo.name, out, "Cloned");
    if outcome.failed {
        outcome.message = format!("failed to clone {}", repo.name);
    }
    Ok(outcome)
}
