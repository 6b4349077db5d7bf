use crate::config::Repo;
use crate::error::Result;
use crate::git::GitRepo;
use crate::pull::{PullOutcome, PullRecovery, PullReport};
use crate::runner::CommandRunner;

use super::clone::clone_one;
use super::{run_batch, BatchOptions, BatchResult, OperationOutcome};

/// Pull every repository, stashing and reapplying local changes where
/// needed. Repositories whose directory does not exist yet are cloned
/// instead when a remote is configured.
pub fn run_pull(repos: &[Repo], options: &BatchOptions) -> Result<BatchResult> {
    run_batch("git pull", repos, options, "Pulling...", |repo, runner, slot| {
        if !repo.local_path.exists() {
            if repo.remote.is_none() {
                return Ok(OperationOutcome::failure(
                    &repo.name,
                    format!(
                        "{} does not exist and no remote configured",
                        repo.local_path.display()
                    ),
                ));
            }
            slot.update("Cloning instead...");
            return clone_one(repo, runner);
        }
        Ok(pull_one(repo, runner))
    })
}

fn pull_one(repo: &Repo, runner: &dyn CommandRunner) -> OperationOutcome {
    let git = GitRepo::new(runner, &repo.local_path);
    let report = PullRecovery::new(git, &repo.name, repo.branch.as_deref()).run();
    outcome_from_report(&repo.name, report)
}

fn outcome_from_report(repo_name: &str, report: PullReport) -> OperationOutcome {
    let (failed, error, message) = match report.outcome {
        PullOutcome::Pulled => (false, None, "Pulled".to_string()),
        PullOutcome::PulledWithLocalChanges { stash } => (
            false,
            None,
            format!("Pulled, local changes reapplied (kept in stash {})", short(&stash)),
        ),
        PullOutcome::Failed { reason } => (true, Some(reason.clone()), reason),
    };
    OperationOutcome {
        repo_name: repo_name.to_string(),
        stdout: report.stdout,
        stderr: report.stderr,
        failed,
        error,
        message,
        summary: None,
        original_commit: report.original_commit,
    }
}

fn short(hash: &str) -> &str {
    hash.get(..10).unwrap_or(hash)
}
