use crate::config::Repo;
use crate::error::Result;
use crate::git::GitRepo;
use crate::runner::CommandRunner;
use crate::status::StatusSummary;

use super::{run_batch, BatchOptions, BatchResult, OperationOutcome};

/// Collect the status of every repository.
///
/// By default each repository is summarised from porcelain v2 output;
/// with `verbose` the full `git status` text is captured instead.
pub fn run_status(repos: &[Repo], verbose: bool, options: &BatchOptions) -> Result<BatchResult> {
    let color = options.output.use_color;
    run_batch(
        "git status",
        repos,
        options,
        "Checking status...",
        move |repo, runner, _slot| {
            Ok(if verbose {
                verbose_status(repo, runner, color)
            } else {
                summarised_status(repo, runner)
            })
        },
    )
}

fn verbose_status(repo: &Repo, runner: &dyn CommandRunner, color: bool) -> OperationOutcome {
    let out = GitRepo::new(runner, &repo.local_path).status(color);
    OperationOutcome::from_output(&repo.name, out, "")
}

fn summarised_status(repo: &Repo, runner: &dyn CommandRunner) -> OperationOutcome {
    let out = GitRepo::new(runner, &repo.local_path).status_porcelain_v2();
    if out.failed() {
        return OperationOutcome::from_output(&repo.name, out, "");
    }

    let summary =
        StatusSummary::parse(&String::from_utf8_lossy(&out.stdout)).with_special_state(&repo.local_path);
    let message = if summary.is_clean() { "clean" } else { "dirty" };
    OperationOutcome {
        summary: Some(summary),
        // The raw porcelain text is not for display.
        stdout: Vec::new(),
        ..OperationOutcome::from_output(&repo.name, out, message)
    }
}
