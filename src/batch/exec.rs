use crate::config::Repo;
use crate::error::Result;

use super::{run_batch, BatchOptions, BatchResult, OperationOutcome};

/// Run `command` through `sh -c` in every repository directory.
pub fn run_exec(repos: &[Repo], command: &str, options: &BatchOptions) -> Result<BatchResult> {
    let owned = command.to_string();
    run_batch(command, repos, options, "Running...", move |repo, runner, _slot| {
        let out = runner.run(&repo.local_path, "sh", &["-c", &owned]);
        Ok(OperationOutcome::from_output(&repo.name, out, "Done"))
    })
}
