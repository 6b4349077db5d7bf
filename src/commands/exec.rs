//! `gee exec`: run a shell command in every repository.

use anyhow::Result;
use clap::Args;

use gee::batch::run_exec;
use gee::output::OutputConfig;
use gee::report::{render_results, Expand};

use super::{load_workspace, BatchArgs};

/// Run a shell command in every repository
#[derive(Args, Debug)]
pub struct ExecArgs {
    #[command(flatten)]
    pub batch: BatchArgs,

    /// Command to run, passed to `sh -c`
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true, num_args = 1..)]
    pub command: Vec<String>,
}

/// Execute the `exec` command.
pub fn execute(args: ExecArgs, output: &OutputConfig) -> Result<()> {
    let workspace = load_workspace()?;
    let command = args.command.join(" ");
    let result = run_exec(&workspace.repos(), &command, &args.batch.options(output))?;
    print!("\n{}", render_results(&result, output, Expand::All));
    Ok(())
}
