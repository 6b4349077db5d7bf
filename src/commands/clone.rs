//! `gee clone`: clone every repository that is not on disk yet.

use anyhow::Result;
use clap::Args;

use gee::batch::run_clone;
use gee::output::OutputConfig;
use gee::report::{render_results, Expand};

use super::{load_workspace, BatchArgs};

/// Clone every repository that is missing locally
#[derive(Args, Debug)]
pub struct CloneArgs {
    #[command(flatten)]
    pub batch: BatchArgs,
}

/// Execute the `clone` command.
pub fn execute(args: CloneArgs, output: &OutputConfig) -> Result<()> {
    let workspace = load_workspace()?;
    let result = run_clone(&workspace.repos(), &args.batch.options(output))?;
    print!("\n{}", render_results(&result, output, Expand::FailuresOnly));
    Ok(())
}
