//! `gee status`: one summary line per repository, or the full
//! `git status` of each with `--verbose`.

use anyhow::Result;
use clap::Args;

use gee::batch::run_status;
use gee::output::OutputConfig;
use gee::report::{render_box, render_footer, render_results, render_status_table, Expand};

use super::{load_workspace, BatchArgs};

/// Show the status of every repository
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show the full `git status` output of every repository
    #[arg(short, long)]
    pub verbose: bool,

    #[command(flatten)]
    pub batch: BatchArgs,
}

/// Execute the `status` command.
pub fn execute(args: StatusArgs, output: &OutputConfig) -> Result<()> {
    let workspace = load_workspace()?;
    let repos = workspace.repos();

    let result = run_status(&repos, args.verbose, &args.batch.options(output))?;

    if args.verbose {
        print!("\n{}", render_results(&result, output, Expand::All));
        return Ok(());
    }

    print!("\n{}", render_status_table(&result, output));
    for outcome in result.outcomes.iter().filter(|o| o.failed) {
        print!("{}", render_box(&result.label, outcome, output));
    }
    print!("\n{}", render_footer(&result, output));
    Ok(())
}
