//! `gee init`: create a `gee.toml` in the current directory.

use anyhow::{Context, Result};
use clap::Args;
use std::env;

use gee::config::Workspace;
use gee::output::{emoji, OutputConfig};

/// Create gee.toml in the current directory
#[derive(Args, Debug)]
pub struct InitArgs {}

/// Execute the `init` command.
pub fn execute(_args: InitArgs, output: &OutputConfig) -> Result<()> {
    let cwd = env::current_dir().context("unable to read the current directory")?;
    let workspace = Workspace::init(&cwd)?;

    println!(
        "{} Created {}",
        emoji(output, "✅", "*"),
        workspace.config_file.display()
    );
    println!(
        "{} Edit it, or run `gee add` inside a repository to register it",
        emoji(output, "💡", "-")
    );
    Ok(())
}
