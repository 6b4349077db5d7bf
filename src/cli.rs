//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use gee::output::{ColorChoice, OutputConfig};

use crate::commands;

/// gee - run git across all the repositories of a workspace
#[derive(Parser, Debug)]
#[command(name = "gee")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create gee.toml in the current directory
    Init(commands::init::InitArgs),

    /// Add the repository in the current directory to gee.toml
    Add(commands::add::AddArgs),

    /// Remove a repository from gee.toml
    Remove(commands::remove::RemoveArgs),

    /// Pull every repository, keeping local changes
    Pull(commands::pull::PullArgs),

    /// Show the status of every repository
    Status(commands::status::StatusArgs),

    /// Clone every repository that is missing locally
    Clone(commands::clone::CloneArgs),

    /// Run a shell command in every repository
    Exec(commands::exec::ExecArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = OutputConfig::detect(self.color);

        match self.command {
            Commands::Init(args) => commands::init::execute(args, &output),
            Commands::Add(args) => commands::add::execute(args, &output),
            Commands::Remove(args) => commands::remove::execute(args, &output),
            Commands::Pull(args) => commands::pull::execute(args, &output),
            Commands::Status(args) => commands::status::execute(args, &output),
            Commands::Clone(args) => commands::clone::execute(args, &output),
            Commands::Exec(args) => commands::exec::execute(args, &output),
        }
    }
}

/// Route `log` records to stderr at `level`; `RUST_LOG` takes precedence.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level.to_lowercase());
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .try_init();
}
