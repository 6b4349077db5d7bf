//! # gee
//!
//! Run git operations across a fleet of repositories at once.
//!
//! A workspace is a `gee.toml` file listing repositories by name and
//! location. `gee` pulls, clones, inspects or runs arbitrary shell commands
//! in all of them concurrently, draws a live line per repository while the
//! work runs, and prints a per-repository report with totals at the end.
//!
//! ## Quick Example
//!
//! ```
//! use gee::status::StatusSummary;
//!
//! let summary = StatusSummary::parse("# branch.head main\n# branch.ab +1 -0\n? notes.txt\n");
//! assert_eq!(summary.branch, "main");
//! assert_eq!(summary.ahead, 1);
//! assert_eq!(summary.untracked, 1);
//! ```
//!
//! ## Layers
//!
//! - **Command primitive (`runner`, `git`)**: run one subprocess in one
//!   directory and capture its output; typed git subcommands on top.
//! - **Pull with recovery (`pull`)**: a state machine that pulls safely
//!   over uncommitted changes and rolls back on conflict.
//! - **Status parsing (`status`)**: porcelain v2 text into a summary.
//! - **Execution engine (`engine`)**: bounded fan-out/fan-in of per-repo
//!   tasks with index-correlated results.
//! - **Progress and reporting (`progress`, `report`)**: the live view and
//!   the final boxed results.
//! - **Orchestrators (`batch`)**: one entry point per verb wiring the above
//!   together.
//! - **Workspace (`config`, `journal`)**: `gee.toml` and the side journal.

pub mod batch;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod git;
pub mod journal;
pub mod output;
pub mod progress;
pub mod pull;
pub mod report;
pub mod runner;
pub mod status;

#[cfg(test)]
mod status_proptest;
