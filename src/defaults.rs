//! Default values for gee.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::time::Duration;

/// Name of the configuration file searched for upward from the working
/// directory.
pub const CONFIG_FILE_NAME: &str = "gee.toml";

/// Directory, next to `gee.toml`, holding the side journal.
pub const JOURNAL_DIR: &str = ".gee";

/// File name of the side journal inside [`JOURNAL_DIR`].
pub const JOURNAL_FILE_NAME: &str = "gee.json";

/// Branch reserved by gee for pulling while local changes are stashed.
///
/// It must never collide with a user branch; a leftover one from an
/// interrupted run makes the next pull of that repository fail loudly
/// instead of reusing it.
pub const TEMP_BRANCH: &str = "gee-pull-temp";

/// Interval between two redraws of the live progress view.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Remote consulted for pulls and for the default branch.
pub const REMOTE_NAME: &str = "origin";

/// Returns the concurrency bound for a batch of `repo_count` repositories.
///
/// An explicit `--jobs` value wins; otherwise every repository gets its
/// own worker. The result is never zero.
pub fn concurrency(jobs: Option<usize>, repo_count: usize) -> usize {
    jobs.unwrap_or(repo_count).max(1)
}
