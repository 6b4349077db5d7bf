//! # Command Orchestrators
//!
//! One entry point per verb: [`run_pull`], [`run_status`], [`run_clone`]
//! and [`run_exec`]. Each takes the ordered repository list, builds one
//! task per repository, fans the tasks out through the
//! [`engine`](crate::engine), drives a [`ProgressBoard`] while they run and
//! returns a [`BatchResult`] ready for the [`report`](crate::report).
//!
//! Index `i` of the repository list, of the progress states and of the
//! outcomes always refers to the same repository.
//!
//! A failing repository never aborts the batch. Only errors raised before
//! any task starts (the worker pool or the renderer thread cannot be
//! created) are returned as `Err`; anything a task escalates is folded into
//! a failed [`OperationOutcome`] for that repository.

mod clone;
mod exec;
mod pull;
mod status;

pub use clone::run_clone;
pub use exec::run_exec;
pub use pull::run_pull;
pub use status::run_status;

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;

use crate::config::Repo;
use crate::defaults::{self, TICK_INTERVAL};
use crate::engine;
use crate::error::Result;
use crate::output::OutputConfig;
use crate::progress::{DrawTarget, ProgressBoard, ProgressState, Slot};
use crate::runner::{CommandRunner, RunOutput, SystemRunner};
use crate::status::StatusSummary;

/// What one operation on one repository produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub repo_name: String,
    /// Everything the operation wrote to stdout, verbatim.
    pub stdout: Vec<u8>,
    /// Everything the operation wrote to stderr, verbatim.
    pub stderr: Vec<u8>,
    pub failed: bool,
    /// Why the operation failed, when it did.
    pub error: Option<String>,
    /// Short one-line result, shown on the progress line.
    pub message: String,
    /// Parsed status, for `status` without `--verbose`.
    pub summary: Option<StatusSummary>,
    /// `HEAD` before local changes were stashed by a pull.
    pub original_commit: Option<String>,
}

impl OperationOutcome {
    pub fn success(repo_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            repo_name: repo_name.into(),
            stdout: Vec::new(),
            stderr: Vec::new(),
            failed: false,
            error: None,
            message: message.into(),
            summary: None,
            original_commit: None,
        }
    }

    pub fn failure(repo_name: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            failed: true,
            message: error.clone(),
            error: Some(error),
            ..Self::success(repo_name, "")
        }
    }

    /// Wrap a finished command; `done` is the message on success.
    pub fn from_output(repo_name: impl Into<String>, out: RunOutput, done: &str) -> Self {
        let failed = out.failed();
        let error = failed.then(|| out.failure_reason());
        Self {
            repo_name: repo_name.into(),
            message: error.clone().unwrap_or_else(|| done.to_string()),
            failed,
            error,
            stdout: out.stdout,
            stderr: out.stderr,
            summary: None,
            original_commit: None,
        }
    }

    /// Whether there is any captured output to show.
    pub fn has_output(&self) -> bool {
        !self.stdout.iter().all(u8::is_ascii_whitespace)
            || !self.stderr.iter().all(u8::is_ascii_whitespace)
    }
}

/// Everything a batch produced.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// The command shown in result headers, e.g. `git pull`.
    pub label: String,
    pub outcomes: Vec<OperationOutcome>,
    /// Final progress states, index-aligned with `outcomes`.
    pub progress: Vec<ProgressState>,
    pub elapsed: Duration,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.total() - self.failed()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.failed).count()
    }
}

/// How a batch runs and draws.
#[derive(Clone)]
pub struct BatchOptions {
    /// Upper bound on parallel tasks; `None` runs every repository at once.
    pub jobs: Option<usize>,
    pub draw: DrawTarget,
    pub output: OutputConfig,
    pub tick: Duration,
    pub runner: Arc<dyn CommandRunner>,
}

impl BatchOptions {
    /// Real subprocesses, live progress on stdout.
    pub fn new(output: OutputConfig) -> Self {
        Self {
            jobs: None,
            draw: DrawTarget::stdout(),
            output,
            tick: TICK_INTERVAL,
            runner: Arc::new(SystemRunner),
        }
    }

    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_draw(mut self, draw: DrawTarget) -> Self {
        self.draw = draw;
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }
}

/// Run `work` for every repository and collect the outcomes.
fn run_batch<W>(
    label: impl Into<String>,
    repos: &[Repo],
    options: &BatchOptions,
    initial_message: &str,
    work: W,
) -> Result<BatchResult>
where
    W: Fn(&Repo, &dyn CommandRunner, &Slot) -> Result<OperationOutcome> + Send + Sync + 'static,
{
    let label = label.into();
    let started = Instant::now();
    let concurrency = defaults::concurrency(options.jobs, repos.len());
    debug!(
        "{}: {} repositories, concurrency {}",
        label,
        repos.len(),
        concurrency
    );

    let names = repos.iter().map(|repo| repo.name.clone()).collect();
    let (board, slots) = ProgressBoard::start(
        options.draw.clone(),
        names,
        initial_message,
        options.output.clone(),
        options.tick,
    )?;

    let work = Arc::new(work);
    let tasks: Vec<_> = repos
        .iter()
        .cloned()
        .zip(slots)
        .map(|(repo, slot)| {
            let work = Arc::clone(&work);
            let runner = Arc::clone(&options.runner);
            move |_index: usize| -> Result<OperationOutcome> {
                match work(&repo, runner.as_ref(), &slot) {
                    Ok(outcome) => {
                        if outcome.failed {
                            slot.fail(outcome.message.clone());
                        } else {
                            slot.succeed(outcome.message.clone());
                        }
                        Ok(outcome)
                    }
                    Err(e) => {
                        slot.fail(e.to_string());
                        Err(e)
                    }
                }
            }
        })
        .collect();

    let results = match engine::fan_out(tasks, concurrency) {
        Ok(completions) => completions.into_indexed(),
        Err(e) => {
            board.finish();
            return Err(e);
        }
    };
    let progress = board.finish();

    let outcomes = repos
        .iter()
        .zip(results)
        .map(|(repo, result)| {
            result.unwrap_or_else(|e| OperationOutcome::failure(&repo.name, e.to_string()))
        })
        .collect();

    Ok(BatchResult {
        label,
        outcomes,
        progress,
        elapsed: started.elapsed(),
    })
}
