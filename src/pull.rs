//! # Pull With Recovery
//!
//! A `git pull` that is safe to run on a working tree with uncommitted
//! changes.
//!
//! ## Protocol
//!
//! ```text
//! Start ──► CheckClean ──clean──► DirectPull ──► done
//!                │
//!              dirty
//!                ▼
//!              Stash ──► CheckoutTemp ──► PullOnTemp ──► ApplyStash ──ok──► Finalize ──► done
//!                                                            │
//!                                                        conflict
//!                                                            ▼
//!                                                         Rollback ──► failed
//! ```
//!
//! Local changes, untracked files included, are stashed, the tracked branch is pulled while
//! positioned on the reserved [`TEMP_BRANCH`], and the stash is applied on
//! top of the updated history there. Only once that application is clean
//! is the user's branch moved forward to the temporary branch.
//!
//! When the stash does not apply cleanly the repository is rolled back:
//! the temporary branch's tree and the untracked files the failed
//! application restored are discarded, the original branch is checked
//! out again, the temporary branch is deleted and the stash is applied on
//! the original commit it was taken from, index included. The repository
//! ends exactly where it started and the pull is reported as failed.
//!
//! Once a stash exists, no failure path drops it. The stash is always
//! *applied*, never popped, and every failure message after the stash step
//! names the stash and the temporary branch for manual recovery.
//!
//! Each state is a variant of an enum with one transition method; the
//! machine for one repository never touches another repository.

use log::{debug, warn};

use crate::defaults::TEMP_BRANCH;
use crate::git::GitRepo;
use crate::runner::RunOutput;

/// Message attached to the stash entry created before pulling.
pub const STASH_MESSAGE: &str = "gee: local changes saved before pull";

/// Failure message when local changes conflict with the pulled history.
pub const REAPPLY_CONFLICT: &str = "unable to pull, local changes could not be reapplied cleanly";

/// How a pull ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullOutcome {
    /// The working tree was clean and the pull succeeded.
    Pulled,
    /// Local changes were stashed, the pull succeeded and the changes were
    /// reapplied. The stash entry is kept.
    PulledWithLocalChanges { stash: String },
    /// The pull did not happen or was rolled back.
    Failed { reason: String },
}

/// The states of the machine, for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    CheckClean,
    DirectPull,
    Stash,
    CheckoutTemp,
    PullOnTemp,
    ApplyStash,
    Finalize,
    Rollback,
}

/// Everything one pull produced.
#[derive(Debug, Clone)]
pub struct PullReport {
    pub outcome: PullOutcome,
    /// The tracked branch, once resolved.
    pub branch: Option<String>,
    /// `HEAD` before local changes were stashed.
    pub original_commit: Option<String>,
    /// Stdout of every mutating git step, concatenated verbatim.
    pub stdout: Vec<u8>,
    /// Stderr of every mutating git step, concatenated verbatim.
    pub stderr: Vec<u8>,
    /// States visited, in order.
    pub trace: Vec<Stage>,
}

impl PullReport {
    pub fn failed(&self) -> bool {
        matches!(self.outcome, PullOutcome::Failed { .. })
    }
}

enum State {
    Start,
    CheckClean,
    DirectPull,
    Stash,
    CheckoutTemp { stash: String },
    PullOnTemp { stash: String },
    ApplyStash { stash: String },
    Finalize { stash: String },
    Rollback { stash: String },
    Done(PullOutcome),
}

impl State {
    fn stage(&self) -> Option<Stage> {
        Some(match self {
            State::Start => Stage::Start,
            State::CheckClean => Stage::CheckClean,
            State::DirectPull => Stage::DirectPull,
            State::Stash => Stage::Stash,
            State::CheckoutTemp { .. } => Stage::CheckoutTemp,
            State::PullOnTemp { .. } => Stage::PullOnTemp,
            State::ApplyStash { .. } => Stage::ApplyStash,
            State::Finalize { .. } => Stage::Finalize,
            State::Rollback { .. } => Stage::Rollback,
            State::Done(_) => return None,
        })
    }
}

fn failed(reason: impl Into<String>) -> State {
    State::Done(PullOutcome::Failed {
        reason: reason.into(),
    })
}

/// One pull of one repository.
pub struct PullRecovery<'a> {
    repo: GitRepo<'a>,
    name: &'a str,
    configured_branch: Option<&'a str>,
    branch: String,
    original_commit: Option<String>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    trace: Vec<Stage>,
}

impl<'a> PullRecovery<'a> {
    /// `configured_branch` is the branch from `gee.toml`, if any. Without
    /// one, the remote's default branch is tracked, falling back to the
    /// current branch.
    pub fn new(repo: GitRepo<'a>, name: &'a str, configured_branch: Option<&'a str>) -> Self {
        Self {
            repo,
            name,
            configured_branch,
            branch: String::new(),
            original_commit: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
            trace: Vec::new(),
        }
    }

    /// Drive the machine to a terminal state.
    pub fn run(mut self) -> PullReport {
        let mut state = State::Start;
        loop {
            if let Some(stage) = state.stage() {
                debug!("{}: pull entering {:?}", self.name, stage);
                self.trace.push(stage);
            }
            state = match state {
                State::Start => self.start(),
                State::CheckClean => self.check_clean(),
                State::DirectPull => self.direct_pull(),
                State::Stash => self.stash(),
                State::CheckoutTemp { stash } => self.checkout_temp(stash),
                State::PullOnTemp { stash } => self.pull_on_temp(stash),
                State::ApplyStash { stash } => self.apply_stash(stash),
                State::Finalize { stash } => self.finalize(stash),
                State::Rollback { stash } => self.rollback(stash),
                State::Done(outcome) => return self.finish(outcome),
            };
        }
    }

    fn finish(self, outcome: PullOutcome) -> PullReport {
        debug!("{}: pull finished with {:?}", self.name, outcome);
        PullReport {
            outcome,
            branch: (!self.branch.is_empty()).then_some(self.branch),
            original_commit: self.original_commit,
            stdout: self.stdout,
            stderr: self.stderr,
            trace: self.trace,
        }
    }

    /// Keep a step's output for the final report.
    fn record(&mut self, out: &RunOutput) {
        self.stdout.extend_from_slice(&out.stdout);
        self.stderr.extend_from_slice(&out.stderr);
        if let Some(err) = &out.launch_error {
            self.stderr.extend_from_slice(err.as_bytes());
            self.stderr.push(b'\n');
        }
    }

    fn start(&mut self) -> State {
        let Some(current) = self.repo.current_branch() else {
            return failed(format!(
                "unable to determine the current branch of {}",
                self.name
            ));
        };

        let tracked = self
            .configured_branch
            .map(str::to_string)
            .or_else(|| self.repo.remote_default_branch())
            .unwrap_or_else(|| current.clone());

        if current != tracked {
            return failed(format!(
                "skipping, cannot update {}, must checkout to {}",
                self.name, tracked
            ));
        }

        self.branch = tracked;
        State::CheckClean
    }

    fn check_clean(&mut self) -> State {
        match self.repo.is_clean() {
            (Some(true), _) => State::DirectPull,
            (Some(false), _) => State::Stash,
            (None, out) => {
                self.record(&out);
                failed(format!(
                    "unable to read the status of {}: {}",
                    self.name,
                    out.failure_reason()
                ))
            }
        }
    }

    fn direct_pull(&mut self) -> State {
        let out = self.repo.pull(&self.branch);
        self.record(&out);
        if out.succeeded() {
            State::Done(PullOutcome::Pulled)
        } else {
            failed(format!("failed to pull {}", self.name))
        }
    }

    fn stash(&mut self) -> State {
        self.original_commit = self.repo.head_commit();
        let before = self.repo.stash_top();

        let push = self.repo.stash_push(STASH_MESSAGE);
        self.record(&push);
        if push.failed() {
            return failed(format!(
                "unable to stash local changes in {}, working tree left as is",
                self.name
            ));
        }

        match self.repo.stash_top() {
            Some(stash) if Some(&stash) != before.as_ref() => State::CheckoutTemp { stash },
            // Nothing was stashable after all; the tree is clean now.
            _ => State::DirectPull,
        }
    }

    fn checkout_temp(&mut self, stash: String) -> State {
        let out = self.repo.checkout_new_branch(TEMP_BRANCH);
        self.record(&out);
        if out.failed() {
            return failed(format!(
                "unable to create temporary branch {} in {}; local changes are kept in stash {}, \
                 restore them with `git stash apply {}`",
                TEMP_BRANCH, self.name, stash, stash
            ));
        }
        State::PullOnTemp { stash }
    }

    fn pull_on_temp(&mut self, stash: String) -> State {
        let out = self.repo.pull(&self.branch);
        self.record(&out);
        if out.failed() {
            return failed(format!(
                "failed to pull {} on temporary branch {}; local changes are kept in stash {}. \
                 To recover: git checkout {} && git branch -D {} && git stash apply {}",
                self.name, TEMP_BRANCH, stash, self.branch, TEMP_BRANCH, stash
            ));
        }
        State::ApplyStash { stash }
    }

    fn apply_stash(&mut self, stash: String) -> State {
        let out = self.repo.stash_apply(&stash);
        self.record(&out);
        if out.succeeded() {
            State::Finalize { stash }
        } else {
            State::Rollback { stash }
        }
    }

    fn finalize(&mut self, stash: String) -> State {
        let (name, branch) = (self.name, self.branch.clone());
        let manual = |what: &str| {
            format!(
                "pulled {} on temporary branch {} but could not {}; local changes are applied \
                 on {} and kept in stash {}",
                name, TEMP_BRANCH, what, TEMP_BRANCH, stash
            )
        };

        // The temporary branch descends from the tracked one, so this is a
        // fast-forward of the user's branch.
        let moved = self.repo.move_branch_here(&branch);
        self.record(&moved);
        if moved.failed() {
            return failed(manual(&format!("move {} forward", branch)));
        }

        let checkout = self.repo.checkout(&branch);
        self.record(&checkout);
        if checkout.failed() {
            return failed(manual(&format!("check out {}", branch)));
        }

        let deleted = self.repo.delete_branch(TEMP_BRANCH);
        self.record(&deleted);
        if deleted.failed() {
            warn!(
                "{}: pulled, but temporary branch {} could not be deleted",
                self.name, TEMP_BRANCH
            );
        }

        State::Done(PullOutcome::PulledWithLocalChanges { stash })
    }

    fn rollback(&mut self, stash: String) -> State {
        let (name, branch) = (self.name, self.branch.clone());
        let manual = || {
            format!(
                "{}; restoring {} failed, manual recovery needed: temporary branch {}, stash {}",
                REAPPLY_CONFLICT, name, TEMP_BRANCH, stash
            )
        };

        // The stash holds the local changes; the temporary tree is disposable.
        let reset = self.repo.reset_hard();
        self.record(&reset);
        if reset.failed() {
            return failed(manual());
        }

        // Untracked files restored by the failed apply also live in the stash.
        let cleaned = self.repo.clean_untracked();
        self.record(&cleaned);
        if cleaned.failed() {
            return failed(manual());
        }

        let checkout = self.repo.checkout(&branch);
        self.record(&checkout);
        if checkout.failed() {
            return failed(manual());
        }

        let deleted = self.repo.delete_branch(TEMP_BRANCH);
        self.record(&deleted);

        // Back on the commit the stash was taken from, so the index applies
        // as well and staged, unstaged and untracked files return as they were.
        let reapplied = self.repo.stash_apply_index(&stash);
        self.record(&reapplied);
        if reapplied.failed() {
            return failed(manual());
        }

        if deleted.failed() {
            return failed(format!(
                "{}; temporary branch {} could not be deleted",
                REAPPLY_CONFLICT, TEMP_BRANCH
            ));
        }
        failed(REAPPLY_CONFLICT)
    }
}
