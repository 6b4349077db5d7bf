//! Typed git subcommands for one working tree.
//!
//! Every method here is a single `git` invocation through a
//! [`CommandRunner`], returning the raw [`RunOutput`]. Interpretation of
//! the output (is the tree clean, did the stash apply) is left to the
//! caller except where git offers a machine-readable answer.

use std::path::Path;

use crate::defaults::REMOTE_NAME;
use crate::runner::{CommandRunner, RunOutput};

/// A git working tree reachable through a runner.
#[derive(Clone, Copy)]
pub struct GitRepo<'a> {
    runner: &'a dyn CommandRunner,
    dir: &'a Path,
}

impl<'a> GitRepo<'a> {
    pub fn new(runner: &'a dyn CommandRunner, dir: &'a Path) -> Self {
        Self { runner, dir }
    }

    /// Run an arbitrary git subcommand in this working tree.
    pub fn git(&self, args: &[&str]) -> RunOutput {
        self.runner.run(self.dir, "git", args)
    }

    /// `git pull origin <branch>`
    pub fn pull(&self, branch: &str) -> RunOutput {
        self.git(&["pull", REMOTE_NAME, branch])
    }

    /// Human-readable status, optionally forcing color.
    pub fn status(&self, color: bool) -> RunOutput {
        if color {
            self.git(&["-c", "color.status=always", "status"])
        } else {
            self.git(&["status"])
        }
    }

    /// `git status --porcelain=v2 --branch`, the input of
    /// [`StatusSummary::parse`](crate::status::StatusSummary::parse).
    pub fn status_porcelain_v2(&self) -> RunOutput {
        self.git(&["status", "--porcelain=v2", "--branch"])
    }

    /// Whether the working tree has no changes, untracked files included.
    ///
    /// `None` when git itself failed.
    pub fn is_clean(&self) -> (Option<bool>, RunOutput) {
        let out = self.git(&["status", "--porcelain"]);
        let clean = out
            .succeeded()
            .then(|| out.stdout.iter().all(u8::is_ascii_whitespace));
        (clean, out)
    }

    /// Full hash of `HEAD`.
    pub fn head_commit(&self) -> Option<String> {
        self.rev_parse(&["--verify", "HEAD"])
    }

    /// Name of the checked-out branch, `None` when detached or on error.
    pub fn current_branch(&self) -> Option<String> {
        self.git(&["symbolic-ref", "--quiet", "--short", "HEAD"])
            .succeeded_stdout()
    }

    /// Default branch of `origin`, read from `refs/remotes/origin/HEAD`.
    pub fn remote_default_branch(&self) -> Option<String> {
        let remote_head = format!("refs/remotes/{}/HEAD", REMOTE_NAME);
        let prefix = format!("{}/", REMOTE_NAME);
        self.git(&["symbolic-ref", "--quiet", "--short", &remote_head])
            .succeeded_stdout()
            .map(|name| {
                name.strip_prefix(&prefix)
                    .map(str::to_string)
                    .unwrap_or(name)
            })
    }

    /// Hash of the newest stash entry, if any.
    pub fn stash_top(&self) -> Option<String> {
        self.rev_parse(&["--verify", "--quiet", "refs/stash"])
    }

    /// `git stash push --include-untracked -m <message>`
    pub fn stash_push(&self, message: &str) -> RunOutput {
        self.git(&["stash", "push", "--include-untracked", "-m", message])
    }

    /// `git stash apply <stash>`; the entry stays on the stash list.
    pub fn stash_apply(&self, stash: &str) -> RunOutput {
        self.git(&["stash", "apply", stash])
    }

    /// `git stash apply --index <stash>`: staged changes come back staged.
    pub fn stash_apply_index(&self, stash: &str) -> RunOutput {
        self.git(&["stash", "apply", "--index", stash])
    }

    /// `git checkout -b <branch>`
    pub fn checkout_new_branch(&self, branch: &str) -> RunOutput {
        self.git(&["checkout", "-b", branch])
    }

    /// `git checkout <branch>`
    pub fn checkout(&self, branch: &str) -> RunOutput {
        self.git(&["checkout", branch])
    }

    /// Point `branch` at the current `HEAD` without checking it out.
    pub fn move_branch_here(&self, branch: &str) -> RunOutput {
        self.git(&["branch", "--force", branch, "HEAD"])
    }

    /// `git branch -D <branch>`
    pub fn delete_branch(&self, branch: &str) -> RunOutput {
        self.git(&["branch", "-D", branch])
    }

    /// Drop every change in the index and working tree, including an
    /// in-progress conflicted merge.
    pub fn reset_hard(&self) -> RunOutput {
        self.git(&["reset", "--hard", "HEAD"])
    }

    /// Remove untracked files and directories; ignored files stay.
    pub fn clean_untracked(&self) -> RunOutput {
        self.git(&["clean", "-d", "--force"])
    }

    /// `git config --get remote.origin.url`
    pub fn remote_url(&self) -> Option<String> {
        let key = format!("remote.{}.url", REMOTE_NAME);
        self.git(&["config", "--get", &key]).succeeded_stdout()
    }

    fn rev_parse(&self, args: &[&str]) -> Option<String> {
        let mut full = vec!["rev-parse"];
        full.extend_from_slice(args);
        self.git(&full).succeeded_stdout()
    }
}

/// `git clone <remote> <target>` run from `parent`.
pub fn clone(runner: &dyn CommandRunner, parent: &Path, remote: &str, target: &Path) -> RunOutput {
    let target = target.to_string_lossy();
    runner.run(parent, "git", &["clone", remote, &target])
}

/// Whether `dir` looks like a git working tree (has a `.git` entry).
pub fn is_work_tree(dir: &Path) -> bool {
    dir.join(".git").exists()
}

trait SucceededStdout {
    fn succeeded_stdout(self) -> Option<String>;
}

impl SucceededStdout for RunOutput {
    /// Trimmed stdout when the command succeeded and printed something.
    fn succeeded_stdout(self) -> Option<String> {
        if self.failed() {
            return None;
        }
        let text = String::from_utf8_lossy(&self.stdout).trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}
