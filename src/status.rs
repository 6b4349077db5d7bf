//! # Status Summary
//!
//! Turns the output of `git status --porcelain=v2 --branch` into a
//! [`StatusSummary`]: branch, ahead/behind counts and per-category change
//! counts.
//!
//! ## Parsing rules
//!
//! - `# branch.head <name>` sets the branch (`(detached)` when detached).
//! - `# branch.ab +<ahead> -<behind>` sets the divergence counts; both
//!   default to zero when the header is absent (no upstream).
//! - `1 <XY> ...` and `2 <XY> ...` (ordinary and renamed entries) count
//!   once as staged when `X` is not `.` and once as modified when `Y` is
//!   not `.`.
//! - `u ...` counts as a conflict, `? ...` as untracked.
//! - Anything else (ignored entries, unknown headers, garbage) is skipped.
//!
//! Parsing is a pure function of the text. Detecting an in-progress
//! rebase, merge or cherry-pick needs the repository's `.git` directory and
//! is the separate step [`detect_special_state`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Branch name git reports in porcelain v2 when `HEAD` is detached.
pub const DETACHED_HEAD: &str = "(detached)";

/// A long-running git operation the repository is in the middle of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialState {
    Rebase,
    Merge,
    CherryPick,
}

impl fmt::Display for SpecialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SpecialState::Rebase => "REBASE",
            SpecialState::Merge => "MERGE",
            SpecialState::CherryPick => "CHERRY-PICK",
        };
        f.write_str(label)
    }
}

/// Rebase progress as reported by git's own counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: u32,
    pub total: u32,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.total)
    }
}

/// Structured summary of one repository's status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub branch: String,
    pub special_state: Option<SpecialState>,
    pub progress: Option<Progress>,
    pub ahead: u32,
    pub behind: u32,
    pub staged: u32,
    pub modified: u32,
    pub untracked: u32,
    pub conflicts: u32,
}

impl StatusSummary {
    /// Parse porcelain v2 status text. Never fails; unknown lines are skipped.
    pub fn parse(output: &str) -> Self {
        let mut summary = Self::default();

        for line in output.lines() {
            if let Some(head) = line.strip_prefix("# branch.head ") {
                summary.branch = head.trim().to_string();
            } else if let Some(ab) = line.strip_prefix("# branch.ab ") {
                if let Some((ahead, behind)) = parse_ahead_behind(ab) {
                    summary.ahead = ahead;
                    summary.behind = behind;
                }
            } else if line.starts_with("1 ") || line.starts_with("2 ") {
                summary.count_changed_entry(line);
            } else if line.starts_with("u ") {
                summary.conflicts += 1;
            } else if line.starts_with("? ") {
                summary.untracked += 1;
            }
        }

        summary
    }

    fn count_changed_entry(&mut self, line: &str) {
        let Some(xy) = line.split_whitespace().nth(1) else {
            return;
        };
        let mut flags = xy.chars();
        let (Some(x), Some(y), None) = (flags.next(), flags.next(), flags.next()) else {
            return;
        };
        if x != '.' {
            self.staged += 1;
        }
        if y != '.' {
            self.modified += 1;
        }
    }

    /// Whether `HEAD` is detached, the only case where sentinel detection applies.
    pub fn is_detached(&self) -> bool {
        self.branch == DETACHED_HEAD
    }

    /// No staged, modified, untracked or conflicted entries.
    pub fn is_clean(&self) -> bool {
        self.staged == 0 && self.modified == 0 && self.untracked == 0 && self.conflicts == 0
    }

    /// Fill `special_state`/`progress` from the repository's sentinel files.
    ///
    /// Only consults the filesystem when the branch is detached.
    pub fn with_special_state(mut self, work_tree: &Path) -> Self {
        if self.is_detached() {
            if let Some((state, progress)) = detect_special_state(work_tree) {
                self.special_state = Some(state);
                self.progress = progress;
            }
        }
        self
    }
}

fn parse_ahead_behind(text: &str) -> Option<(u32, u32)> {
    let mut parts = text.split_whitespace();
    let ahead = parts.next()?.strip_prefix('+')?.parse().ok()?;
    let behind = parts.next()?.strip_prefix('-')?.parse().ok()?;
    Some((ahead, behind))
}

/// Inspect `.git` sentinel markers for a rebase, merge or cherry-pick.
///
/// Checked in order: `rebase-merge/` (interactive rebase, progress from
/// `msgnum`/`end`), `rebase-apply/` (am-style rebase, progress from
/// `next`/`last`), `MERGE_HEAD`, `CHERRY_PICK_HEAD`.
pub fn detect_special_state(work_tree: &Path) -> Option<(SpecialState, Option<Progress>)> {
    let git_dir = resolve_git_dir(work_tree)?;

    let rebase_merge = git_dir.join("rebase-merge");
    if rebase_merge.is_dir() {
        return Some((
            SpecialState::Rebase,
            read_progress(&rebase_merge, "msgnum", "end"),
        ));
    }

    let rebase_apply = git_dir.join("rebase-apply");
    if rebase_apply.is_dir() {
        return Some((
            SpecialState::Rebase,
            read_progress(&rebase_apply, "next", "last"),
        ));
    }

    if git_dir.join("MERGE_HEAD").exists() {
        return Some((SpecialState::Merge, None));
    }

    if git_dir.join("CHERRY_PICK_HEAD").exists() {
        return Some((SpecialState::CherryPick, None));
    }

    None
}

/// The repository's git directory: `.git` itself, or the target of a
/// `gitdir:` pointer file as used by linked worktrees and submodules.
fn resolve_git_dir(work_tree: &Path) -> Option<PathBuf> {
    let dot_git = work_tree.join(".git");
    if dot_git.is_dir() {
        return Some(dot_git);
    }
    let pointer = fs::read_to_string(&dot_git).ok()?;
    let target = pointer.trim().strip_prefix("gitdir:")?.trim();
    let target = Path::new(target);
    Some(if target.is_absolute() {
        target.to_path_buf()
    } else {
        work_tree.join(target)
    })
}

fn read_progress(dir: &Path, current: &str, total: &str) -> Option<Progress> {
    let read = |name: &str| -> Option<u32> {
        fs::read_to_string(dir.join(name))
            .ok()?
            .trim()
            .parse()
            .ok()
    };
    Some(Progress {
        current: read(current)?,
        total: read(total)?,
    })
}
