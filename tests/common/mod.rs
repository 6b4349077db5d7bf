//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_repo_dirs(&["api", "web"]);
//!     fixture.command().arg("exec").arg("ls").assert().success();
//! }
//! ```
//!
//! Tests that need a real `git` call [`GitFixture::new`], which returns
//! `None` when `git` is not installed so the test can return early.

#![allow(dead_code)]

use assert_fs::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{git, git_available, GitFixture};
    pub use super::TestFixture;
}

/// A temporary workspace directory with an optional `gee.toml`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `gee.toml` with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("gee.toml")
            .write_str(content)
            .expect("Failed to write gee.toml");
        self
    }

    /// Create one plain directory per name and list them all in `gee.toml`.
    pub fn with_repo_dirs(self, names: &[&str]) -> Self {
        let mut config = String::new();
        for name in names {
            self.temp_dir
                .child(name)
                .create_dir_all()
                .expect("Failed to create repo dir");
            config.push_str(&format!("[[repos]]\nname = \"{}\"\npath = \".\"\n\n", name));
        }
        self.with_config(&config)
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to `gee.toml`.
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("gee.toml")
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A `gee` command running in this fixture's directory, without colors.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gee");
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a usable `git` is on PATH.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// Run git in `dir`, panicking on failure, and return trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        out.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

fn configure_identity(dir: &Path) {
    git(dir, &["config", "user.name", "gee tests"]);
    git(dir, &["config", "user.email", "gee@example.com"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
    git(dir, &["config", "pull.rebase", "false"]);
}

/// A bare remote on `main`, a seed clone to push upstream changes from,
/// and one or more working clones under `<root>/workspace`.
pub struct GitFixture {
    temp_dir: assert_fs::TempDir,
    pub remote: PathBuf,
    pub seed: PathBuf,
    pub workspace: PathBuf,
}

impl GitFixture {
    /// Set up the remote with one commit holding `a.txt`.
    ///
    /// Returns `None` when git is not available.
    pub fn new() -> Option<Self> {
        if !git_available() {
            eprintln!("git not found, skipping");
            return None;
        }
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();

        let remote = root.join("remote.git");
        fs::create_dir_all(&remote).unwrap();
        git(&remote, &["init", "--quiet", "--bare"]);
        git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        let seed = root.join("seed");
        fs::create_dir_all(&seed).unwrap();
        git(&seed, &["init", "--quiet"]);
        git(&seed, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        configure_identity(&seed);
        git(&seed, &["remote", "add", "origin", remote.to_str().unwrap()]);

        let workspace = root.join("workspace");
        fs::create_dir_all(&workspace).unwrap();

        let fixture = Self {
            temp_dir,
            remote,
            seed,
            workspace,
        };
        fixture.push_upstream("a.txt", "one\ntwo\nthree\n", "initial");
        Some(fixture)
    }

    /// Commit `content` to `file` in the seed clone and push it.
    pub fn push_upstream(&self, file: &str, content: &str, message: &str) -> String {
        fs::write(self.seed.join(file), content).unwrap();
        git(&self.seed, &["add", "-A"]);
        git(&self.seed, &["commit", "--quiet", "-m", message]);
        git(&self.seed, &["push", "--quiet", "origin", "main"]);
        git(&self.seed, &["rev-parse", "HEAD"])
    }

    /// Clone the remote into `<workspace>/<name>`.
    pub fn clone_work(&self, name: &str) -> PathBuf {
        let work = self.workspace.join(name);
        git(
            &self.workspace,
            &["clone", "--quiet", self.remote.to_str().unwrap(), name],
        );
        configure_identity(&work);
        work
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }
}
