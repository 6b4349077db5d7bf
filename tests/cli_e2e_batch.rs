//! End-to-end tests for the commands that run across every repository:
//! `exec`, `status`, `clone` and `pull`.
//!
//! Stdout is not a terminal here, so the progress board prints its final
//! frame once instead of redrawing.

mod common;
use common::prelude::*;

// ============================================================================
// exec
// ============================================================================

#[test]
fn test_exec_runs_in_every_repository() {
    let fixture = TestFixture::new().with_repo_dirs(&["api", "web"]);
    fixture.child("api/marker-api").touch().unwrap();
    fixture.child("web/marker-web").touch().unwrap();

    fixture
        .command()
        .args(["exec", "ls"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$ ls"))
        .stdout(predicate::str::contains("marker-api"))
        .stdout(predicate::str::contains("marker-web"))
        .stdout(predicate::str::contains("Total: 2 | Successful: 2 | Failed: 0"));
}

#[test]
fn test_exec_joins_trailing_words() {
    let fixture = TestFixture::new().with_repo_dirs(&["api"]);

    fixture
        .command()
        .args(["exec", "echo", "-n", "hello", "world"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$ echo -n hello world"))
        .stdout(predicate::str::contains("hello world"));
}

#[test]
fn test_exec_failures_are_reported_per_repository() {
    let fixture = TestFixture::new().with_repo_dirs(&["api", "web"]);
    fixture.child("api/only-here").touch().unwrap();

    fixture
        .command()
        .args(["exec", "test", "-f", "only-here"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ api"))
        .stdout(predicate::str::contains("✗ web"))
        .stdout(predicate::str::contains("Total: 2 | Successful: 1 | Failed: 1"));
}

#[test]
fn test_exec_with_limited_jobs() {
    let fixture = TestFixture::new().with_repo_dirs(&["a", "b", "c"]);

    fixture
        .command()
        .args(["exec", "-j", "1", "pwd"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 3 | Successful: 3"));
}

// ============================================================================
// status
// ============================================================================

#[test]
fn test_status_on_non_repositories_fails_per_repo() {
    let fixture = TestFixture::new().with_repo_dirs(&["api", "web"]);

    fixture
        .command()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("✗  api"))
        .stdout(predicate::str::contains("Failed: 2"));
}

#[test]
fn test_status_summary_of_clean_and_dirty_repositories() {
    let Some(git_fixture) = GitFixture::new() else {
        return;
    };
    let fixture = TestFixture::new().with_config(
        "[[repos]]\nname = \"api\"\npath = \".\"\n\n[[repos]]\nname = \"web\"\npath = \".\"\n",
    );
    let remote = git_fixture.remote.to_str().unwrap();
    git(fixture.path(), &["clone", "--quiet", remote, "api"]);
    git(fixture.path(), &["clone", "--quiet", remote, "web"]);
    fixture.child("web/new.txt").write_str("x\n").unwrap();

    fixture
        .command()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("main"))
        .stdout(predicate::str::contains("clean"))
        .stdout(predicate::str::contains("?1 untracked"))
        .stdout(predicate::str::contains("Total: 2 | Successful: 2 | Failed: 0"));
}

#[test]
fn test_status_verbose_shows_git_output() {
    let Some(git_fixture) = GitFixture::new() else {
        return;
    };
    let fixture = TestFixture::new().with_config("[[repos]]\nname = \"api\"\npath = \".\"\n");
    let remote = git_fixture.remote.to_str().unwrap();
    git(fixture.path(), &["clone", "--quiet", remote, "api"]);

    fixture
        .command()
        .args(["status", "--verbose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$ git status"))
        .stdout(predicate::str::contains("On branch main"));
}

// ============================================================================
// clone / pull
// ============================================================================

#[test]
fn test_clone_then_pull() {
    let Some(git_fixture) = GitFixture::new() else {
        return;
    };
    let fixture = TestFixture::new().with_config(&format!(
        "[[repos]]\nname = \"api\"\npath = \"checkouts\"\nremote = \"{}\"\n",
        git_fixture.remote.display()
    ));

    fixture
        .command()
        .arg("clone")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 1 | Successful: 1 | Failed: 0"));
    fixture
        .child("checkouts/api/a.txt")
        .assert(predicate::path::exists());

    let work = fixture.path().join("checkouts/api");
    git(&work, &["config", "user.name", "gee tests"]);
    git(&work, &["config", "user.email", "gee@example.com"]);
    git_fixture.push_upstream("b.txt", "new\n", "add b");
    fixture.child("checkouts/api/local.txt").write_str("mine\n").unwrap();

    fixture
        .command()
        .arg("pull")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 1 | Successful: 1 | Failed: 0"));
    fixture
        .child("checkouts/api/b.txt")
        .assert(predicate::path::exists());

    fixture
        .child("checkouts/api/local.txt")
        .assert("mine\n");

    // The pre-pull commit of a stashed repository is recorded in the journal.
    fixture
        .child(".gee/gee.json")
        .assert(predicate::str::contains("\"api\""));
}

#[test]
fn test_pull_missing_repository_without_remote_fails() {
    let fixture = TestFixture::new().with_config("[[repos]]\nname = \"ghost\"\npath = \"nowhere\"\n");

    fixture
        .command()
        .arg("pull")
        .assert()
        .success()
        .stdout(predicate::str::contains("no remote configured"))
        .stdout(predicate::str::contains("Failed: 1"));
}
