//! # Command Runner
//!
//! The single primitive every repository operation is built on: run one
//! program with arguments inside one directory and capture what it wrote.
//!
//! ## Design
//!
//! [`CommandRunner`] is a trait so the layers above it (typed git
//! subcommands, the pull state machine, the batch orchestrators) can be
//! exercised with a scripted double in tests. [`SystemRunner`] is the real
//! implementation backed by `std::process::Command`.
//!
//! A runner never returns `Err`. A command exiting non-zero is an ordinary,
//! expected outcome ("nothing to commit", "already exists") and is reported
//! through [`RunOutput::failed`]. A command that could not be started at
//! all (binary missing, directory missing) is also a failed output, with
//! [`RunOutput::launch_error`] set so callers can tell the two apart.

use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, trace};

/// Captured result of one subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    /// Raw stdout bytes, untouched.
    pub stdout: Vec<u8>,
    /// Raw stderr bytes, untouched.
    pub stderr: Vec<u8>,
    /// Exit code, `None` if the process never started or was killed by a signal.
    pub exit_code: Option<i32>,
    /// Why the process could not be started, if it could not.
    pub launch_error: Option<String>,
}

impl RunOutput {
    /// An output for a process that exited with `code`.
    pub fn exited(stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>, code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code: Some(code),
            launch_error: None,
        }
    }

    /// An output for a process that could not be started.
    pub fn launch_failure(message: impl Into<String>) -> Self {
        Self {
            launch_error: Some(message.into()),
            ..Self::default()
        }
    }

    /// True iff the process exited non-zero or never ran.
    pub fn failed(&self) -> bool {
        self.exit_code != Some(0)
    }

    pub fn succeeded(&self) -> bool {
        !self.failed()
    }

    /// Stderr decoded lossily, trailing whitespace removed.
    pub fn stderr_trimmed(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim_end().to_string()
    }

    /// A one-line description of why this output counts as failed.
    pub fn failure_reason(&self) -> String {
        if let Some(err) = &self.launch_error {
            return err.clone();
        }
        let stderr = self.stderr_trimmed();
        let last = stderr.lines().last().unwrap_or_default();
        match self.exit_code {
            Some(code) if last.is_empty() => format!("exited with status {}", code),
            Some(code) => format!("exited with status {}: {}", code, last),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs one program inside one directory.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` with `dir` as working directory.
    fn run(&self, dir: &Path, program: &str, args: &[&str]) -> RunOutput;
}

/// The default implementation, spawning real subprocesses.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, dir: &Path, program: &str, args: &[&str]) -> RunOutput {
        debug!("running `{} {}` in {}", program, args.join(" "), dir.display());

        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .output();

        match output {
            Ok(output) => {
                trace!(
                    "`{} {}` in {} finished with {:?}",
                    program,
                    args.first().copied().unwrap_or_default(),
                    dir.display(),
                    output.status.code()
                );
                RunOutput {
                    stdout: output.stdout,
                    stderr: output.stderr,
                    exit_code: output.status.code(),
                    launch_error: None,
                }
            }
            Err(e) => {
                let message = if dir.exists() {
                    format!("unable to start {}: {}", program, e)
                } else {
                    format!("{}: No such file or directory", dir.display())
                };
                debug!("{}", message);
                RunOutput::launch_failure(message)
            }
        }
    }
}
