//! In-memory collaborators.
//!
//! [`RecordingRunner`] and [`RecordingFileSystem`] note every request instead
//! of acting on it. They back the unit tests and the CLI's `--dry-run` mode.

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{ProcessError, Result};
use crate::linker::SystemLinker;
use crate::process::{FileSystem, ProcessRunner};
use crate::stage::command_line;

/// A process invocation captured by [`RecordingRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub dir: PathBuf,
    pub env: Vec<(String, String)>,
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Whether the caller asked for standard output to be forwarded.
    pub streamed: bool,
}

impl fmt::Display for RecordedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&command_line(&self.dir, &self.program, &self.args))
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// [`ProcessRunner`] that records calls and succeeds unless told otherwise.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<RecordedCall>>,
    failures: Mutex<HashMap<PathBuf, i32>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call to `program` exit with `code`.
    pub fn fail_program(&self, program: impl Into<PathBuf>, code: i32) {
        lock(&self.failures).insert(program.into(), code);
    }

    /// All calls recorded so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    fn record(
        &self,
        dir: &Path,
        env: &[(String, String)],
        program: &Path,
        args: &[String],
        streamed: bool,
    ) -> std::result::Result<(), ProcessError> {
        lock(&self.calls).push(RecordedCall {
            dir: dir.to_path_buf(),
            env: env.to_vec(),
            program: program.to_path_buf(),
            args: args.to_vec(),
            streamed,
        });
        match lock(&self.failures).get(program) {
            Some(&code) => Err(ProcessError::Failed {
                code: Some(code),
                stderr: format!("{}: simulated failure", program.display()),
            }),
            None => Ok(()),
        }
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(
        &self,
        dir: &Path,
        env: &[(String, String)],
        program: &Path,
        args: &[String],
    ) -> std::result::Result<(), ProcessError> {
        self.record(dir, env, program, args, false)
    }

    fn run_out(
        &self,
        _out: &mut dyn Write,
        dir: &Path,
        env: &[(String, String)],
        program: &Path,
        args: &[String],
    ) -> std::result::Result<(), ProcessError> {
        self.record(dir, env, program, args, true)
    }
}

/// [`FileSystem`] that records requested directories without creating them.
#[derive(Debug, Default)]
pub struct RecordingFileSystem {
    dirs: Mutex<Vec<PathBuf>>,
    fail: bool,
}

impl RecordingFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// A filesystem whose every `ensure_dir` fails with permission denied.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Directories requested so far, in order.
    pub fn dirs(&self) -> Vec<PathBuf> {
        lock(&self.dirs).clone()
    }
}

impl FileSystem for RecordingFileSystem {
    fn ensure_dir(&self, path: &Path) -> std::io::Result<()> {
        lock(&self.dirs).push(path.to_path_buf());
        if self.fail {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "simulated permission denied",
            ));
        }
        Ok(())
    }
}

/// [`SystemLinker`] that always answers with the same path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedLinker(pub PathBuf);

impl SystemLinker for FixedLinker {
    fn resolve_system_linker(&self) -> Result<PathBuf> {
        Ok(self.0.clone())
    }
}
