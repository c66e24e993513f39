//! Process and filesystem collaborators.
//!
//! Stages never touch `std::process` or `std::fs` directly; they go through
//! [`ProcessRunner`] and [`FileSystem`] so that tests and dry runs can
//! substitute recording implementations.

use std::io::{Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::ProcessError;

/// Runs an external executable to completion.
pub trait ProcessRunner: Send + Sync {
    /// Run `program` in `dir`, discarding its standard output.
    fn run(
        &self,
        dir: &Path,
        env: &[(String, String)],
        program: &Path,
        args: &[String],
    ) -> Result<(), ProcessError>;

    /// Run `program` in `dir`, copying its standard output to `out`.
    fn run_out(
        &self,
        out: &mut dyn Write,
        dir: &Path,
        env: &[(String, String)],
        program: &Path,
        args: &[String],
    ) -> Result<(), ProcessError>;
}

/// Creates directories.
pub trait FileSystem: Send + Sync {
    /// Create `path` and any missing parents.
    fn ensure_dir(&self, path: &Path) -> std::io::Result<()>;
}

/// [`ProcessRunner`] backed by `std::process::Command`.
///
/// Standard error is captured and returned in [`ProcessError::Failed`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(dir: &Path, env: &[(String, String)], program: &Path, args: &[String]) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(dir)
            .envs(env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }
}

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        dir: &Path,
        env: &[(String, String)],
        program: &Path,
        args: &[String],
    ) -> Result<(), ProcessError> {
        let output = Self::command(dir, env, program, args)
            .stdout(Stdio::null())
            .output()
            .map_err(ProcessError::Spawn)?;
        if !output.status.success() {
            return Err(ProcessError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }

    fn run_out(
        &self,
        out: &mut dyn Write,
        dir: &Path,
        env: &[(String, String)],
        program: &Path,
        args: &[String],
    ) -> Result<(), ProcessError> {
        let mut child = Self::command(dir, env, program, args)
            .stdout(Stdio::piped())
            .spawn()
            .map_err(ProcessError::Spawn)?;

        // stderr is drained concurrently with stdout.
        let stderr = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                buf
            })
        });

        let copied = match child.stdout.take() {
            Some(mut pipe) => std::io::copy(&mut pipe, &mut *out).map(|_| ()),
            None => Ok(()),
        };
        let status = child.wait().map_err(ProcessError::Spawn)?;
        let stderr = stderr
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if !status.success() {
            return Err(ProcessError::Failed {
                code: status.code(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            });
        }
        copied.map_err(ProcessError::Output)?;
        out.flush().map_err(ProcessError::Output)
    }
}

/// [`FileSystem`] backed by `std::fs::create_dir_all`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn ensure_dir(&self, path: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".into(), script.into()]
    }

    #[test]
    fn run_success() {
        let dir = tempfile::tempdir().unwrap();
        SystemRunner
            .run(dir.path(), &[], Path::new("/bin/sh"), &sh("exit 0"))
            .unwrap();
    }

    #[test]
    fn run_nonzero_exit_captures_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let err = SystemRunner
            .run(dir.path(), &[], Path::new("/bin/sh"), &sh("echo boom >&2; exit 3"))
            .unwrap_err();
        match err {
            ProcessError::Failed { code, stderr } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr.trim(), "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn run_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let err = SystemRunner
            .run(dir.path(), &[], Path::new("/nonexistent/6g"), &[])
            .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn(_)));
    }

    #[test]
    fn run_out_streams_stdout_in_dir_with_env() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        SystemRunner
            .run_out(
                &mut out,
                dir.path(),
                &[("GB_TEST_VALUE".into(), "42".into())],
                Path::new("/bin/sh"),
                &sh("echo $GB_TEST_VALUE; pwd"),
            )
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("42"));
        let pwd = std::fs::canonicalize(lines.next().unwrap()).unwrap();
        assert_eq!(pwd, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn os_filesystem_creates_nested_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        OsFileSystem.ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // Idempotent.
        OsFileSystem.ensure_dir(&nested).unwrap();
    }
}
