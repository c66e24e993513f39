//! Error types for toolchain configuration and stage invocation.

use std::path::PathBuf;

use crate::platform::PlatformTriple;
use crate::stage::Stage;

/// Errors that can occur while configuring the toolchain or running a stage.
#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    /// Host and target triples differ.
    #[error("cross compilation from host {host} to target {target} not supported")]
    CrossCompilation {
        /// The platform running the build.
        host: PlatformTriple,
        /// The platform that was requested.
        target: PlatformTriple,
    },

    /// No architecture character is defined for the target architecture.
    #[error("unsupported GOARCH {arch}")]
    UnsupportedArch {
        /// The requested architecture.
        arch: String,
    },

    /// Neither the environment nor any override named a toolchain root.
    #[error("toolchain root not set: export GOROOT or pass a goroot override")]
    MissingRoot,

    /// The output directory of a stage could not be created.
    #[error("{stage}: creating {}: {source}", path.display())]
    CreateDir {
        /// The stage that needed the directory.
        stage: Stage,
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// An external tool could not be started or exited unsuccessfully.
    #[error("{stage}: {} {}: {source}", tool.display(), args.join(" "))]
    Invocation {
        /// The stage being run.
        stage: Stage,
        /// The executable that was invoked.
        tool: PathBuf,
        /// Arguments passed to the executable.
        args: Vec<String>,
        /// What the process runner reported.
        #[source]
        source: ProcessError,
    },

    /// A stage that needs at least one input file was given none.
    #[error("{stage}: no input files")]
    NoInputs {
        /// The stage that was called.
        stage: Stage,
    },

    /// The C compiler front end used for external linking was not found.
    #[error("{stage}: C compiler {name} not found in PATH")]
    LinkerNotFound {
        /// The stage that needed the C compiler.
        stage: Stage,
        /// The compiler name that was searched for.
        name: String,
    },

    /// A toolchain config file could not be parsed.
    #[error("config file {}: {detail}", path.display())]
    ConfigFile {
        /// The config file path.
        path: PathBuf,
        /// Description of the parse failure.
        detail: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure reported by a [`ProcessRunner`](crate::process::ProcessRunner).
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// The executable could not be started.
    #[error("failed to start: {0}")]
    Spawn(#[source] std::io::Error),

    /// Copying the tool's standard output to the caller's sink failed.
    #[error("forwarding output: {0}")]
    Output(#[source] std::io::Error),

    /// The executable ran and exited unsuccessfully.
    #[error("{}{}", exit_description(*code), stderr_suffix(stderr))]
    Failed {
        /// Exit code, or `None` if the process was killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },
}

fn exit_description(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n{stderr}")
    }
}

/// Result type for toolchain operations.
pub type Result<T> = std::result::Result<T, ToolchainError>;
