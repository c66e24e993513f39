//! gc toolchain selection and stage invocation for the gb build tool.
//!
//! Translates abstract build requests into invocations of the external gc
//! toolchain binaries that live under `$GOROOT/pkg/tool/<os>_<arch>`.
//!
//! # Architecture
//!
//! - **Configuration:** [`ToolchainConfig`] resolves the target triple from
//!   host defaults, an environment snapshot, and ordered overrides.
//! - **Resolution:** [`ToolchainConfig::resolve`] rejects cross-compilation and
//!   computes the five tool paths, producing an immutable [`GcToolchain`].
//! - **Stages:** [`Context`] runs the compile, assemble, native compile, pack and
//!   link stages for a [`BuildUnit`] through the [`ProcessRunner`] and
//!   [`FileSystem`] collaborators.

pub mod config;
pub mod context;
pub mod error;
pub mod linker;
pub mod platform;
pub mod process;
pub mod recording;
pub mod stage;
pub mod toolchain;
pub mod unit;

// Re-exports for convenience.
pub use config::{ConfigFile, ConfigOverride, EnvSnapshot, ToolchainConfig};
pub use context::Context;
pub use error::{ProcessError, Result, ToolchainError};
pub use linker::{HostLinker, SystemLinker};
pub use platform::{arch_char, PlatformTriple};
pub use process::{FileSystem, OsFileSystem, ProcessRunner, SystemRunner};
pub use stage::{Stage, StageInvocation};
pub use toolchain::GcToolchain;
pub use unit::{BuildUnit, Package};
