// hpcb-core/src/runner.rs
//! The seam through which installers touch external programs.

use std::fmt;
use std::path::{Path, PathBuf};

use hpcb_aio::process;
pub use hpcb_aio::process::CommandOutput;
use hpcb_common::error::Result;
use tracing::debug;

/// Runs external programs and locates binaries on `PATH`.
pub trait CommandRunner: fmt::Debug + Send + Sync {
    /// Runs `program` with `args` to completion, capturing stdout and stderr.
    /// `Err` means the process could not be started at all.
    fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> Result<CommandOutput>;

    /// Resolves `name` to an executable path, if one is available.
    fn find_binary(&self, name: &str) -> Option<PathBuf>;

    fn has_binary(&self, name: &str) -> bool {
        self.find_binary(name).is_some()
    }
}

/// Executes real processes on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> Result<CommandOutput> {
        process::run_command(program, args, cwd)
    }

    fn find_binary(&self, name: &str) -> Option<PathBuf> {
        match which::which(name) {
            Ok(path) => Some(path),
            Err(e) => {
                debug!("Binary '{}' not found on PATH: {}", name, e);
                None
            }
        }
    }
}

/// Converts anything path-like into an argument string.
pub(crate) fn arg(value: impl AsRef<std::ffi::OsStr>) -> String {
    value.as_ref().to_string_lossy().into_owned()
}
