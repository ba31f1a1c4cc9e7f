// hpcb-core/src/install/artifacts/mod.rs
//! Per-kind install steps shared by the Slurm and LSF installers.

use std::path::Path;

use hpcb_aio::fs as hpcb_fs;
use tracing::{debug, warn};

use crate::runner::CommandRunner;

pub mod file;
pub mod git;
pub mod python;

pub use python::PYTHON_BINARY;

/// An install root plus the runner used to materialize artifacts in it.
#[derive(Debug, Clone, Copy)]
pub struct Workspace<'a> {
    pub root: &'a Path,
    pub runner: &'a dyn CommandRunner,
}

impl<'a> Workspace<'a> {
    pub fn new(root: &'a Path, runner: &'a dyn CommandRunner) -> Self {
        Self { root, runner }
    }

    /// Removes a partially created artifact after a failed step.
    pub(crate) fn discard(&self, path: &Path) {
        match hpcb_fs::remove_path(path) {
            Ok(true) => debug!("Removed partial artifact at {}", path.display()),
            Ok(false) => {}
            Err(e) => warn!(
                "Failed to clean up partial artifact at {}: {}",
                path.display(),
                e
            ),
        }
    }
}
