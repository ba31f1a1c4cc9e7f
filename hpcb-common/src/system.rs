// hpcb-common/src/system.rs
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HpcbError, Result};

const INSTALL_PATH_OVERRIDE_ENV: &str = "HPCB_INSTALL_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerKind {
    Slurm,
    Lsf,
    Standalone,
    Kubernetes,
}

impl fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchedulerKind::Slurm => "slurm",
            SchedulerKind::Lsf => "lsf",
            SchedulerKind::Standalone => "standalone",
            SchedulerKind::Kubernetes => "kubernetes",
        };
        f.write_str(name)
    }
}

/// The cluster an installation targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct System {
    pub name: String,
    pub scheduler: SchedulerKind,
    /// Root directory under which every artifact is materialized.
    #[serde(default)]
    pub install_path: Option<PathBuf>,
}

impl System {
    pub fn new(name: impl Into<String>, scheduler: SchedulerKind, install_path: Option<PathBuf>) -> Self {
        Self {
            name: name.into(),
            scheduler,
            install_path,
        }
    }

    /// Loads a system descriptor from a TOML file.
    ///
    /// `HPCB_INSTALL_PATH` takes precedence over the file's `install_path`.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading system descriptor from {}", path.display());
        let raw = std::fs::read_to_string(path).map_err(|e| {
            HpcbError::Config(format!(
                "Failed to read system descriptor {}: {e}",
                path.display()
            ))
        })?;
        let mut system = Self::from_toml_str(&raw)?;
        if let Some(overridden) = env::var(INSTALL_PATH_OVERRIDE_ENV).ok().filter(|s| !s.is_empty()) {
            debug!(
                "Install path overridden by {}: {}",
                INSTALL_PATH_OVERRIDE_ENV, overridden
            );
            system.install_path = Some(PathBuf::from(overridden));
        }
        Ok(system)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(HpcbError::from)
    }

    /// The install root, ignoring an empty path.
    pub fn install_root(&self) -> Option<&Path> {
        self.install_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}
