// hpcb-core/src/install/slurm.rs
//! Installer for systems managed by the Slurm scheduler.
//!
//! A completed install session is recorded in a per-user TOML file. The record
//! gates `is_installed` and tells `uninstall` which install root to remove.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hpcb_aio::fs as hpcb_fs;
use hpcb_aio::toml_io;
use hpcb_common::config::Config;
use hpcb_common::error::{HpcbError, Result};
use hpcb_common::{InstallStatusResult, Installable, System, Test};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::artifacts::Workspace;
use super::{base, InstallerBackend, SchedulerInstaller};
use crate::check::prerequisites::{check_binaries, check_help_flags};
use crate::runner::CommandRunner;

/// Slurm client binaries required on top of the base prerequisites.
pub const SLURM_PREREQUISITES: &[&str] = &["sbatch", "sinfo", "squeue", "srun", "scancel"];

/// Options `srun --help` must advertise.
pub const REQUIRED_SRUN_OPTIONS: &[&str] = &[
    "--mpi",
    "--gpus-per-node",
    "--ntasks-per-node",
    "--container-image",
    "--container-mounts",
];

const DOCKER_DEFERRED_MSG: &str =
    "Docker image installation is deferred to job submission on Slurm systems.";

/// Durable record of a completed install session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallerRecord {
    pub install_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SlurmInstaller {
    system_name: String,
    install_path: Option<PathBuf>,
    config_path: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl SlurmInstaller {
    pub fn new(system: &System, config: &Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            system_name: system.name.clone(),
            install_path: system.install_root().map(Path::to_path_buf),
            config_path: config.installer_record_path(),
            runner,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn install_path(&self) -> Option<&Path> {
        self.install_path.as_deref()
    }

    /// Runs `op` against the install root, or fails when no root is set.
    fn in_workspace<F>(&self, op: F) -> InstallStatusResult
    where
        F: FnOnce(Workspace<'_>) -> InstallStatusResult,
    {
        match self.install_path.as_deref() {
            Some(root) => op(Workspace::new(root, self.runner.as_ref())),
            None => self.missing_root(),
        }
    }

    fn missing_root(&self) -> InstallStatusResult {
        InstallStatusResult::failed(format!(
            "Installation path is not set for system '{}'. Please set install_path in the system definition.",
            self.system_name
        ))
    }

    /// Writes the record atomically. A failed write leaves no record behind.
    fn write_config(&self, root: &Path) -> InstallStatusResult {
        let install_path = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        let record = InstallerRecord { install_path };
        match toml_io::write_toml(&self.config_path, &record) {
            Ok(()) => {
                debug!("Wrote installer record to {}", self.config_path.display());
                InstallStatusResult::ok()
            }
            Err(e) => {
                if let Err(cleanup) = hpcb_fs::remove_path(&self.config_path) {
                    warn!(
                        "Failed to remove installer record {}: {}",
                        self.config_path.display(),
                        cleanup
                    );
                }
                InstallStatusResult::failed(format!(
                    "Failed to write installer configuration to {}: {e}",
                    self.config_path.display()
                ))
            }
        }
    }

    pub fn read_config(&self) -> Result<InstallerRecord> {
        toml_io::read_toml(&self.config_path).map_err(|e| {
            if e.is_not_found() {
                HpcbError::NotFound(format!(
                    "Configuration file not found at {}. The configuration file is automatically created during installation to store any settings.",
                    self.config_path.display()
                ))
            } else {
                e
            }
        })
    }

    fn remove_config(&self) -> Result<()> {
        hpcb_fs::remove_path(&self.config_path).map(|_| ())
    }
}

impl InstallerBackend for SlurmInstaller {
    /// Base prerequisites, then Slurm binaries, then `srun` options.
    fn check_prerequisites(&self) -> InstallStatusResult {
        let res = base::check_base_prerequisites(self.runner.as_ref());
        if !res.is_success() {
            return res;
        }
        let res = check_binaries(self.runner.as_ref(), SLURM_PREREQUISITES);
        if !res.is_success() {
            return res;
        }
        check_help_flags(self.runner.as_ref(), "srun", REQUIRED_SRUN_OPTIONS)
    }

    fn install_one(&self, item: &mut Installable) -> InstallStatusResult {
        debug!("Attempt to install {}", item);
        match item {
            Installable::DockerImage(image) => {
                info!("Skipping installation of Docker image {} on Slurm.", image.url);
                InstallStatusResult::ok_with(DOCKER_DEFERRED_MSG)
            }
            Installable::GitRepo(repo) => self.in_workspace(|ws| ws.install_git_repo(repo)),
            Installable::PythonExecutable(py) => {
                self.in_workspace(|ws| ws.install_python_executable(py))
            }
            Installable::File(file) => self.in_workspace(|ws| ws.install_file(file)),
        }
    }

    fn uninstall_one(&self, item: &mut Installable) -> InstallStatusResult {
        debug!("Attempt to uninstall {}", item);
        if self.install_path.is_none() && !matches!(item, Installable::DockerImage(_)) {
            return InstallStatusResult::ok_with(format!(
                "Installation path is not set; nothing to uninstall for {item}."
            ));
        }
        match item {
            Installable::DockerImage(_) => InstallStatusResult::ok_with(DOCKER_DEFERRED_MSG),
            Installable::GitRepo(repo) => self.in_workspace(|ws| ws.uninstall_git_repo(repo)),
            Installable::PythonExecutable(py) => {
                self.in_workspace(|ws| ws.uninstall_python_executable(py))
            }
            Installable::File(file) => self.in_workspace(|ws| ws.uninstall_file(file)),
        }
    }

    fn is_installed_one(&self, item: &mut Installable) -> InstallStatusResult {
        match item {
            Installable::DockerImage(_) => InstallStatusResult::ok_with(DOCKER_DEFERRED_MSG),
            Installable::GitRepo(repo) => self.in_workspace(|ws| ws.is_git_repo_installed(repo)),
            Installable::PythonExecutable(py) => {
                self.in_workspace(|ws| ws.is_python_executable_installed(py))
            }
            Installable::File(file) => self.in_workspace(|ws| ws.is_file_installed(file)),
        }
    }

    fn mark_as_installed_one(&self, item: &mut Installable) -> InstallStatusResult {
        match item {
            Installable::DockerImage(_) => InstallStatusResult::ok_with(DOCKER_DEFERRED_MSG),
            Installable::GitRepo(repo) => self.in_workspace(|ws| ws.mark_git_repo_installed(repo)),
            Installable::PythonExecutable(py) => {
                self.in_workspace(|ws| ws.mark_python_executable_installed(py))
            }
            Installable::File(file) => self.in_workspace(|ws| ws.mark_file_installed(file)),
        }
    }
}

impl SchedulerInstaller for SlurmInstaller {
    /// Requires a readable installer record before checking any artifact.
    fn is_installed(&self, tests: &mut [Test]) -> Result<InstallStatusResult> {
        let prerequisites = self.check_prerequisites();
        if !prerequisites.is_success() {
            return Ok(prerequisites);
        }

        if !self.config_path.exists() {
            return Ok(InstallStatusResult::failed(format!(
                "Configuration file does not exist at {}. The configuration file is automatically created during installation to store any settings.",
                self.config_path.display()
            )));
        }

        if let Err(e) = self.read_config() {
            return Ok(InstallStatusResult::failed(format!(
                "Configuration file at {} could not be read: {e}",
                self.config_path.display()
            )));
        }

        Ok(base::is_installed_items(self, tests))
    }

    fn install(&self, tests: &mut [Test]) -> Result<InstallStatusResult> {
        let Some(root) = self.install_path.as_deref() else {
            return Ok(self.missing_root());
        };

        let prerequisites = self.check_prerequisites();
        if !prerequisites.is_success() {
            return Ok(prerequisites);
        }

        if let Err(e) = hpcb_fs::create_dir_all(root) {
            return Ok(InstallStatusResult::failed(format!(
                "Failed to create installation directory at {}: {e}",
                root.display()
            )));
        }

        if !hpcb_fs::is_writable_dir(root) {
            return Ok(InstallStatusResult::failed(format!(
                "The installation path {} is not writable.",
                root.display()
            )));
        }

        let res = base::install_items(self, tests);
        if !res.is_success() {
            return Ok(res);
        }

        let res = self.write_config(root);
        if !res.is_success() {
            return Ok(res);
        }

        Ok(InstallStatusResult::ok_with(format!(
            "All test templates installed into {}.",
            root.display()
        )))
    }

    /// Removes artifacts, the recorded install root and the record itself.
    ///
    /// Without a record the install root cannot be resolved, so only the
    /// artifacts under the system's install path are removed. A record that
    /// exists but cannot be parsed is a hard error.
    fn uninstall(&self, tests: &mut [Test]) -> Result<InstallStatusResult> {
        let record = match self.read_config() {
            Ok(record) => record,
            Err(e) if e.is_not_found() => {
                warn!("{}", e);
                let res = base::uninstall(self, tests);
                if !res.is_success() {
                    return Ok(res);
                }
                return Ok(InstallStatusResult::ok_with(format!(
                    "Artifacts uninstalled, but no configuration file exists at {}; the install root could not be resolved and was not removed.",
                    self.config_path.display()
                )));
            }
            Err(e) => {
                return Err(HpcbError::Config(format!(
                    "Failed to read installer configuration at {}: {e}",
                    self.config_path.display()
                )))
            }
        };

        let recorded = SlurmInstaller {
            install_path: Some(record.install_path.clone()),
            ..self.clone()
        };
        let res = base::uninstall(&recorded, tests);
        if !res.is_success() {
            return Ok(res);
        }

        if let Err(e) = hpcb_fs::remove_path(&record.install_path) {
            return Ok(InstallStatusResult::failed(format!(
                "Failed to remove installation directory at {}: {e}",
                record.install_path.display()
            )));
        }

        if let Err(e) = self.remove_config() {
            return Ok(InstallStatusResult::failed(format!(
                "Failed to remove configuration file at {}: {e}",
                self.config_path.display()
            )));
        }

        Ok(InstallStatusResult::ok_with(
            "All test templates uninstalled successfully.",
        ))
    }
}
