// hpcb-core/src/install/lsf.rs
//! Installer for systems managed by IBM Spectrum LSF.
//!
//! LSF keeps no session record: installed state is whatever exists under the
//! install root when asked.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hpcb_aio::fs as hpcb_fs;
use hpcb_common::error::Result;
use hpcb_common::{InstallStatusResult, Installable, System, Test};
use tracing::debug;

use super::artifacts::Workspace;
use super::{base, InstallerBackend, SchedulerInstaller};
use crate::check::prerequisites::check_binaries;
use crate::runner::CommandRunner;

/// LSF client binaries required on top of the base prerequisites.
pub const LSF_PREREQUISITES: &[&str] = &["bsub", "bjobs", "bhosts", "lsid", "lsload"];

const DOCKER_SKIPPED_MSG: &str = "Docker image installation skipped for LSF system.";

#[derive(Debug, Clone)]
pub struct LsfInstaller {
    system_name: String,
    install_path: Option<PathBuf>,
    runner: Arc<dyn CommandRunner>,
}

impl LsfInstaller {
    pub fn new(system: &System, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            system_name: system.name.clone(),
            install_path: system.install_root().map(Path::to_path_buf),
            runner,
        }
    }

    pub fn install_path(&self) -> Option<&Path> {
        self.install_path.as_deref()
    }

    fn in_workspace<F>(&self, op: F) -> InstallStatusResult
    where
        F: FnOnce(Workspace<'_>) -> InstallStatusResult,
    {
        match self.install_path.as_deref() {
            Some(root) => op(Workspace::new(root, self.runner.as_ref())),
            None => InstallStatusResult::failed(format!(
                "Installation path is not set for system '{}'.",
                self.system_name
            )),
        }
    }
}

impl InstallerBackend for LsfInstaller {
    fn check_prerequisites(&self) -> InstallStatusResult {
        let res = base::check_base_prerequisites(self.runner.as_ref());
        if !res.is_success() {
            return res;
        }
        check_binaries(self.runner.as_ref(), LSF_PREREQUISITES)
    }

    fn install_one(&self, item: &mut Installable) -> InstallStatusResult {
        debug!("Attempt to install {}", item);
        match item {
            Installable::DockerImage(_) => InstallStatusResult::ok_with(DOCKER_SKIPPED_MSG),
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
            Installable::DockerImage(_) => InstallStatusResult::ok_with(DOCKER_SKIPPED_MSG),
            Installable::GitRepo(repo) => self.in_workspace(|ws| ws.uninstall_git_repo(repo)),
            Installable::PythonExecutable(py) => {
                self.in_workspace(|ws| ws.uninstall_python_executable(py))
            }
            Installable::File(file) => self.in_workspace(|ws| ws.uninstall_file(file)),
        }
    }

    fn is_installed_one(&self, item: &mut Installable) -> InstallStatusResult {
        match item {
            Installable::DockerImage(_) => InstallStatusResult::ok_with(DOCKER_SKIPPED_MSG),
            Installable::GitRepo(repo) => self.in_workspace(|ws| ws.is_git_repo_installed(repo)),
            Installable::PythonExecutable(py) => {
                self.in_workspace(|ws| ws.is_python_executable_installed(py))
            }
            Installable::File(file) => self.in_workspace(|ws| ws.is_file_installed(file)),
        }
    }

    fn mark_as_installed_one(&self, item: &mut Installable) -> InstallStatusResult {
        match item {
            Installable::DockerImage(_) => InstallStatusResult::ok_with(DOCKER_SKIPPED_MSG),
            Installable::GitRepo(repo) => self.in_workspace(|ws| ws.mark_git_repo_installed(repo)),
            Installable::PythonExecutable(py) => {
                self.in_workspace(|ws| ws.mark_python_executable_installed(py))
            }
            Installable::File(file) => self.in_workspace(|ws| ws.mark_file_installed(file)),
        }
    }
}

impl SchedulerInstaller for LsfInstaller {
    fn install(&self, tests: &mut [Test]) -> Result<InstallStatusResult> {
        let prerequisites = self.check_prerequisites();
        if !prerequisites.is_success() {
            return Ok(prerequisites);
        }

        if let Some(root) = self.install_path.as_deref() {
            if let Err(e) = hpcb_fs::create_dir_all(root) {
                return Ok(InstallStatusResult::failed(format!(
                    "Failed to create installation directory at {}: {e}",
                    root.display()
                )));
            }
        }

        Ok(base::install_items(self, tests))
    }
}
