// hpcb-core/src/install/artifacts/python.rs
use std::path::{Path, PathBuf};

use hpcb_aio::fs as hpcb_fs;
use hpcb_common::{InstallStatusResult, PythonExecutable};
use tracing::{debug, warn};

use super::Workspace;
use crate::runner::arg;

/// Interpreter used to create virtual environments.
pub const PYTHON_BINARY: &str = "python3";

const PYPROJECT_TOML: &str = "pyproject.toml";
const REQUIREMENTS_TXT: &str = "requirements.txt";

impl Workspace<'_> {
    pub fn venv_path(&self, py: &PythonExecutable) -> PathBuf {
        self.root.join(py.venv_name())
    }

    /// Clones the git source, creates the venv and installs its dependencies.
    pub fn install_python_executable(&self, py: &mut PythonExecutable) -> InstallStatusResult {
        let res = self.install_git_repo(&mut py.git_repo);
        if !res.is_success() {
            return res;
        }

        let Some(repo_dir) = py.git_repo.installed_path().map(Path::to_path_buf) else {
            return InstallStatusResult::failed(
                "Git repository must be installed before creating virtual environment.",
            );
        };

        let venv_path = self.venv_path(py);
        let venv_preexisting = venv_path.exists();
        let res = self.create_venv(&venv_path);
        if !res.is_success() {
            return res;
        }

        let project_dir = match &py.project_subpath {
            Some(subpath) => repo_dir.join(subpath),
            None => repo_dir,
        };

        let res = self.install_dependencies(py, &venv_path, &project_dir);
        if !res.is_success() {
            if !venv_preexisting {
                self.discard(&venv_path);
            }
            return res;
        }

        py.set_venv_path(venv_path);
        InstallStatusResult::ok()
    }

    pub fn create_venv(&self, venv_dir: &Path) -> InstallStatusResult {
        debug!("Creating virtual environment in {}", venv_dir.display());
        if venv_dir.exists() {
            let msg = format!("Virtual environment already exists at {}.", venv_dir.display());
            warn!("{}", msg);
            return InstallStatusResult::ok_with(msg);
        }

        let args = [arg("-m"), arg("venv"), arg(venv_dir)];
        let failure = match self.runner.run(PYTHON_BINARY, &args, None) {
            Ok(out) if out.success => return InstallStatusResult::ok(),
            Ok(out) => out.stderr.trim().to_string(),
            Err(e) => e.to_string(),
        };
        self.discard(venv_dir);
        InstallStatusResult::failed(format!("Failed to create venv: {failure}"))
    }

    /// Picks the dependency manifest: `pyproject.toml` wins over
    /// `requirements.txt` only when both exist and the executable prefers it.
    fn install_dependencies(
        &self,
        py: &PythonExecutable,
        venv_dir: &Path,
        project_dir: &Path,
    ) -> InstallStatusResult {
        let pyproject = project_dir.join(PYPROJECT_TOML);
        let requirements = project_dir.join(REQUIREMENTS_TXT);

        match (pyproject.exists(), requirements.exists()) {
            (true, true) if py.dependencies_from_pyproject => self.install_pyproject(venv_dir, project_dir),
            (true, true) => self.install_requirements(venv_dir, &requirements),
            (true, false) => self.install_pyproject(venv_dir, project_dir),
            (false, true) => self.install_requirements(venv_dir, &requirements),
            (false, false) => InstallStatusResult::failed(format!(
                "No {PYPROJECT_TOML} or {REQUIREMENTS_TXT} found for installation in {}.",
                project_dir.display()
            )),
        }
    }

    pub fn install_pyproject(&self, venv_dir: &Path, project_dir: &Path) -> InstallStatusResult {
        let python = venv_python(venv_dir);
        let args = [arg("-m"), arg("pip"), arg("install"), arg(project_dir)];
        match self.runner.run(&arg(&python), &args, None) {
            Ok(out) if out.success => InstallStatusResult::ok(),
            Ok(out) => InstallStatusResult::failed(format!(
                "Failed to install {} using pip: {}",
                project_dir.display(),
                out.stderr.trim()
            )),
            Err(e) => InstallStatusResult::failed(format!(
                "Failed to install {} using pip: {e}",
                project_dir.display()
            )),
        }
    }

    pub fn install_requirements(&self, venv_dir: &Path, requirements_txt: &Path) -> InstallStatusResult {
        if !requirements_txt.is_file() {
            return InstallStatusResult::failed(format!(
                "Requirements file is invalid or does not exist: {}",
                requirements_txt.display()
            ));
        }

        let python = venv_python(venv_dir);
        let args = [arg("-m"), arg("pip"), arg("install"), arg("-r"), arg(requirements_txt)];
        match self.runner.run(&arg(&python), &args, None) {
            Ok(out) if out.success => InstallStatusResult::ok(),
            Ok(out) => InstallStatusResult::failed(format!(
                "Failed to install dependencies from requirements.txt: {}",
                out.stderr.trim()
            )),
            Err(e) => InstallStatusResult::failed(format!(
                "Failed to install dependencies from requirements.txt: {e}"
            )),
        }
    }

    pub fn uninstall_python_executable(&self, py: &mut PythonExecutable) -> InstallStatusResult {
        let res = self.uninstall_git_repo(&mut py.git_repo);
        if !res.is_success() {
            return res;
        }

        let venv_path = py
            .venv_path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.venv_path(py));
        debug!("Uninstalling virtual environment at {}", venv_path.display());

        if !venv_path.exists() {
            py.clear_venv_path();
            return InstallStatusResult::ok_with(format!(
                "Virtual environment {} is not created.",
                py.venv_name()
            ));
        }

        match hpcb_fs::remove_path(&venv_path) {
            Ok(_) => {
                py.clear_venv_path();
                InstallStatusResult::ok()
            }
            Err(e) => InstallStatusResult::failed(format!(
                "Failed to remove virtual environment at {}: {e}",
                venv_path.display()
            )),
        }
    }

    pub fn is_python_executable_installed(&self, py: &mut PythonExecutable) -> InstallStatusResult {
        let repo_path = self.repo_path(&py.git_repo);
        if !repo_path.exists() {
            py.git_repo.clear_installed_path();
            py.clear_venv_path();
            return InstallStatusResult::failed(format!(
                "Git repository {} not cloned",
                py.git_repo.url
            ));
        }
        py.git_repo.set_installed_path(repo_path);

        let venv_path = self.venv_path(py);
        if !venv_path.exists() {
            py.clear_venv_path();
            return InstallStatusResult::failed(format!(
                "Virtual environment not created for {}",
                py.git_repo.url
            ));
        }
        py.set_venv_path(venv_path);

        InstallStatusResult::ok_with("Python executable installed")
    }

    pub fn mark_python_executable_installed(&self, py: &mut PythonExecutable) -> InstallStatusResult {
        let repo_path = self.repo_path(&py.git_repo);
        let venv_path = self.venv_path(py);
        py.git_repo.set_installed_path(repo_path);
        py.set_venv_path(venv_path);
        InstallStatusResult::ok()
    }
}

fn venv_python(venv_dir: &Path) -> PathBuf {
    venv_dir.join("bin").join("python")
}
