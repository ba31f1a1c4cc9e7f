// hpcb-core/src/install/artifacts/git.rs
use std::path::{Path, PathBuf};

use hpcb_aio::fs as hpcb_fs;
use hpcb_common::{GitRepo, InstallStatusResult};
use tracing::{debug, warn};

use super::Workspace;
use crate::runner::arg;

impl Workspace<'_> {
    pub fn repo_path(&self, repo: &GitRepo) -> PathBuf {
        self.root.join(repo.repo_name())
    }

    /// Clones `repo` at the pinned commit unless its directory already exists.
    pub fn install_git_repo(&self, repo: &mut GitRepo) -> InstallStatusResult {
        let repo_path = self.repo_path(repo);
        if repo_path.exists() {
            let msg = format!("Git repository already exists at {}.", repo_path.display());
            warn!("{}", msg);
            repo.set_installed_path(repo_path);
            return InstallStatusResult::ok_with(msg);
        }

        let res = self.clone_repository(&repo.url, &repo_path);
        if !res.is_success() {
            self.discard(&repo_path);
            return res;
        }

        let res = self.checkout_commit(&repo.commit, &repo_path);
        if !res.is_success() {
            // A clone at the wrong commit would later pass the existence check.
            self.discard(&repo_path);
            return res;
        }

        repo.set_installed_path(repo_path);
        InstallStatusResult::ok()
    }

    pub fn clone_repository(&self, git_url: &str, path: &Path) -> InstallStatusResult {
        debug!("Cloning repository {} into {}", git_url, path.display());
        let args = [arg("clone"), arg(git_url), arg(path)];
        match self.runner.run("git", &args, None) {
            Ok(out) if out.success => InstallStatusResult::ok(),
            Ok(out) => InstallStatusResult::failed(format!(
                "Failed to clone repository: {}",
                out.stderr.trim()
            )),
            Err(e) => InstallStatusResult::failed(format!("Failed to clone repository: {e}")),
        }
    }

    pub fn checkout_commit(&self, commit: &str, path: &Path) -> InstallStatusResult {
        debug!("Checking out specific commit in {}: {}", path.display(), commit);
        let args = [arg("checkout"), arg(commit)];
        match self.runner.run("git", &args, Some(path)) {
            Ok(out) if out.success => InstallStatusResult::ok(),
            Ok(out) => InstallStatusResult::failed(format!(
                "Failed to checkout commit: {}",
                out.stderr.trim()
            )),
            Err(e) => InstallStatusResult::failed(format!("Failed to checkout commit: {e}")),
        }
    }

    pub fn uninstall_git_repo(&self, repo: &mut GitRepo) -> InstallStatusResult {
        let repo_path = repo
            .installed_path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.repo_path(repo));
        debug!("Uninstalling git repository at {}", repo_path.display());

        if !repo_path.exists() {
            repo.clear_installed_path();
            return InstallStatusResult::ok_with(format!("Repository {} is not cloned.", repo.url));
        }

        match hpcb_fs::remove_path(&repo_path) {
            Ok(_) => {
                repo.clear_installed_path();
                InstallStatusResult::ok()
            }
            Err(e) => InstallStatusResult::failed(format!(
                "Failed to remove repository at {}: {e}",
                repo_path.display()
            )),
        }
    }

    pub fn is_git_repo_installed(&self, repo: &mut GitRepo) -> InstallStatusResult {
        let repo_path = self.repo_path(repo);
        if repo_path.exists() {
            repo.set_installed_path(repo_path);
            InstallStatusResult::ok()
        } else {
            repo.clear_installed_path();
            InstallStatusResult::failed(format!("Git repository {} not cloned", repo.url))
        }
    }

    pub fn mark_git_repo_installed(&self, repo: &mut GitRepo) -> InstallStatusResult {
        let repo_path = self.repo_path(repo);
        repo.set_installed_path(repo_path);
        InstallStatusResult::ok()
    }
}
