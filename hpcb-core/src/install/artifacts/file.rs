// hpcb-core/src/install/artifacts/file.rs
use std::path::PathBuf;

use hpcb_aio::fs as hpcb_fs;
use hpcb_common::{FileArtifact, InstallStatusResult};
use tracing::debug;

use super::Workspace;

impl Workspace<'_> {
    pub fn file_dest(&self, file: &FileArtifact) -> Option<PathBuf> {
        file.file_name().map(|name| self.root.join(name))
    }

    /// Copies the source into the install root, keeping symlinks as links.
    pub fn install_file(&self, file: &mut FileArtifact) -> InstallStatusResult {
        let Some(dest) = self.file_dest(file) else {
            return no_file_name(file);
        };
        match hpcb_fs::copy_preserving_symlink(&file.src, &dest) {
            Ok(()) => {
                file.set_installed_path(dest);
                InstallStatusResult::ok()
            }
            Err(e) => InstallStatusResult::failed(format!(
                "Failed to copy {} to {}: {e}",
                file.src.display(),
                dest.display()
            )),
        }
    }

    pub fn uninstall_file(&self, file: &mut FileArtifact) -> InstallStatusResult {
        let dest = match file.installed_path() {
            Some(path) => path.to_path_buf(),
            None => match self.file_dest(file) {
                Some(dest) => dest,
                None => return no_file_name(file),
            },
        };

        if hpcb_fs::is_same_entry(&dest, &file.src) {
            file.clear_installed_path();
            return InstallStatusResult::ok_with(format!(
                "File {} is its own source and was left in place.",
                dest.display()
            ));
        }

        match hpcb_fs::remove_path(&dest) {
            Ok(true) => {
                file.clear_installed_path();
                InstallStatusResult::ok()
            }
            Ok(false) => {
                debug!("File {} does not exist.", dest.display());
                file.clear_installed_path();
                InstallStatusResult::ok_with(format!("File {} does not exist.", dest.display()))
            }
            Err(e) => InstallStatusResult::failed(format!(
                "Failed to remove file {}: {e}",
                dest.display()
            )),
        }
    }

    pub fn is_file_installed(&self, file: &mut FileArtifact) -> InstallStatusResult {
        let Some(dest) = self.file_dest(file) else {
            return no_file_name(file);
        };
        if hpcb_fs::check_symlink_exists(&dest) {
            file.set_installed_path(dest);
            InstallStatusResult::ok()
        } else {
            file.clear_installed_path();
            InstallStatusResult::failed(format!("File {} does not exist", dest.display()))
        }
    }

    pub fn mark_file_installed(&self, file: &mut FileArtifact) -> InstallStatusResult {
        let Some(dest) = self.file_dest(file) else {
            return no_file_name(file);
        };
        file.set_installed_path(dest);
        InstallStatusResult::ok()
    }
}

fn no_file_name(file: &FileArtifact) -> InstallStatusResult {
    InstallStatusResult::failed(format!(
        "File source {} has no file name",
        file.src.display()
    ))
}
