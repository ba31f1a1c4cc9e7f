/*
File: hpcb-aio/src/fs.rs
Purpose: Primitive synchronous filesystem operations.
*/
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use hpcb_common::error::{HpcbError, Result};
use tempfile::NamedTempFile;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// Checks if a path exists without following symlinks.
pub fn check_symlink_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Creates a directory and all its parent components if they are missing.
pub fn create_dir_all(path: &Path) -> Result<()> {
    debug!("Creating directory recursively: {}", path.display());
    fs::create_dir_all(path).map_err(|e| {
        error!("Failed create dir {}: {}", path.display(), e);
        HpcbError::from(e)
    })
}

/// Removes a file.
pub fn remove_file(path: &Path) -> Result<()> {
    debug!("Removing file: {}", path.display());
    fs::remove_file(path).map_err(|e| {
        if e.kind() != io::ErrorKind::NotFound {
            error!("Failed remove file {}: {}", path.display(), e);
        }
        HpcbError::from(e)
    })
}

/// Removes a directory and all its contents recursively.
pub fn remove_directory_recursive(path: &Path) -> Result<()> {
    debug!("Removing directory recursively: {}", path.display());
    fs::remove_dir_all(path).map_err(|e| {
        if e.kind() != io::ErrorKind::NotFound {
            error!("Failed remove dir_all {}: {}", path.display(), e);
        }
        HpcbError::from(e)
    })
}

/// Removes a file, symlink or directory tree.
///
/// Returns `Ok(false)` when nothing existed at `path`.
pub fn remove_path(path: &Path) -> Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Path not found (already removed?): {}", path.display());
            return Ok(false);
        }
        Err(e) => {
            warn!("Failed to get metadata for {}: {}", path.display(), e);
            return Err(HpcbError::from(e));
        }
    };

    // Symlinks to directories are removed as links, never followed.
    let result = if metadata.file_type().is_dir() {
        remove_directory_recursive(path)
    } else {
        remove_file(path)
    };

    match result {
        Ok(()) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Whether `a` and `b` name the same directory entry.
///
/// Parent directories are resolved but the final component is not, so a
/// symlink and the file it points to are different entries.
pub fn is_same_entry(a: &Path, b: &Path) -> bool {
    fn resolve(path: &Path) -> Option<PathBuf> {
        let name = path.file_name()?;
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::canonicalize(parent).ok().map(|p| p.join(name))
    }
    if a == b {
        return true;
    }
    match (resolve(a), resolve(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Copies `src` to `dest` without dereferencing a symlinked source.
///
/// A symlink is recreated pointing at the same target; a regular file has its
/// contents copied. An existing entry at `dest` is replaced. Copying an entry
/// onto itself is a no-op.
pub fn copy_preserving_symlink(src: &Path, dest: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(src).map_err(|e| {
        error!("Failed to stat copy source {}: {}", src.display(), e);
        HpcbError::from(e)
    })?;

    if is_same_entry(src, dest) {
        debug!("{} is already in place, nothing to copy", src.display());
        return Ok(());
    }

    if check_symlink_exists(dest) {
        remove_path(dest)?;
    }

    if metadata.file_type().is_symlink() {
        let target = fs::read_link(src)?;
        debug!(
            "Copying symlink {} -> {} to {}",
            src.display(),
            target.display(),
            dest.display()
        );
        create_symlink(&target, dest)
    } else {
        debug!("Copying file {} to {}", src.display(), dest.display());
        fs::copy(src, dest).map(|_| ()).map_err(|e| {
            error!(
                "Failed copy {} to {}: {}",
                src.display(),
                dest.display(),
                e
            );
            HpcbError::from(e)
        })
    }
}

/// Creates a symbolic link. Unix only.
#[cfg(unix)]
pub fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    debug!("Creating symlink {} -> {}", link.display(), target.display());
    std::os::unix::fs::symlink(target, link).map_err(|e| {
        error!(
            "Failed create symlink {} -> {}: {}",
            link.display(),
            target.display(),
            e
        );
        HpcbError::from(e)
    })
}

#[cfg(not(unix))]
pub fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    warn!(
        "Symlink creation not supported on this platform: {} -> {}",
        link.display(),
        target.display()
    );
    Err(HpcbError::Generic(
        "Symlinks not supported on this platform".to_string(),
    ))
}

/// Probes whether files can be created inside `dir`.
pub fn is_writable_dir(dir: &Path) -> bool {
    match tempfile::tempfile_in(dir) {
        Ok(_) => true,
        Err(e) => {
            debug!("Directory {} is not writable: {}", dir.display(), e);
            false
        }
    }
}

/// Atomically writes data to a file using a temporary file in the same
/// directory. On failure no truncated file is left at `original_path`.
pub fn atomic_write_file(original_path: &Path, content: &[u8]) -> Result<()> {
    let dir = original_path.parent().ok_or_else(|| {
        HpcbError::IoError(format!(
            "Cannot get parent directory for {}",
            original_path.display()
        ))
    })?;

    create_dir_all(dir)?;

    let mut temp_file = NamedTempFile::new_in(dir)?;
    let temp_path = temp_file.path().to_path_buf();

    debug!(
        "Atomically writing {} bytes to {} via temp file {}",
        content.len(),
        original_path.display(),
        temp_path.display()
    );

    temp_file.write_all(content)?;
    temp_file.flush()?;
    temp_file.as_file().sync_all()?;

    temp_file.persist(original_path).map_err(|e| {
        error!(
            "Failed to persist/rename temporary file {} over {}: {}",
            temp_path.display(),
            original_path.display(),
            e.error
        );
        HpcbError::Io(Arc::new(e.error))
    })?;

    Ok(())
}

/// Counts regular files and their total size below `path`.
pub fn count_files_and_size(path: &Path) -> Result<(usize, u64)> {
    let mut file_count = 0;
    let mut total_size = 0;
    for entry in WalkDir::new(path).follow_links(false) {
        let entry = entry.map_err(|e| HpcbError::IoError(e.to_string()))?;
        if entry.file_type().is_file() {
            file_count += 1;
            total_size += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }
    Ok((file_count, total_size))
}
