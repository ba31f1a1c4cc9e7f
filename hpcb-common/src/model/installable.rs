// hpcb-common/src/model/installable.rs
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// An artifact a benchmark needs before it can be submitted to a scheduler.
///
/// Location fields (`installed_path`, `venv_path`) are set only while the
/// artifact is verified present on disk. An installer holds the artifact by
/// `&mut` for the duration of a call and is the only writer of those fields;
/// command generation reads them afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Installable {
    /// A container image, materialized by the scheduler at submission time.
    DockerImage(DockerImage),
    /// A git repository pinned to a commit.
    GitRepo(GitRepo),
    /// A file copied into the install root.
    File(FileArtifact),
    /// A virtual environment built from a git source.
    PythonExecutable(PythonExecutable),
}

/// Identity of an installable; two artifacts with equal keys are the same
/// dependency regardless of which test declared them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InstallableKey {
    DockerImage(String),
    GitRepo { url: String, commit: String },
    File(PathBuf),
    PythonExecutable {
        url: String,
        commit: String,
        venv_name: String,
    },
}

impl Installable {
    pub fn key(&self) -> InstallableKey {
        match self {
            Installable::DockerImage(image) => InstallableKey::DockerImage(image.url.clone()),
            Installable::GitRepo(repo) => InstallableKey::GitRepo {
                url: repo.url.clone(),
                commit: repo.commit.clone(),
            },
            Installable::File(file) => InstallableKey::File(file.src.clone()),
            Installable::PythonExecutable(py) => InstallableKey::PythonExecutable {
                url: py.git_repo.url.clone(),
                commit: py.git_repo.commit.clone(),
                venv_name: py.venv_name(),
            },
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Installable::DockerImage(_) => "docker_image",
            Installable::GitRepo(_) => "git_repo",
            Installable::File(_) => "file",
            Installable::PythonExecutable(_) => "python_executable",
        }
    }

    /// Copies the location fields of `resolved` onto `self` when both describe
    /// the same dependency. Returns whether anything was copied.
    pub fn adopt_locations(&mut self, resolved: &Installable) -> bool {
        if self.key() != resolved.key() {
            return false;
        }
        match (self, resolved) {
            (Installable::GitRepo(mine), Installable::GitRepo(theirs)) => {
                mine.installed_path = theirs.installed_path.clone();
            }
            (Installable::File(mine), Installable::File(theirs)) => {
                mine.installed_path = theirs.installed_path.clone();
            }
            (Installable::PythonExecutable(mine), Installable::PythonExecutable(theirs)) => {
                mine.git_repo.installed_path = theirs.git_repo.installed_path.clone();
                mine.venv_path = theirs.venv_path.clone();
            }
            _ => {}
        }
        true
    }
}

impl fmt::Display for Installable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Installable::DockerImage(image) => write!(f, "DockerImage(url={})", image.url),
            Installable::GitRepo(repo) => {
                write!(f, "GitRepo(url={}, commit={})", repo.url, repo.commit)
            }
            Installable::File(file) => write!(f, "File(src={})", file.src.display()),
            Installable::PythonExecutable(py) => write!(
                f,
                "PythonExecutable(url={}, commit={}, venv={})",
                py.git_repo.url,
                py.git_repo.commit,
                py.venv_name()
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DockerImage {
    pub url: String,
}

impl DockerImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitRepo {
    pub url: String,
    pub commit: String,
    #[serde(skip)]
    installed_path: Option<PathBuf>,
}

impl GitRepo {
    pub fn new(url: impl Into<String>, commit: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            commit: commit.into(),
            installed_path: None,
        }
    }

    /// Directory name derived from the URL: last path segment without `.git`.
    pub fn repo_name(&self) -> String {
        let trimmed = self.url.trim_end_matches('/');
        let last = trimmed
            .rsplit(['/', ':'])
            .next()
            .unwrap_or(trimmed);
        last.strip_suffix(".git").unwrap_or(last).to_string()
    }

    pub fn installed_path(&self) -> Option<&Path> {
        self.installed_path.as_deref()
    }

    pub fn set_installed_path(&mut self, path: PathBuf) {
        self.installed_path = Some(path);
    }

    pub fn clear_installed_path(&mut self) {
        self.installed_path = None;
    }
}

/// A file copied into the install root. Symlinks are copied as links.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileArtifact {
    pub src: PathBuf,
    #[serde(skip)]
    installed_path: Option<PathBuf>,
}

impl FileArtifact {
    pub fn new(src: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            installed_path: None,
        }
    }

    /// Name the file takes inside the install root.
    pub fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.src.file_name()
    }

    pub fn installed_path(&self) -> Option<&Path> {
        self.installed_path.as_deref()
    }

    pub fn set_installed_path(&mut self, path: PathBuf) {
        self.installed_path = Some(path);
    }

    pub fn clear_installed_path(&mut self) {
        self.installed_path = None;
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PythonExecutable {
    pub git_repo: GitRepo,
    /// Explicit venv directory name; defaults to `<repo_name>-venv`.
    #[serde(default)]
    pub venv_name: Option<String>,
    /// Location of the Python project inside the repository.
    #[serde(default)]
    pub project_subpath: Option<PathBuf>,
    /// Prefer `pyproject.toml` over `requirements.txt` when both exist.
    #[serde(default = "default_true")]
    pub dependencies_from_pyproject: bool,
    #[serde(skip)]
    venv_path: Option<PathBuf>,
}

impl PythonExecutable {
    pub fn new(git_repo: GitRepo) -> Self {
        Self {
            git_repo,
            venv_name: None,
            project_subpath: None,
            dependencies_from_pyproject: true,
            venv_path: None,
        }
    }

    pub fn with_project_subpath(mut self, subpath: impl Into<PathBuf>) -> Self {
        self.project_subpath = Some(subpath.into());
        self
    }

    pub fn with_dependencies_from_pyproject(mut self, prefer: bool) -> Self {
        self.dependencies_from_pyproject = prefer;
        self
    }

    pub fn venv_name(&self) -> String {
        self.venv_name
            .clone()
            .unwrap_or_else(|| format!("{}-venv", self.git_repo.repo_name()))
    }

    pub fn venv_path(&self) -> Option<&Path> {
        self.venv_path.as_deref()
    }

    pub fn set_venv_path(&mut self, path: PathBuf) {
        self.venv_path = Some(path);
    }

    pub fn clear_venv_path(&mut self) {
        self.venv_path = None;
    }

    /// Interpreter inside the venv, once the venv is installed.
    pub fn python_path(&self) -> Option<PathBuf> {
        self.venv_path.as_ref().map(|v| v.join("bin").join("python"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_name_strips_git_suffix() {
        assert_eq!(GitRepo::new("https://example/repo.git", "abc123").repo_name(), "repo");
        assert_eq!(GitRepo::new("git@github.com:org/tool", "abc").repo_name(), "tool");
        assert_eq!(GitRepo::new("https://example/nested/bench/", "abc").repo_name(), "bench");
    }

    #[test]
    fn default_venv_name_follows_repo() {
        let py = PythonExecutable::new(GitRepo::new("https://example/nemo-run.git", "c0ffee"));
        assert_eq!(py.venv_name(), "nemo-run-venv");
        assert!(py.dependencies_from_pyproject);
        assert!(py.python_path().is_none());
    }

    #[test]
    fn keys_ignore_location_fields() {
        let mut installed = GitRepo::new("https://example/repo.git", "abc123");
        installed.set_installed_path(PathBuf::from("/tmp/x/repo"));
        let a = Installable::GitRepo(installed);
        let b = Installable::GitRepo(GitRepo::new("https://example/repo.git", "abc123"));
        let c = Installable::GitRepo(GitRepo::new("https://example/repo.git", "def456"));
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn adopt_locations_copies_resolved_paths() {
        let mut resolved = PythonExecutable::new(GitRepo::new("https://example/py.git", "1"));
        resolved.git_repo.set_installed_path(PathBuf::from("/r/py"));
        resolved.set_venv_path(PathBuf::from("/r/py-venv"));
        let resolved = Installable::PythonExecutable(resolved);

        let mut dup = Installable::PythonExecutable(PythonExecutable::new(GitRepo::new(
            "https://example/py.git",
            "1",
        )));
        assert!(dup.adopt_locations(&resolved));
        let Installable::PythonExecutable(py) = &dup else {
            panic!("variant changed");
        };
        assert_eq!(py.venv_path(), Some(Path::new("/r/py-venv")));
        assert_eq!(py.git_repo.installed_path(), Some(Path::new("/r/py")));

        let mut other = Installable::DockerImage(DockerImage::new("nvcr.io/nvidia/pytorch:24.02"));
        assert!(!other.adopt_locations(&resolved));
    }

    #[test]
    fn deserializes_tagged_variants() {
        #[derive(Deserialize)]
        struct Doc {
            items: Vec<Installable>,
        }
        let doc: Doc = toml::from_str(
            r#"
            [[items]]
            kind = "docker_image"
            url = "nvcr.io/nvidia/jax:24.04"

            [[items]]
            kind = "python_executable"
            project_subpath = "tools"
            dependencies_from_pyproject = false
            git_repo = { url = "https://example/bench.git", commit = "abc" }
            "#,
        )
        .unwrap();
        assert_eq!(doc.items.len(), 2);
        assert_eq!(doc.items[1].kind_name(), "python_executable");
        let Installable::PythonExecutable(py) = &doc.items[1] else {
            panic!("expected python executable");
        };
        assert!(!py.dependencies_from_pyproject);
        assert_eq!(py.project_subpath.as_deref(), Some(Path::new("tools")));
    }
}
