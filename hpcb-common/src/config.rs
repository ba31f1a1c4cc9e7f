// hpcb-common/src/config.rs
use std::env;
use std::path::{Path, PathBuf};

use directories::UserDirs;
use tracing::debug;

use super::error::{HpcbError, Result};

/// Name of the durable installer record kept in the user's home directory.
pub const INSTALLER_RECORD_FILENAME: &str = ".hpcb.toml";
const STATE_DIRNAME: &str = ".hpcb";
const HOME_OVERRIDE_ENV: &str = "HPCB_HOME";

/// Per-user runtime paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub home_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        debug!("Loading hpcb configuration");

        let home_dir = match env::var(HOME_OVERRIDE_ENV).ok().filter(|s| !s.is_empty()) {
            Some(home) => {
                debug!("Using home directory from {}: {}", HOME_OVERRIDE_ENV, home);
                PathBuf::from(home)
            }
            None => UserDirs::new()
                .map(|ud| ud.home_dir().to_path_buf())
                .ok_or_else(|| {
                    HpcbError::Config("Could not determine the user's home directory".to_string())
                })?,
        };

        debug!("Effective home directory: {}", home_dir.display());
        Ok(Self { home_dir })
    }

    /// Builds a configuration rooted at an explicit home directory.
    pub fn with_home(home_dir: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: home_dir.into(),
        }
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn installer_record_path(&self) -> PathBuf {
        self.home_dir.join(INSTALLER_RECORD_FILENAME)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.home_dir.join(STATE_DIRNAME)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.state_dir().join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_live_under_home() {
        let config = Config::with_home("/home/bench");
        assert_eq!(
            config.installer_record_path(),
            PathBuf::from("/home/bench/.hpcb.toml")
        );
        assert_eq!(config.logs_dir(), PathBuf::from("/home/bench/.hpcb/logs"));
    }
}
