use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum HpcbError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("TOML Parsing Error: {0}")]
    TomlDe(#[from] Arc<toml::de::Error>),

    #[error("TOML Serialization Error: {0}")]
    TomlSer(#[from] Arc<toml::ser::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Not Implemented: {0}")]
    NotImplemented(String),

    #[error("Resource Not Found: {0}")]
    NotFound(String),

    #[error("Installation Error: {0}")]
    InstallError(String),

    #[error("Failed to execute command: {0}")]
    CommandExecError(String),

    #[error("IoError: {0}")]
    IoError(String),

    #[error("Generic Error: {0}")]
    Generic(String),
}

impl From<std::io::Error> for HpcbError {
    fn from(err: std::io::Error) -> Self {
        HpcbError::Io(Arc::new(err))
    }
}

impl From<toml::de::Error> for HpcbError {
    fn from(err: toml::de::Error) -> Self {
        HpcbError::TomlDe(Arc::new(err))
    }
}

impl From<toml::ser::Error> for HpcbError {
    fn from(err: toml::ser::Error) -> Self {
        HpcbError::TomlSer(Arc::new(err))
    }
}

impl HpcbError {
    /// True when the underlying cause is a missing file or directory.
    pub fn is_not_found(&self) -> bool {
        match self {
            HpcbError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            HpcbError::NotFound(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, HpcbError>;
