// hpcb-aio/src/toml_io.rs
use std::path::Path;

use hpcb_common::error::{HpcbError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Serializes `data` to TOML and writes it atomically.
pub fn write_toml<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    debug!("Writing TOML to: {}", path.display());
    let rendered = toml::to_string(data).map_err(HpcbError::from)?;
    crate::fs::atomic_write_file(path, rendered.as_bytes())
}

/// Reads and deserializes a TOML file.
pub fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!("Reading TOML from: {}", path.display());
    let raw = std::fs::read_to_string(path)?;
    toml::from_str(&raw).map_err(HpcbError::from)
}
