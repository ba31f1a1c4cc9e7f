// hpcb/src/manifest.rs
//! Tests manifest: the list of tests whose installables a command acts on.
//!
//! ```toml
//! [[tests]]
//! name = "nccl_all_reduce"
//!
//! [[tests.installables]]
//! kind = "git_repo"
//! url = "https://github.com/NVIDIA/nccl-tests.git"
//! commit = "c6afef0"
//! ```

use std::path::Path;

use hpcb_common::error::{HpcbError, Result};
use hpcb_common::Test;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    tests: Vec<Test>,
}

pub fn load_tests(path: &Path) -> Result<Vec<Test>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        HpcbError::Config(format!("Failed to read tests manifest {}: {e}", path.display()))
    })?;
    parse_tests(&raw)
        .map_err(|e| HpcbError::Config(format!("Invalid tests manifest {}: {e}", path.display())))
}

fn parse_tests(raw: &str) -> Result<Vec<Test>> {
    let manifest: Manifest = toml::from_str(raw)?;
    Ok(manifest.tests)
}
