// hpcb-core/src/check/prerequisites.rs
use hpcb_common::InstallStatusResult;
use tracing::debug;

use crate::runner::{arg, CommandRunner};

/// Binaries every installer needs regardless of scheduler.
pub const BASE_PREREQUISITES: &[&str] = &["git"];

/// Verifies every binary in `binaries` can be found, naming all that are missing.
pub fn check_binaries(runner: &dyn CommandRunner, binaries: &[&str]) -> InstallStatusResult {
    let missing: Vec<&str> = binaries
        .iter()
        .copied()
        .filter(|name| {
            let found = runner.has_binary(name);
            debug!("Prerequisite binary '{}': {}", name, if found { "found" } else { "missing" });
            !found
        })
        .collect();

    match missing.as_slice() {
        [] => InstallStatusResult::ok(),
        [single] => InstallStatusResult::failed(format!("Required binary '{single}' is not installed.")),
        many => InstallStatusResult::failed(format!(
            "Required binaries are not installed: {}",
            many.join(", ")
        )),
    }
}

/// Runs `<program> --help` and verifies every flag in `flags` is advertised.
pub fn check_help_flags(
    runner: &dyn CommandRunner,
    program: &str,
    flags: &[&str],
) -> InstallStatusResult {
    let output = match runner.run(program, &[arg("--help")], None) {
        Ok(output) if output.success => output,
        Ok(output) => {
            return InstallStatusResult::failed(format!(
                "Failed to execute '{program} --help': {}",
                output.stderr.trim()
            ))
        }
        Err(e) => {
            return InstallStatusResult::failed(format!("Failed to execute '{program} --help': {e}"))
        }
    };

    let missing: Vec<&str> = flags
        .iter()
        .copied()
        .filter(|flag| !output.stdout.contains(flag))
        .collect();

    if missing.is_empty() {
        InstallStatusResult::ok()
    } else {
        InstallStatusResult::failed(format!(
            "Required {program} options missing: {}",
            missing.join(", ")
        ))
    }
}
