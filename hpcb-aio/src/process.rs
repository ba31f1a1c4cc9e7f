// hpcb-aio/src/process.rs
use std::path::Path;
use std::process::{Command, Stdio};

use hpcb_common::error::{HpcbError, Result};
use tracing::{debug, error};

/// Exit status and captured streams of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn succeeded(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs an external command to completion and captures its output.
///
/// Blocks the calling thread; there is no timeout.
pub fn run_command(program: &str, args: &[String], cwd: Option<&Path>) -> Result<CommandOutput> {
    debug!("Running command: {} {:?} (cwd: {:?})", program, args, cwd);
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.stdin(Stdio::null());

    let output = cmd.output().map_err(|e| {
        error!("Failed to execute command {}: {}", program, e);
        HpcbError::CommandExecError(format!("{program}: {e}"))
    })?;

    let result = CommandOutput {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    if !result.success {
        debug!("Command failed with status: {}", output.status);
        if !result.stdout.trim().is_empty() {
            debug!("Stdout:\n{}", result.stdout.trim());
        }
        if !result.stderr.trim().is_empty() {
            debug!("Stderr:\n{}", result.stderr.trim());
        }
    } else {
        debug!("Command finished successfully.");
    }
    Ok(result)
}
