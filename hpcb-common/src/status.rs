// hpcb-common/src/status.rs
use std::fmt;

/// Outcome of an installer operation.
///
/// A failed result always carries a message. Successful results may carry an
/// informational one, e.g. when an artifact was already present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallStatusResult {
    success: bool,
    message: Option<String>,
}

impl InstallStatusResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn ok_with(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The message, or an empty string when none was attached.
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    pub fn has_message(&self) -> bool {
        self.message.is_some()
    }
}

impl fmt::Display for InstallStatusResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.success { "success" } else { "failure" };
        match &self.message {
            Some(msg) => write!(f, "{label}: {msg}"),
            None => write!(f, "{label}"),
        }
    }
}
