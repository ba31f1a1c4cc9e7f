// hpcb-common/src/lib.rs
pub mod config;
pub mod error;
pub mod model;
pub mod status;
pub mod system;

// Re-export key types
pub use config::Config;
pub use error::{HpcbError, Result};
pub use model::{
    DockerImage, FileArtifact, GitRepo, Installable, InstallableKey, PythonExecutable, Test,
    TestDefinition,
};
pub use status::InstallStatusResult;
pub use system::{SchedulerKind, System};
