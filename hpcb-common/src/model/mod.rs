// hpcb-common/src/model/mod.rs
pub mod installable;

// Re-export
pub use installable::{
    DockerImage, FileArtifact, GitRepo, Installable, InstallableKey, PythonExecutable,
};
pub use test::{Test, TestDefinition};
