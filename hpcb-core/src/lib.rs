// hpcb-core/src/lib.rs
//! Installation engine for benchmark dependencies on HPC clusters.

pub mod check;
pub mod install;
pub mod runner;

#[cfg(test)]
mod test_utils;

pub use install::{
    Installer, InstallerBackend, InstallerContext, InstallerFactory, InstallerRecord,
    InstallerRegistry, LsfInstaller, SchedulerInstaller, SlurmInstaller,
};
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
