// hpcb-core/src/install/mod.rs
//! Installation engine: a capability trait implemented once per scheduler,
//! shared orchestration over it, and the facade that picks an implementation.

use std::fmt;

use hpcb_common::error::Result;
use hpcb_common::{InstallStatusResult, Installable, Test};

pub mod artifacts;
pub mod base;
pub mod lsf;
pub mod registry;
pub mod slurm;

pub use lsf::LsfInstaller;
pub use registry::{Installer, InstallerContext, InstallerFactory, InstallerRegistry};
pub use slurm::{InstallerRecord, SlurmInstaller};

/// Per-artifact operations a scheduler installer provides.
///
/// Every method receives the artifact by `&mut` and is the only writer of its
/// location fields while the call runs.
pub trait InstallerBackend {
    fn check_prerequisites(&self) -> InstallStatusResult;
    fn install_one(&self, item: &mut Installable) -> InstallStatusResult;
    fn uninstall_one(&self, item: &mut Installable) -> InstallStatusResult;
    fn is_installed_one(&self, item: &mut Installable) -> InstallStatusResult;
    /// Sets location fields to their expected values without touching disk.
    fn mark_as_installed_one(&self, item: &mut Installable) -> InstallStatusResult;
}

/// Batch operations over the installables of a set of tests.
///
/// The defaults run the shared orchestration in [`base`]; schedulers with
/// extra session state (the Slurm installer record) override them. `Err` is
/// reserved for conditions with no meaningful partial result.
pub trait SchedulerInstaller: InstallerBackend + fmt::Debug {
    fn is_installed(&self, tests: &mut [Test]) -> Result<InstallStatusResult> {
        Ok(base::is_installed(self, tests))
    }

    fn install(&self, tests: &mut [Test]) -> Result<InstallStatusResult> {
        Ok(base::install(self, tests))
    }

    fn uninstall(&self, tests: &mut [Test]) -> Result<InstallStatusResult> {
        Ok(base::uninstall(self, tests))
    }

    fn mark_as_installed(&self, tests: &mut [Test]) -> Result<InstallStatusResult> {
        Ok(base::mark_as_installed(self, tests))
    }
}
