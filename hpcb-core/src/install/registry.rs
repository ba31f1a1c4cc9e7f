// hpcb-core/src/install/registry.rs
//! Scheduler-kind to installer lookup and the facade callers use.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use hpcb_common::config::Config;
use hpcb_common::error::{HpcbError, Result};
use hpcb_common::{InstallStatusResult, SchedulerKind, System, Test};
use tracing::{debug, info};

use super::{LsfInstaller, SchedulerInstaller, SlurmInstaller};
use crate::runner::{CommandRunner, SystemRunner};

/// Everything an installer needs besides the system descriptor.
#[derive(Debug, Clone)]
pub struct InstallerContext {
    pub config: Config,
    pub runner: Arc<dyn CommandRunner>,
}

impl InstallerContext {
    pub fn new(config: Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// Context that runs real processes.
    pub fn system(config: Config) -> Self {
        Self::new(config, Arc::new(SystemRunner))
    }
}

pub type InstallerFactory = fn(&System, &InstallerContext) -> Box<dyn SchedulerInstaller>;

fn slurm_factory(system: &System, ctx: &InstallerContext) -> Box<dyn SchedulerInstaller> {
    Box::new(SlurmInstaller::new(system, &ctx.config, ctx.runner.clone()))
}

fn lsf_factory(system: &System, ctx: &InstallerContext) -> Box<dyn SchedulerInstaller> {
    Box::new(LsfInstaller::new(system, ctx.runner.clone()))
}

#[derive(Clone, Default)]
pub struct InstallerRegistry {
    factories: HashMap<SchedulerKind, InstallerFactory>,
}

impl InstallerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the Slurm and LSF installers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(SchedulerKind::Slurm, slurm_factory);
        registry.register(SchedulerKind::Lsf, lsf_factory);
        registry
    }

    /// Adds or replaces the factory for `kind`.
    pub fn register(&mut self, kind: SchedulerKind, factory: InstallerFactory) {
        if self.factories.insert(kind, factory).is_some() {
            debug!("Replaced installer factory for {}", kind);
        }
    }

    pub fn get(&self, kind: SchedulerKind) -> Option<InstallerFactory> {
        self.factories.get(&kind).copied()
    }

    /// Registered scheduler kinds, sorted by name.
    pub fn schedulers(&self) -> Vec<SchedulerKind> {
        let mut kinds: Vec<SchedulerKind> = self.factories.keys().copied().collect();
        kinds.sort_by_key(|k| k.to_string());
        kinds
    }

    pub fn create(&self, system: &System, ctx: &InstallerContext) -> Option<Box<dyn SchedulerInstaller>> {
        self.get(system.scheduler).map(|factory| factory(system, ctx))
    }
}

impl fmt::Debug for InstallerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallerRegistry")
            .field("schedulers", &self.schedulers())
            .finish()
    }
}

/// Resolves the installer for a system once and delegates to it.
#[derive(Debug)]
pub struct Installer {
    scheduler: SchedulerKind,
    installer: Box<dyn SchedulerInstaller>,
}

impl Installer {
    /// Fails with [`HpcbError::NotImplemented`] when no installer is
    /// registered for the system's scheduler.
    pub fn new(system: &System, registry: &InstallerRegistry, ctx: &InstallerContext) -> Result<Self> {
        let installer = registry.create(system, ctx).ok_or_else(|| {
            HpcbError::NotImplemented(format!(
                "No installer available for scheduler: {}",
                system.scheduler
            ))
        })?;
        debug!("Using {} installer for system '{}'", system.scheduler, system.name);
        Ok(Self {
            scheduler: system.scheduler,
            installer,
        })
    }

    pub fn scheduler(&self) -> SchedulerKind {
        self.scheduler
    }

    pub fn is_installed(&self, tests: &mut [Test]) -> Result<InstallStatusResult> {
        info!("Checking installation status of {} tests.", tests.len());
        self.installer.is_installed(tests)
    }

    pub fn install(&self, tests: &mut [Test]) -> Result<InstallStatusResult> {
        info!("Installing {} tests.", tests.len());
        self.installer.install(tests)
    }

    pub fn uninstall(&self, tests: &mut [Test]) -> Result<InstallStatusResult> {
        info!("Uninstalling {} tests.", tests.len());
        self.installer.uninstall(tests)
    }

    pub fn mark_as_installed(&self, tests: &mut [Test]) -> Result<InstallStatusResult> {
        info!("Marking {} tests as installed.", tests.len());
        self.installer.mark_as_installed(tests)
    }
}
