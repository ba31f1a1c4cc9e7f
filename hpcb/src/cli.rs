// hpcb/src/cli.rs
//! Command-line argument structure.
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use hpcb_common::config::Config;
use hpcb_common::error::{HpcbError, Result};
use hpcb_common::{InstallStatusResult, System, Test};
use hpcb_core::{Installer, InstallerContext, InstallerRegistry};
use tracing::debug;

pub mod adopt;
pub mod install;
pub mod uninstall;
pub mod verify;

use crate::cli::adopt::Adopt;
use crate::cli::install::Install;
use crate::cli::uninstall::Uninstall;
use crate::cli::verify::Verify;
use crate::manifest;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "hpcb", bin_name = "hpcb")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install everything the tests need on the system
    Install(Install),
    /// Remove installed artifacts and the install root
    Uninstall(Uninstall),
    /// Report whether everything the tests need is installed
    Verify(Verify),
    /// Record pre-staged artifacts as installed without touching disk
    Adopt(Adopt),
}

impl Command {
    pub fn run(&self, config: &Config) -> Result<()> {
        match self {
            Self::Install(command) => command.run(config),
            Self::Uninstall(command) => command.run(config),
            Self::Verify(command) => command.run(config),
            Self::Adopt(command) => command.run(config),
        }
    }
}

/// Input files shared by every subcommand.
#[derive(Args, Debug)]
pub struct SessionArgs {
    /// System description (TOML with name, scheduler and install_path)
    #[arg(long, value_name = "FILE")]
    pub system: PathBuf,

    /// Tests manifest (TOML with [[tests]] tables)
    #[arg(long, value_name = "FILE")]
    pub tests: PathBuf,
}

/// A resolved installer plus the tests it operates on.
pub struct Session {
    pub system: System,
    pub installer: Installer,
    pub tests: Vec<Test>,
}

impl SessionArgs {
    pub fn open(&self, config: &Config) -> Result<Session> {
        let system = System::load(&self.system)?;
        let tests = manifest::load_tests(&self.tests)?;
        debug!(
            "Loaded system '{}' ({}) and {} tests",
            system.name,
            system.scheduler,
            tests.len()
        );
        let ctx = InstallerContext::system(config.clone());
        let installer = Installer::new(&system, &InstallerRegistry::with_defaults(), &ctx)?;
        Ok(Session {
            system,
            installer,
            tests,
        })
    }
}

/// Turns a failed status into an error carrying its message.
pub fn into_result(status: InstallStatusResult) -> Result<InstallStatusResult> {
    if status.is_success() {
        Ok(status)
    } else {
        Err(HpcbError::InstallError(status.message().to_string()))
    }
}
