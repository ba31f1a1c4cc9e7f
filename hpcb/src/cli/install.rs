// hpcb/src/cli/install.rs
use clap::Args;
use colored::Colorize;
use hpcb_common::config::Config;
use hpcb_common::error::Result;
use tracing::{info, instrument};

use crate::cli::{into_result, SessionArgs};

#[derive(Debug, Args)]
pub struct Install {
    #[command(flatten)]
    pub session: SessionArgs,
}

impl Install {
    #[instrument(skip(self, config), fields(system = %self.session.system.display()))]
    pub fn run(&self, config: &Config) -> Result<()> {
        let mut session = self.session.open(config)?;

        let status = session.installer.is_installed(&mut session.tests)?;
        if status.is_success() {
            info!("Already installed: {}", status.message());
            println!(
                "{} Everything is already installed for {}.",
                "✓".green(),
                session.system.name.cyan()
            );
            return Ok(());
        }
        info!("Not yet installed: {}", status.message());

        println!(
            "Installing {} tests on {}...",
            session.tests.len(),
            session.system.name.cyan()
        );
        let status = into_result(session.installer.install(&mut session.tests)?)?;
        println!("{} {}", "✓".green(), status.message());
        Ok(())
    }
}
