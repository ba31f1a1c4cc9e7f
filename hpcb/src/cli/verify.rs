// hpcb/src/cli/verify.rs
use clap::Args;
use colored::Colorize;
use hpcb_common::config::Config;
use hpcb_common::error::Result;

use crate::cli::{into_result, SessionArgs};

#[derive(Debug, Args)]
pub struct Verify {
    #[command(flatten)]
    pub session: SessionArgs,
}

impl Verify {
    pub fn run(&self, config: &Config) -> Result<()> {
        let mut session = self.session.open(config)?;
        let status = into_result(session.installer.is_installed(&mut session.tests)?)?;
        println!(
            "{} {} ({})",
            "✓".green(),
            status.message(),
            session.system.name.cyan()
        );
        Ok(())
    }
}
