// hpcb/src/cli/adopt.rs
use clap::Args;
use colored::Colorize;
use hpcb_common::config::Config;
use hpcb_common::error::Result;
use hpcb_common::Installable;

use crate::cli::{into_result, SessionArgs};

#[derive(Debug, Args)]
pub struct Adopt {
    #[command(flatten)]
    pub session: SessionArgs,
}

impl Adopt {
    pub fn run(&self, config: &Config) -> Result<()> {
        let mut session = self.session.open(config)?;
        let status = into_result(session.installer.mark_as_installed(&mut session.tests)?)?;

        for test in &session.tests {
            println!("{}", test.name.bold());
            for item in test.installables() {
                println!("  {} -> {}", item, location(item));
            }
        }
        println!("{} {}", "✓".green(), status.message());
        Ok(())
    }
}

fn location(item: &Installable) -> String {
    let path = match item {
        Installable::DockerImage(_) => return "(pulled at submission)".to_string(),
        Installable::GitRepo(repo) => repo.installed_path(),
        Installable::File(file) => file.installed_path(),
        Installable::PythonExecutable(py) => py.venv_path(),
    };
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(unresolved)".to_string())
}
