// hpcb/src/cli/uninstall.rs
use std::path::Path;

use clap::Args;
use colored::Colorize;
use hpcb_aio::fs::count_files_and_size;
use hpcb_common::config::Config;
use hpcb_common::error::Result;
use tracing::warn;

use crate::cli::{into_result, SessionArgs};

#[derive(Debug, Args)]
pub struct Uninstall {
    #[command(flatten)]
    pub session: SessionArgs,
}

impl Uninstall {
    pub fn run(&self, config: &Config) -> Result<()> {
        let mut session = self.session.open(config)?;

        let footprint = session.system.install_root().and_then(footprint);
        println!("Uninstalling from {}...", session.system.name.cyan());

        let status = into_result(session.installer.uninstall(&mut session.tests)?)?;
        match footprint {
            Some((root, file_count, size_bytes)) => println!(
                "{} {} ({} files, {} under {})",
                "✓".green(),
                status.message(),
                file_count,
                format_size(size_bytes),
                root
            ),
            None => println!("{} {}", "✓".green(), status.message()),
        }
        Ok(())
    }
}

fn footprint(root: &Path) -> Option<(String, usize, u64)> {
    if !root.exists() {
        return None;
    }
    match count_files_and_size(root) {
        Ok((count, size)) => Some((root.display().to_string(), count, size)),
        Err(e) => {
            warn!("Could not measure {}: {}", root.display(), e);
            None
        }
    }
}

fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    if size >= GB {
        format!("{:.1}GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.1}MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.1}KB", size as f64 / KB as f64)
    } else {
        format!("{size}B")
    }
}
