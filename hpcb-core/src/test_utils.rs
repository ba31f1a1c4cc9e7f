// hpcb-core/src/test_utils.rs
//! Fakes shared by the installer tests.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use hpcb_common::error::Result;

use crate::runner::{CommandOutput, CommandRunner};

/// Help text advertising every option the Slurm installer requires.
pub const SRUN_HELP: &str = "Usage: srun [OPTIONS...] executable [args...]\n\
      --container-image=image\n\
      --container-mounts=mounts\n\
      --gpus-per-node=n\n\
      --mpi=type\n\
      --ntasks-per-node=n\n";

#[derive(Debug)]
struct Scripted {
    prefix: String,
    output: CommandOutput,
    side_effects: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Records every invocation and simulates the side effects of `git clone`
/// and `python3 -m venv`. Scripted responses take precedence; only those
/// added with [`FakeRunner::respond_after_effects`] keep the side effects.
#[derive(Debug, Default)]
pub struct FakeRunner {
    binaries: HashSet<String>,
    all_binaries: bool,
    scripted: Mutex<Vec<Scripted>>,
    calls: Mutex<Vec<Invocation>>,
}

impl FakeRunner {
    pub fn with_binaries(binaries: &[&str]) -> Self {
        Self {
            binaries: binaries.iter().map(|b| b.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_all_binaries() -> Self {
        Self {
            all_binaries: true,
            ..Self::default()
        }
    }

    /// Answers the next command line starting with `prefix` with `output`.
    pub fn respond(&self, prefix: &str, output: CommandOutput) {
        self.script(prefix, output, false);
    }

    /// Like [`FakeRunner::respond`], but the simulated side effects still
    /// happen, e.g. a venv directory left behind by a failed `venv` call.
    pub fn respond_after_effects(&self, prefix: &str, output: CommandOutput) {
        self.script(prefix, output, true);
    }

    fn script(&self, prefix: &str, output: CommandOutput, side_effects: bool) {
        self.scripted.lock().unwrap().push(Scripted {
            prefix: prefix.to_string(),
            output,
            side_effects,
        });
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.command_line().starts_with(prefix))
            .count()
    }

    fn simulate(&self, invocation: &Invocation) -> CommandOutput {
        let args: Vec<&str> = invocation.args.iter().map(String::as_str).collect();
        match (invocation.program.as_str(), args.as_slice()) {
            ("git", ["clone", _, dest]) => {
                fs::create_dir_all(dest).unwrap();
                CommandOutput::succeeded("")
            }
            ("python3", ["-m", "venv", dest]) => {
                fs::create_dir_all(Path::new(dest).join("bin")).unwrap();
                CommandOutput::succeeded("")
            }
            ("srun", ["--help"]) => CommandOutput::succeeded(SRUN_HELP),
            _ => CommandOutput::succeeded(""),
        }
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> Result<CommandOutput> {
        let invocation = Invocation {
            program: program.to_string(),
            args: args.to_vec(),
            cwd: cwd.map(Path::to_path_buf),
        };
        self.calls.lock().unwrap().push(invocation.clone());

        let line = invocation.command_line();
        let scripted = {
            let mut scripted = self.scripted.lock().unwrap();
            scripted
                .iter()
                .position(|entry| line.starts_with(entry.prefix.as_str()))
                .map(|idx| scripted.remove(idx))
        };
        Ok(match scripted {
            Some(entry) => {
                if entry.side_effects {
                    self.simulate(&invocation);
                }
                entry.output
            }
            None => self.simulate(&invocation),
        })
    }

    fn find_binary(&self, name: &str) -> Option<PathBuf> {
        (self.all_binaries || self.binaries.contains(name))
            .then(|| PathBuf::from("/usr/bin").join(name))
    }
}
