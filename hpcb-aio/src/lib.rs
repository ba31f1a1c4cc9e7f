// hpcb-aio/src/lib.rs
//! Blocking IO primitives for hpcb (filesystem, toml, process)

pub mod fs;
pub mod process;
pub mod toml_io;

pub use fs::*;
pub use process::{run_command, CommandOutput};
pub use toml_io::{read_toml, write_toml};
