pub mod prerequisites;

pub use prerequisites::{check_binaries, check_help_flags, BASE_PREREQUISITES};
