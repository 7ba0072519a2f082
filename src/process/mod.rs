pub mod executor;
pub mod git;
pub mod signal;

pub use executor::{split_output, ShellExecutor};

use crate::core::ShellKind;

/// Result of running one command line. `output` is what the user and the
/// model get to see: stderr when there was any, stdout otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub output: String,
    pub is_error: bool,
}

pub trait CommandRunner {
    fn execute(&mut self, shell: ShellKind, command_line: &str) -> Execution;
}
