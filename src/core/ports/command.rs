//! Subprocess port
//!
//! Defines how the build tool is invoked.

use std::io;
use std::path::Path;

/// Result of a finished subprocess
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited successfully
    pub success: bool,
    /// Exit code, if the process exited normally
    pub code: Option<i32>,
    /// Combined stdout and stderr
    pub output: String,
}

/// Runs external programs
///
/// Implementations stream the child's output to the console while it runs
/// and return the captured text for inspection.
pub trait CommandRunner {
    /// Run a program to completion
    fn run(&self, program: &Path, args: &[String]) -> io::Result<CommandOutput>;
}
