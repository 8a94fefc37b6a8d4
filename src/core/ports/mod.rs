//! Port traits (interfaces) for external dependencies
//!
//! These traits define the boundaries between the pipeline and the
//! systems around it: the process environment, the CI platform's
//! environment store, and subprocesses.
//!
//! Implementations live in the `adapters` module.

mod command;
mod env;

pub use command::{CommandOutput, CommandRunner};
pub use env::{EnvExporter, EnvSource, ExportError};
