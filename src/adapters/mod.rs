//! Adapter implementations for port traits
//!
//! This module contains concrete implementations that handle I/O:
//!
//! - `env` - Process environment and in-memory variable sources
//! - `envman` - Exporting values with `envman` or to stdout
//! - `process` - Running the build tool as a subprocess

pub mod env;
pub mod envman;
pub mod process;

pub use env::{MapEnv, ProcessEnv};
pub use envman::{Envman, StdoutExporter};
pub use process::ProcessRunner;
