//! Exporting step outputs
//!
//! On the CI platform values are handed to later steps with
//! `envman add --key KEY`, which reads the value from stdin.

use std::io::Write;
use std::process::{Command, Stdio};

use log::debug;

use crate::core::ports::{EnvExporter, ExportError};

/// Exports through the `envman` tool
#[derive(Debug, Clone)]
pub struct Envman {
    program: String,
}

impl Default for Envman {
    fn default() -> Self {
        Self {
            program: "envman".to_string(),
        }
    }
}

impl Envman {
    /// Use a specific `envman` executable
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl EnvExporter for Envman {
    fn export(&mut self, key: &str, value: &str) -> Result<(), ExportError> {
        let io_err = |source| ExportError::Io {
            key: key.to_string(),
            source,
        };

        debug!("{} add --key {key}", self.program);
        let mut child = Command::new(&self.program)
            .args(["add", "--key", key])
            .stdin(Stdio::piped())
            .spawn()
            .map_err(io_err)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(value.as_bytes()).map_err(io_err)?;
        }

        let status = child.wait().map_err(io_err)?;
        if status.success() {
            Ok(())
        } else {
            Err(ExportError::Rejected {
                key: key.to_string(),
                reason: status.to_string(),
            })
        }
    }
}

/// Prints `KEY=VALUE` lines instead of exporting
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutExporter;

impl EnvExporter for StdoutExporter {
    fn export(&mut self, key: &str, value: &str) -> Result<(), ExportError> {
        println!("{key}={value}");
        Ok(())
    }
}
