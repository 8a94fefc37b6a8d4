//! Environment ports
//!
//! Reading configuration from, and exporting results to, the CI environment.

use thiserror::Error;

/// Read-only source of environment variables
pub trait EnvSource {
    /// Get a variable, or `None` when it is not set
    fn get(&self, key: &str) -> Option<String>;
}

/// Errors exporting a variable to downstream steps
#[derive(Debug, Error)]
pub enum ExportError {
    /// The export tool could not be started or fed
    #[error("failed to run export tool for {key}: {source}")]
    Io {
        /// The key being exported
        key: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The export tool ran but reported failure
    #[error("export of {key} failed: {reason}")]
    Rejected {
        /// The key being exported
        key: String,
        /// Exit status or message from the tool
        reason: String,
    },
}

/// Destination for values handed to later build steps
pub trait EnvExporter {
    /// Export a value under a key
    fn export(&mut self, key: &str, value: &str) -> Result<(), ExportError>;
}
