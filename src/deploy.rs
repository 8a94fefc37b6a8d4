//! Deploy path resolver - picks collision-free destinations in the deploy directory
//!
//! Two variants of a build often produce artifacts with the same file name
//! (`app.apk`). The resolver first tries `deploy_dir/app.apk`; when that is
//! taken it retries with a local timestamp between name and extension
//! (`app20240131235959.apk`). The timestamp has one-second resolution, so
//! attempts are spaced by [`RetryPolicy::delay`].
//!
//! The resolver only checks for existence; the caller must write the file
//! right away. Two processes resolving into the same directory can race.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};
use log::warn;
use thiserror::Error;

/// Timestamp suffix format: 14 digits, `YYYYMMDDHHMMSS`
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Errors that can occur while resolving a deploy path
#[derive(Debug, Error)]
pub enum DeployError {
    /// Every attempt found an existing file
    #[error("no free deploy path after {attempts} attempts, last tried: {path}")]
    Exhausted {
        /// The last path that was tried
        path: PathBuf,
        /// Number of attempts made
        attempts: u32,
    },

    /// The existence check itself failed; retrying cannot help
    #[error("cannot check deploy path {path}: {source}")]
    Inaccessible {
        /// The path being checked
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// How often and how far apart resolution is attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first
    pub attempts: u32,
    /// Wait between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            delay: Duration::from_secs(1),
        }
    }
}

/// Resolves destinations inside one deploy directory
#[derive(Debug, Clone)]
pub struct DeployPathResolver {
    deploy_dir: PathBuf,
    policy: RetryPolicy,
}

impl DeployPathResolver {
    /// Create a resolver with the default retry policy
    pub fn new(deploy_dir: impl Into<PathBuf>) -> Self {
        Self::with_policy(deploy_dir, RetryPolicy::default())
    }

    /// Create a resolver with a custom retry policy
    pub fn with_policy(deploy_dir: impl Into<PathBuf>, policy: RetryPolicy) -> Self {
        Self {
            deploy_dir: deploy_dir.into(),
            policy,
        }
    }

    /// The deploy directory
    #[must_use]
    pub fn deploy_dir(&self) -> &Path {
        &self.deploy_dir
    }

    /// The retry policy
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Find a path for `base_name + ext` that does not exist yet
    ///
    /// `ext` includes its leading dot (`".apk"`) or is empty.
    pub fn resolve(&self, base_name: &str, ext: &str) -> Result<PathBuf, DeployError> {
        let attempts = self.policy.attempts.max(1);
        let mut path = self.deploy_dir.join(format!("{base_name}{ext}"));

        for attempt in 1..=attempts {
            let exists = path.try_exists().map_err(|source| DeployError::Inaccessible {
                path: path.clone(),
                source,
            })?;
            if !exists {
                return Ok(path);
            }

            warn!("  attempt {attempt} failed: file already exists at: {}", path.display());
            if attempt == attempts {
                break;
            }

            thread::sleep(self.policy.delay);
            path = self.deploy_dir.join(timestamped_name(base_name, ext, Local::now()));
            warn!("  retrying with {}", path.display());
        }

        Err(DeployError::Exhausted { path, attempts })
    }
}

/// Build `base + YYYYMMDDHHMMSS + ext` for a point in time
#[must_use]
pub fn timestamped_name(base_name: &str, ext: &str, at: DateTime<Local>) -> String {
    format!("{base_name}{}{ext}", at.format(TIMESTAMP_FORMAT))
}
