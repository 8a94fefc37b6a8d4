//! Build cache path collection
//!
//! After the build, the step registers which directories the CI platform
//! should cache. Dependency caches are keyed to a lock file holding the
//! digests of every `*.gradle` file in the project, so the cache is
//! invalidated whenever a build script changes.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use sha2::{Digest, Sha256};
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::CacheLevel;
use crate::core::ports::{EnvExporter, EnvSource, ExportError};

/// Name of the dependency lock file written to the project root
pub const DEPS_LOCKFILE: &str = "gradle.deps";

/// Variable holding the newline-separated cache include list
pub const CACHE_INCLUDE_KEY: &str = "BITRISE_CACHE_INCLUDE_PATHS";
/// Variable holding the newline-separated cache exclude list
pub const CACHE_EXCLUDE_KEY: &str = "BITRISE_CACHE_EXCLUDE_PATHS";

/// Paths never worth caching
pub const EXCLUDE_PATHS: &[&str] = &[
    "~/.gradle/**",
    "~/.android/build-cache/**",
    "*.lock",
    "*.bin",
    "/**/build/**.json",
    "/**/build/**.html",
    "/**/build/**.xml",
    "/**/build/**.properties",
    "/**/build/**/zip-cache/**",
    "*.log",
    "*.txt",
    "*.rawproto",
    "!*.ap_",
    "!*.apk",
];

/// Errors that skip cache collection
#[derive(Debug, Error)]
pub enum CacheError {
    /// The project root could not be made absolute
    #[error("cache collection skipped: failed to determine project root path: {0}")]
    ProjectRoot(#[source] io::Error),

    /// The home directory is unknown
    #[error("cache collection skipped: failed to determine home directory")]
    HomeDir,

    /// Walking the project failed
    #[error("cache collection skipped: failed to walk project: {0}")]
    Walk(#[from] walkdir::Error),

    /// The lock file could not be written
    #[error("dependency map generation skipped: failed to write {path}: {source}")]
    Lockfile {
        /// The lock file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Exporting the lists failed
    #[error("cache collection skipped: failed to commit cache paths: {0}")]
    Commit(#[from] ExportError),
}

/// Cache include and exclude lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachePaths {
    /// Paths to cache, optionally `path -> indicator`
    pub include: Vec<String>,
    /// Patterns to leave out
    pub exclude: Vec<String>,
}

/// Collects cache paths for one project
#[derive(Debug, Clone)]
pub struct CacheCollector {
    project_root: PathBuf,
    home_dir: Option<PathBuf>,
    level: CacheLevel,
}

impl CacheCollector {
    /// Create a collector using the current user's home directory
    pub fn new(project_root: impl Into<PathBuf>, level: CacheLevel) -> Self {
        Self {
            project_root: project_root.into(),
            home_dir: dirs::home_dir(),
            level,
        }
    }

    /// Override the home directory
    #[must_use]
    pub fn with_home_dir(mut self, home_dir: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(home_dir.into());
        self
    }

    /// Write the lock file and compute the cache lists
    ///
    /// Returns `None` when caching is disabled.
    pub fn collect(&self) -> Result<Option<CachePaths>, CacheError> {
        if self.level == CacheLevel::Disabled {
            return Ok(None);
        }

        let root = std::path::absolute(&self.project_root).map_err(CacheError::ProjectRoot)?;
        let home = self.home_dir.as_deref().ok_or(CacheError::HomeDir)?;
        let lockfile = root.join(DEPS_LOCKFILE);

        let digests = dependency_digests(&root)?;
        fs::write(&lockfile, digests).map_err(|source| CacheError::Lockfile {
            path: lockfile.clone(),
            source,
        })?;

        let keyed = |dir: PathBuf| format!("{} -> {}", dir.display(), lockfile.display());
        let mut include = vec![
            keyed(home.join(".gradle")),
            keyed(home.join(".kotlin")),
            keyed(home.join(".m2")),
        ];

        if self.level == CacheLevel::All {
            include.push(keyed(home.join(".android").join("build-cache")));
            include.extend(
                build_dirs(&root)?.into_iter().map(|dir| dir.display().to_string()),
            );
        }

        Ok(Some(CachePaths {
            include,
            exclude: EXCLUDE_PATHS.iter().map(ToString::to_string).collect(),
        }))
    }
}

/// Concatenated SHA-256 digests of every `*.gradle` file, in walk order
fn dependency_digests(root: &Path) -> Result<String, CacheError> {
    let mut content = String::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().is_none_or(|ext| ext != "gradle")
            || path.components().any(|c| c.as_os_str() == "node_modules")
        {
            continue;
        }

        match file_digest(path) {
            Ok(digest) => content.push_str(&digest),
            Err(err) => warn!("Failed to compute hash of {}: {err}", path.display()),
        }
    }
    Ok(content)
}

fn file_digest(path: &Path) -> io::Result<String> {
    let mut hasher = Sha256::new();
    io::copy(&mut File::open(path)?, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Every `build` and `.gradle` directory under the root
///
/// Matched directories are not descended into.
fn build_dirs(root: &Path) -> Result<Vec<PathBuf>, CacheError> {
    let mut dirs = Vec::new();
    let mut walker = WalkDir::new(root).sort_by_file_name().into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry?;
        if entry.depth() > 0
            && entry.file_type().is_dir()
            && (entry.file_name() == "build" || entry.file_name() == ".gradle")
        {
            dirs.push(entry.into_path());
            walker.skip_current_dir();
        }
    }
    Ok(dirs)
}

/// Append the lists to the platform's cache variables
pub fn commit(
    paths: &CachePaths,
    env: &dyn EnvSource,
    exporter: &mut dyn EnvExporter,
) -> Result<(), CacheError> {
    append(env, exporter, CACHE_INCLUDE_KEY, &paths.include)?;
    append(env, exporter, CACHE_EXCLUDE_KEY, &paths.exclude)?;
    Ok(())
}

fn append(
    env: &dyn EnvSource,
    exporter: &mut dyn EnvExporter,
    key: &str,
    items: &[String],
) -> Result<(), ExportError> {
    if items.is_empty() {
        return Ok(());
    }

    let mut lines: Vec<String> = env
        .get(key)
        .map(|existing| existing.lines().map(str::to_string).filter(|l| !l.trim().is_empty()).collect())
        .unwrap_or_default();
    lines.extend(items.iter().cloned());

    debug!("{key}: {} entries", lines.len());
    exporter.export(key, &lines.join("\n"))
}
