//! Artifact finder - walks a build tree and selects files by pattern set
//!
//! The finder performs one recursive walk of the search root. Every entry
//! that is, or links to, a regular file is matched against the
//! include/exclude patterns, using one [`PathConvention`] for both lists.
//!
//! # Examples
//!
//! ```no_run
//! use gradle_runner::core::models::PatternSet;
//! use gradle_runner::finder::{ArtifactFinder, PathConvention};
//!
//! let finder = ArtifactFinder::new(PathConvention::Relative);
//! let patterns = PatternSet::from_lines("*.apk\n*.aab", "*unaligned*.apk");
//! let artifacts = finder.find("app/build/outputs", &patterns).unwrap();
//! ```

use std::fs;
use std::io;
use std::path::{self, Path, PathBuf};

use log::debug;
use serde::Serialize;
use thiserror::Error;
use walkdir::WalkDir;

use crate::core::models::PatternSet;
use crate::core::services::{CompiledPatternSet, InvalidPattern};

/// Errors that can occur while finding artifacts
#[derive(Debug, Error)]
pub enum FindError {
    /// Search root does not exist
    #[error("search root does not exist: {0}")]
    RootNotFound(PathBuf),

    /// Search root is not a directory
    #[error("search root is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Search root exists but cannot be inspected
    #[error("cannot access search root {path}: {source}")]
    RootInaccessible {
        /// The search root
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A pattern of the set could not be compiled
    #[error(transparent)]
    InvalidPattern(#[from] InvalidPattern),

    /// An entry could not be read during the walk
    #[error("failed to walk {path}: {source}")]
    Walk {
        /// The entry that failed
        path: PathBuf,
        /// Underlying walk error
        #[source]
        source: walkdir::Error,
    },
}

/// Which form of a file's path the patterns are matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathConvention {
    /// Path relative to the search root, `/`-separated (`a/b/app.apk`)
    #[default]
    Relative,
    /// Absolute path of the file (`/work/out/a/b/app.apk`)
    Absolute,
}

/// Finds files under a search root that satisfy a pattern set
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactFinder {
    convention: PathConvention,
}

impl ArtifactFinder {
    /// Create a finder using the given matching convention
    #[must_use]
    pub const fn new(convention: PathConvention) -> Self {
        Self { convention }
    }

    /// The matching convention of this finder
    #[must_use]
    pub const fn convention(&self) -> PathConvention {
        self.convention
    }

    /// Find every file under `search_root` selected by `patterns`
    ///
    /// Returns absolute paths in walk order, which is not guaranteed to be
    /// stable; sort the result when order matters. No matches is `Ok(vec![])`.
    /// The walk stops at the first entry that cannot be read.
    pub fn find(
        &self,
        search_root: impl AsRef<Path>,
        patterns: &PatternSet,
    ) -> Result<Vec<PathBuf>, FindError> {
        let root = Self::check_root(search_root.as_ref())?;
        let compiled = CompiledPatternSet::new(patterns)?;

        if compiled.matches_nothing() {
            debug!("no include patterns, nothing to find under {}", root.display());
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(&root) {
            let entry = entry.map_err(|source| FindError::Walk {
                path: source.path().map_or_else(|| root.clone(), Path::to_path_buf),
                source,
            })?;
            if !is_regular_file(&entry) {
                continue;
            }

            let candidate = self.match_path(&root, entry.path());
            if compiled.is_match(&candidate) {
                debug!("matched {candidate}");
                found.push(entry.into_path());
            }
        }

        Ok(found)
    }

    /// The string the patterns are matched against for `path`
    fn match_path(&self, root: &Path, path: &Path) -> String {
        let path = match self.convention {
            PathConvention::Relative => path.strip_prefix(root).unwrap_or(path),
            PathConvention::Absolute => path,
        };
        let text = path.to_string_lossy();
        if path::MAIN_SEPARATOR == '/' {
            text.into_owned()
        } else {
            text.replace(path::MAIN_SEPARATOR, "/")
        }
    }

    /// Validate the search root and make it absolute
    fn check_root(root: &Path) -> Result<PathBuf, FindError> {
        match fs::metadata(root) {
            Ok(meta) if meta.is_dir() => {},
            Ok(_) => return Err(FindError::NotADirectory(root.to_path_buf())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FindError::RootNotFound(root.to_path_buf()));
            },
            Err(source) => {
                return Err(FindError::RootInaccessible {
                    path: root.to_path_buf(),
                    source,
                });
            },
        }

        path::absolute(root).map_err(|source| FindError::RootInaccessible {
            path: root.to_path_buf(),
            source,
        })
    }
}

/// Whether an entry is a regular file, following symlinks
fn is_regular_file(entry: &walkdir::DirEntry) -> bool {
    if entry.path_is_symlink() {
        fs::metadata(entry.path()).is_ok_and(|meta| meta.is_file())
    } else {
        entry.file_type().is_file()
    }
}
