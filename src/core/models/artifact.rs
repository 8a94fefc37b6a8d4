//! Discovered artifact candidates

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::SystemTime;

/// A file found by the finder, with the metadata the collector needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Absolute path of the file
    pub path: PathBuf,
    /// Last modification time
    pub modified: SystemTime,
}

impl Candidate {
    /// Read the modification time of a file
    pub fn read(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let modified = fs::metadata(&path)?.modified()?;
        Ok(Self { path, modified })
    }

    /// Whether this candidate was produced at or after `build_started`
    ///
    /// Without a reference time every candidate is fresh.
    #[must_use]
    pub fn is_fresh(&self, build_started: Option<SystemTime>) -> bool {
        build_started.is_none_or(|started| self.modified >= started)
    }

    /// Split the file name into a base name and an extension
    ///
    /// The extension keeps its leading dot and is empty when the name has none.
    #[must_use]
    pub fn name_parts(&self) -> (String, String) {
        split_file_name(&self.path)
    }
}

/// The current time as the filesystem stamps it in `dir`
///
/// File modification times come from a coarser clock than
/// [`SystemTime::now`], so a file written right after `now()` can carry an
/// earlier mtime. Touching a marker file and reading its mtime gives a
/// reference that later writes in `dir` never precede.
pub fn filesystem_now(dir: &Path) -> io::Result<SystemTime> {
    let marker = dir.join(format!(".gradle-runner-{}.stamp", process::id()));
    let modified = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&marker)
        .and_then(|file| file.metadata())
        .and_then(|meta| meta.modified());

    if marker.exists() {
        fs::remove_file(&marker)?;
    }
    modified
}

/// Split a path's file name into `(base, ".ext")`
#[must_use]
pub fn split_file_name(path: &Path) -> (String, String) {
    let base = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (base, ext)
}
