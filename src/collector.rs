//! Artifact collector - finds, filters and deploys the artifacts of a build
//!
//! For each category (apps, test packages, mapping files, in that order) the
//! collector runs the finder, drops candidates modified before the build
//! started, and copies the rest into the deploy directory under
//! collision-free names. Any find, resolve or copy failure ends the run.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::{info, warn};
use thiserror::Error;

use crate::core::models::{ArtifactCategory, ArtifactFilters, Candidate, PatternSet};
use crate::core::services::CompiledPatternSet;
use crate::deploy::{DeployError, DeployPathResolver};
use crate::finder::{ArtifactFinder, FindError};
use crate::output::{CategorySummary, CollectReport, CopiedArtifact};

/// Errors that abort artifact collection
#[derive(Debug, Error)]
pub enum CollectError {
    /// The finder failed for a category
    #[error("failed to find {category} files: {source}")]
    Find {
        /// Category being collected
        category: ArtifactCategory,
        /// Underlying finder error
        #[source]
        source: FindError,
    },

    /// A candidate's modification time could not be read
    #[error("failed to read modification time of {path}: {source}")]
    Metadata {
        /// The candidate
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The deploy directory could not be created
    #[error("failed to create deploy directory {path}: {source}")]
    DeployDir {
        /// The deploy directory
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// No destination could be resolved
    #[error("failed to create {category} deploy path: {source}")]
    Deploy {
        /// Category being collected
        category: ArtifactCategory,
        /// Underlying resolver error
        #[source]
        source: DeployError,
    },

    /// Copying an artifact failed
    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        /// Source file
        from: PathBuf,
        /// Destination file
        to: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Collects build artifacts into a deploy directory
#[derive(Debug, Clone)]
pub struct Collector {
    search_root: PathBuf,
    finder: ArtifactFinder,
    resolver: DeployPathResolver,
    build_started: Option<SystemTime>,
}

impl Collector {
    /// Create a collector without a freshness reference
    pub fn new(
        search_root: impl Into<PathBuf>,
        finder: ArtifactFinder,
        resolver: DeployPathResolver,
    ) -> Self {
        Self {
            search_root: search_root.into(),
            finder,
            resolver,
            build_started: None,
        }
    }

    /// Skip candidates modified before `build_started`
    #[must_use]
    pub fn since(mut self, build_started: SystemTime) -> Self {
        self.build_started = Some(build_started);
        self
    }

    /// The directory searched for artifacts
    #[must_use]
    pub fn search_root(&self) -> &Path {
        &self.search_root
    }

    /// Collect every category, in pipeline order
    ///
    /// Every category's patterns are compiled before the first copy, so an
    /// invalid pattern deploys nothing.
    pub fn collect(&self, filters: &ArtifactFilters) -> Result<CollectReport, CollectError> {
        for (category, patterns) in filters.iter() {
            CompiledPatternSet::new(patterns).map_err(|err| CollectError::Find {
                category,
                source: err.into(),
            })?;
        }

        let deploy_dir = self.resolver.deploy_dir();
        fs::create_dir_all(deploy_dir).map_err(|source| CollectError::DeployDir {
            path: deploy_dir.to_path_buf(),
            source,
        })?;

        let mut summaries = Vec::with_capacity(ArtifactCategory::ALL.len());
        for (category, patterns) in filters.iter() {
            info!("Moving {category} files...");
            summaries.push(self.collect_category(category, patterns)?);
        }

        Ok(CollectReport::new(summaries))
    }

    /// Find, filter and copy the artifacts of one category
    pub fn collect_category(
        &self,
        category: ArtifactCategory,
        patterns: &PatternSet,
    ) -> Result<CategorySummary, CollectError> {
        if patterns.matches_nothing() {
            warn!("No include pattern configured for {category} files");
        }

        let mut paths = self
            .finder
            .find(&self.search_root, patterns)
            .map_err(|source| CollectError::Find { category, source })?;
        paths.sort();

        if paths.is_empty() {
            warn!("No file name matched {category} filters");
        }

        let mut summary = CategorySummary {
            category,
            found: paths.len(),
            stale: Vec::new(),
            copied: Vec::new(),
        };

        for path in paths {
            let candidate = Candidate::read(&path)
                .map_err(|source| CollectError::Metadata { path, source })?;

            if !candidate.is_fresh(self.build_started) {
                warn!(
                    "Skipping {}: modified before the build started",
                    candidate.path.display()
                );
                summary.stale.push(candidate.path);
                continue;
            }

            let (base_name, ext) = candidate.name_parts();
            let destination = self
                .resolver
                .resolve(&base_name, &ext)
                .map_err(|source| CollectError::Deploy { category, source })?;

            info!("copy {} to {}", candidate.path.display(), destination.display());
            copy_artifact(&candidate.path, &destination)?;

            summary.copied.push(CopiedArtifact {
                source: candidate.path,
                destination,
            });
        }

        Ok(summary)
    }
}

/// Copy file content to a destination that must not exist yet
///
/// A destination created before the copy failed is removed again.
fn copy_artifact(from: &Path, to: &Path) -> Result<(), CollectError> {
    let copy_error = |source| CollectError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    let mut source = File::open(from).map_err(copy_error)?;
    let mut destination = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(to)
        .map_err(copy_error)?;

    if let Err(err) = io::copy(&mut source, &mut destination) {
        drop(destination);
        if let Err(cleanup) = fs::remove_file(to) {
            warn!("failed to remove partial copy {}: {cleanup}", to.display());
        }
        return Err(copy_error(err));
    }

    Ok(())
}
