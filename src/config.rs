//! Step configuration from environment variables
//!
//! Every input of the step is a named environment variable. The
//! configuration is read explicitly, key by key, and enumerated inputs are
//! validated against their allowed values.
//!
//! Deprecated filter inputs (`apk_file_include_filter`,
//! `apk_file_exclude_filter`) are migrated into the app pattern set; each
//! use is recorded as a [`Deprecation`] and logged.

use std::fmt;
use std::path::PathBuf;

use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::core::models::{ArtifactFilters, PatternSet};
use crate::core::ports::EnvSource;
use crate::finder::PathConvention;

/// Default app include patterns
pub const DEFAULT_APP_INCLUDE: &str = "*.apk\n*.aab";
/// Default app exclude patterns
pub const DEFAULT_APP_EXCLUDE: &str = "*unaligned.apk\n*Test*.apk\n*/intermediates/*";
/// Default test package include patterns
pub const DEFAULT_TEST_APK_INCLUDE: &str = "*Test*.apk";
/// Default mapping file include patterns
pub const DEFAULT_MAPPING_INCLUDE: &str = "*/mapping.txt";
/// Default mapping file exclude patterns
pub const DEFAULT_MAPPING_EXCLUDE: &str = "*/tmp/*";

/// Deploy directory variable set by the CI platform
pub const DEPLOY_DIR_KEY: &str = "BITRISE_DEPLOY_DIR";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required input is missing or blank
    #[error("no {0} parameter specified")]
    Missing(&'static str),

    /// An enumerated input has a value outside its options
    #[error("{key}: invalid value {value:?}, expected one of: {allowed}")]
    InvalidOption {
        /// The input name
        key: &'static str,
        /// The rejected value
        value: String,
        /// Comma-separated allowed values
        allowed: String,
    },
}

/// Which caches are collected after the build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheLevel {
    /// Dependencies and build caches
    All,
    /// Dependency caches only
    #[default]
    OnlyDeps,
    /// No cache collection
    Disabled,
}

impl fmt::Display for CacheLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::OnlyDeps => "only_deps",
            Self::Disabled => "none",
        })
    }
}

/// A deprecated input that was used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Deprecation {
    /// The deprecated input
    pub field: &'static str,
    /// The input that replaces it
    pub replacement: &'static str,
}

/// Artifact collection inputs
///
/// This is the part of the configuration the collector needs; it can be
/// loaded on its own when no build is run.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactConfig {
    /// Canonical pattern sets per category
    pub filters: ArtifactFilters,
    /// How artifact paths are matched against patterns
    pub path_convention: PathConvention,
    /// Deploy directory
    pub deploy_dir: PathBuf,
    /// Deprecated inputs that were migrated
    pub deprecations: Vec<Deprecation>,
}

impl ArtifactConfig {
    /// Read and validate the artifact inputs
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let deploy_dir =
            non_blank(env, DEPLOY_DIR_KEY).ok_or(ConfigError::Missing(DEPLOY_DIR_KEY))?;

        let mut deprecations = Vec::new();
        let app_include = migrate(
            env,
            "app_file_include_filter",
            "apk_file_include_filter",
            DEFAULT_APP_INCLUDE,
            &mut deprecations,
        );
        let app_exclude = migrate(
            env,
            "app_file_exclude_filter",
            "apk_file_exclude_filter",
            DEFAULT_APP_EXCLUDE,
            &mut deprecations,
        );

        let filters = ArtifactFilters {
            app: PatternSet::from_lines(&app_include, &app_exclude),
            test_apk: PatternSet::from_lines(
                &or_default(env, "test_apk_file_include_filter", DEFAULT_TEST_APK_INCLUDE),
                &or_default(env, "test_apk_file_exclude_filter", ""),
            ),
            mapping: PatternSet::from_lines(
                &or_default(env, "mapping_file_include_filter", DEFAULT_MAPPING_INCLUDE),
                &or_default(env, "mapping_file_exclude_filter", DEFAULT_MAPPING_EXCLUDE),
            ),
        };

        Ok(Self {
            filters,
            path_convention: option(
                env,
                "artifact_path_match",
                PathConvention::Relative,
                &[("relative", PathConvention::Relative), ("absolute", PathConvention::Absolute)],
            )?,
            deploy_dir: PathBuf::from(deploy_dir),
            deprecations,
        })
    }

    /// Log the artifact inputs, one per line
    pub fn log_summary(&self) {
        info!("- AppFileIncludeFilter: {}", self.filters.app.include().join(", "));
        info!("- AppFileExcludeFilter: {}", self.filters.app.exclude().join(", "));
        info!("- TestApkFileIncludeFilter: {}", self.filters.test_apk.include().join(", "));
        info!("- TestApkFileExcludeFilter: {}", self.filters.test_apk.exclude().join(", "));
        info!("- MappingFileIncludeFilter: {}", self.filters.mapping.include().join(", "));
        info!("- MappingFileExcludeFilter: {}", self.filters.mapping.exclude().join(", "));
        info!("- DeployDir: {}", self.deploy_dir.display());
    }
}

/// Fully validated step configuration
#[derive(Debug, Clone, Serialize)]
pub struct StepConfig {
    /// Root directory of the Gradle project
    pub project_location: PathBuf,
    /// Gradle wrapper path, relative to the project root unless absolute
    pub gradlew_path: PathBuf,
    /// Optional build file passed with `--build-file`
    pub gradle_file: Option<PathBuf>,
    /// Gradle tasks (shell syntax)
    pub gradle_task: String,
    /// Extra Gradle flags (shell syntax)
    pub gradle_options: String,
    /// Which caches are collected
    pub cache_level: CacheLevel,
    /// Whether a failed build is retried on a known transient reason
    pub retry_on_failure: bool,
    /// Additional retry-reason table
    pub retry_reasons_file: Option<PathBuf>,
    /// Artifact collection inputs
    pub artifacts: ArtifactConfig,
}

impl StepConfig {
    /// Read and validate the configuration
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let gradle_task =
            non_blank(env, "gradle_task").ok_or(ConfigError::Missing("gradle_task"))?;

        Ok(Self {
            project_location: PathBuf::from(or_default(env, "project_location", ".")),
            gradlew_path: PathBuf::from(or_default(env, "gradlew_path", "./gradlew")),
            gradle_file: non_blank(env, "gradle_file").map(PathBuf::from),
            gradle_task,
            gradle_options: or_default(env, "gradle_options", ""),
            cache_level: option(
                env,
                "cache_level",
                CacheLevel::OnlyDeps,
                &[
                    ("all", CacheLevel::All),
                    ("only_deps", CacheLevel::OnlyDeps),
                    ("none", CacheLevel::Disabled),
                ],
            )?,
            retry_on_failure: option(
                env,
                "retry_on_failure",
                true,
                &[("yes", true), ("no", false)],
            )?,
            retry_reasons_file: non_blank(env, "retry_reasons_file").map(PathBuf::from),
            artifacts: ArtifactConfig::from_env(env)?,
        })
    }

    /// Log every input, one per line
    pub fn log_summary(&self) {
        info!("Configs:");
        info!("- ProjectLocation: {}", self.project_location.display());
        info!("- GradlewPath: {}", self.gradlew_path.display());
        info!(
            "- GradleFile: {}",
            self.gradle_file.as_ref().map(|p| p.display().to_string()).unwrap_or_default()
        );
        info!("- GradleTasks: {}", self.gradle_task);
        info!("- GradleOptions: {}", self.gradle_options);
        info!("- CacheLevel: {}", self.cache_level);
        info!("- RetryOnFailure: {}", self.retry_on_failure);
        self.artifacts.log_summary();
    }
}

/// A set, non-blank variable
fn non_blank(env: &dyn EnvSource, key: &str) -> Option<String> {
    env.get(key).filter(|v| !v.trim().is_empty())
}

/// A variable, or `default` when unset; a set-but-blank value is kept
fn or_default(env: &dyn EnvSource, key: &str, default: &str) -> String {
    env.get(key).unwrap_or_else(|| default.to_string())
}

/// Resolve a filter input, letting a non-blank deprecated alias override it
fn migrate(
    env: &dyn EnvSource,
    key: &'static str,
    deprecated: &'static str,
    default: &str,
    deprecations: &mut Vec<Deprecation>,
) -> String {
    match non_blank(env, deprecated) {
        Some(value) => {
            warn!("{deprecated} is deprecated, use {key} instead; {key} is ignored");
            deprecations.push(Deprecation {
                field: deprecated,
                replacement: key,
            });
            value
        },
        None => or_default(env, key, default),
    }
}

/// Parse an enumerated input; unset or blank takes `default`
fn option<T: Copy>(
    env: &dyn EnvSource,
    key: &'static str,
    default: T,
    allowed: &[(&str, T)],
) -> Result<T, ConfigError> {
    let Some(value) = non_blank(env, key) else {
        return Ok(default);
    };
    let value = value.trim();

    allowed
        .iter()
        .find(|(name, _)| *name == value)
        .map(|(_, parsed)| *parsed)
        .ok_or_else(|| ConfigError::InvalidOption {
            key,
            value: value.to_string(),
            allowed: allowed.iter().map(|(name, _)| *name).collect::<Vec<_>>().join(", "),
        })
}
