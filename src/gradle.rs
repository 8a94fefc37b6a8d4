//! Gradle invocation
//!
//! Resolves the Gradle wrapper, builds its command line from the step
//! inputs and runs it. A failed build whose output contains a known
//! transient failure signature is run once more.

use std::fs;
use std::io;
use std::path::{self, Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use crate::core::ports::CommandRunner;
use crate::core::services::RetryClassifier;

/// Errors that can occur while preparing or running the build
#[derive(Debug, Error)]
pub enum GradleError {
    /// The project root does not exist
    #[error("build root directory does not exist at: {0}")]
    BuildRootNotFound(PathBuf),

    /// The gradle wrapper does not exist
    #[error("gradlew does not exist at: {0}")]
    GradlewNotFound(PathBuf),

    /// A path could not be inspected or updated
    #[error("failed to access {path}: {source}")]
    Io {
        /// The path being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Tasks or options are not valid shell words
    #[error("invalid {field}: unbalanced quoting in {value:?}")]
    InvalidArguments {
        /// Which input was rejected
        field: &'static str,
        /// The rejected value
        value: String,
    },

    /// The build process could not be started
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// The program that failed to start
        program: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The build ran and failed
    #[error("gradle task failed{}", .code.map(|c| format!(" with exit code {c}")).unwrap_or_default())]
    Failed {
        /// Exit code, when the process exited normally
        code: Option<i32>,
    },
}

/// Resolve the gradle wrapper against the build root
///
/// The build root must exist. A relative `gradlew` is taken relative to the
/// build root; the resolved wrapper must exist.
pub fn resolve_gradlew_path(build_root: &Path, gradlew: &Path) -> Result<PathBuf, GradleError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| GradleError::Io { path, source }
    };

    let root = path::absolute(build_root).map_err(io_err(build_root))?;
    if !root.try_exists().map_err(io_err(&root))? {
        return Err(GradleError::BuildRootNotFound(root));
    }

    let resolved = if gradlew.is_absolute() {
        gradlew.to_path_buf()
    } else {
        normalize(&root.join(gradlew))
    };

    if !resolved.try_exists().map_err(io_err(&resolved))? {
        return Err(GradleError::GradlewNotFound(resolved));
    }
    Ok(resolved)
}

/// Lexically remove `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            path::Component::CurDir => {},
            path::Component::ParentDir => {
                out.pop();
            },
            other => out.push(other),
        }
    }
    out
}

/// Make the wrapper executable for its owner and group
pub fn ensure_executable(gradlew: &Path) -> Result<(), GradleError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(gradlew, fs::Permissions::from_mode(0o770)).map_err(|source| {
            GradleError::Io {
                path: gradlew.to_path_buf(),
                source,
            }
        })?;
    }
    #[cfg(not(unix))]
    {
        fs::metadata(gradlew).map_err(|source| GradleError::Io {
            path: gradlew.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// One Gradle command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradleInvocation {
    /// The wrapper to run
    pub gradlew: PathBuf,
    /// Optional `--build-file`
    pub build_file: Option<PathBuf>,
    /// Tasks, in shell syntax
    pub tasks: String,
    /// Extra options, in shell syntax
    pub options: String,
}

impl GradleInvocation {
    /// Arguments after the program: `[--build-file F] tasks... options...`
    pub fn args(&self) -> Result<Vec<String>, GradleError> {
        let split = |field: &'static str, value: &str| {
            shlex::split(value).ok_or_else(|| GradleError::InvalidArguments {
                field,
                value: value.to_string(),
            })
        };

        let mut args = Vec::new();
        if let Some(build_file) = &self.build_file {
            args.push("--build-file".to_string());
            args.push(build_file.to_string_lossy().into_owned());
        }
        args.extend(split("gradle_task", &self.tasks)?);
        args.extend(split("gradle_options", &self.options)?);
        Ok(args)
    }

    /// The full command line, quoted for display
    pub fn printable(&self) -> Result<String, GradleError> {
        let program = self.gradlew.to_string_lossy().into_owned();
        let words: Vec<String> = std::iter::once(program).chain(self.args()?).collect();
        Ok(shlex::try_join(words.iter().map(String::as_str)).unwrap_or_else(|_| words.join(" ")))
    }
}

/// Run the build, retrying once on a recognised transient failure
pub fn run_build(
    runner: &dyn CommandRunner,
    invocation: &GradleInvocation,
    classifier: &RetryClassifier,
    retry_on_failure: bool,
) -> Result<(), GradleError> {
    let args = invocation.args()?;
    info!("$ {}", invocation.printable()?);

    let result = runner.run(&invocation.gradlew, &args).map_err(|source| GradleError::Spawn {
        program: invocation.gradlew.clone(),
        source,
    })?;
    if result.success {
        return Ok(());
    }

    if retry_on_failure {
        if let Some(reason) = classifier.classify(&result.output) {
            warn!("Automatic retry reason found in log: {} - retrying...", reason.pattern());
            return run_build(runner, invocation, classifier, false);
        }
    }

    Err(GradleError::Failed { code: result.code })
}
