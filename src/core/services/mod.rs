//! Business logic services
//!
//! Pure logic that operates on data passed in and returns results.
//! These services have no I/O dependencies.
//!
//! - [`matcher`] - Match glob patterns to candidate paths
//! - [`retry_reason`] - Classify build output for automatic retry

pub mod matcher;
pub mod retry_reason;

pub use matcher::{ArtifactPattern, CompiledPatternSet, InvalidPattern, matches};
pub use retry_reason::{RetryClassifier, RetryKind, RetryReason, RetryTableError};
