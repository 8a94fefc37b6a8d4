//! Retry-reason classifier - recognises transient Gradle failures
//!
//! A failed build is retried once when its output contains one of the
//! known transient failure signatures (SDK components that were still being
//! installed, flaky dependency downloads, unavailable repositories).
//! The signatures are data: a default table, optionally extended from a
//! TOML file with `[[reason]]` entries.
//!
//! ```toml
//! [[reason]]
//! pattern = "Read timed out"
//! kind = "network"
//! ```

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use thiserror::Error;

/// What kind of transient failure a signature indicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryKind {
    /// An SDK platform or build-tools component was not found
    MissingSdkComponent,
    /// A dependency could not be fetched
    Network,
    /// A repository server answered with a temporary error
    ServerUnavailable,
    /// A downloaded archive was truncated or corrupt
    CorruptDownload,
}

/// Errors loading an additional retry-reason table
#[derive(Debug, Error)]
pub enum RetryTableError {
    /// The table is not valid TOML or has unknown kinds
    #[error("invalid retry reason table: {0}")]
    Parse(#[from] toml::de::Error),

    /// A table entry has an empty pattern
    #[error("retry reason #{0} has an empty pattern")]
    EmptyPattern(usize),

    /// A pattern could not be compiled into a matcher
    #[error("retry reason pattern rejected: {0}")]
    Pattern(#[from] regex::Error),
}

/// A known transient failure signature
#[derive(Debug, Clone)]
pub struct RetryReason {
    pattern: String,
    kind: RetryKind,
    regex: Regex,
}

impl RetryReason {
    /// Create a signature; matching is case-insensitive and literal
    pub fn new(pattern: &str, kind: RetryKind) -> Result<Self, RetryTableError> {
        let regex = RegexBuilder::new(&regex::escape(pattern)).case_insensitive(true).build()?;
        Ok(Self {
            pattern: pattern.to_string(),
            kind,
            regex,
        })
    }

    /// The signature text
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The failure kind
    #[must_use]
    pub const fn kind(&self) -> RetryKind {
        self.kind
    }

    /// Whether the build output contains this signature
    #[must_use]
    pub fn is_found_in(&self, output: &str) -> bool {
        self.regex.is_match(output)
    }
}

/// Default signatures, in lookup order
const DEFAULT_REASONS: &[(&str, RetryKind)] = &[
    ("Failed to find target with hash string ", RetryKind::MissingSdkComponent),
    ("Failed to find Build Tools revision ", RetryKind::MissingSdkComponent),
    ("Failed to find Platform SDK with path: ", RetryKind::MissingSdkComponent),
    ("Could not find ", RetryKind::Network),
    ("Could not HEAD ", RetryKind::Network),
    ("Connection timed out", RetryKind::Network),
    ("Could not read ", RetryKind::Network),
    ("Could not get resource ", RetryKind::Network),
    ("Could not GET ", RetryKind::Network),
    ("Could not download ", RetryKind::Network),
    (
        "Received status code 503 from server: Service Temporarily Unavailable",
        RetryKind::ServerUnavailable,
    ),
    ("Cause: error in opening zip file.", RetryKind::CorruptDownload),
    ("Failed to download resource", RetryKind::Network),
    ("Failed to download SHA1 for resource", RetryKind::Network),
];

#[derive(Debug, Deserialize)]
struct ReasonTable {
    #[serde(default)]
    reason: Vec<ReasonEntry>,
}

#[derive(Debug, Deserialize)]
struct ReasonEntry {
    pattern: String,
    kind: RetryKind,
}

/// Ordered table of retry signatures consulted after a failed build
#[derive(Debug, Clone)]
pub struct RetryClassifier {
    reasons: Vec<RetryReason>,
}

impl Default for RetryClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_REASONS.iter().filter_map(|(p, k)| RetryReason::new(p, *k).ok()))
    }
}

impl RetryClassifier {
    /// Create a classifier from an explicit table
    pub fn new(reasons: impl IntoIterator<Item = RetryReason>) -> Self {
        Self {
            reasons: reasons.into_iter().collect(),
        }
    }

    /// The default table extended with entries parsed from TOML
    pub fn with_overrides_toml(content: &str) -> Result<Self, RetryTableError> {
        let table: ReasonTable = toml::from_str(content)?;
        let mut classifier = Self::default();

        for (index, entry) in table.reason.into_iter().enumerate() {
            if entry.pattern.trim().is_empty() {
                return Err(RetryTableError::EmptyPattern(index + 1));
            }
            classifier.reasons.push(RetryReason::new(&entry.pattern, entry.kind)?);
        }

        Ok(classifier)
    }

    /// The signatures, in lookup order
    #[must_use]
    pub fn reasons(&self) -> &[RetryReason] {
        &self.reasons
    }

    /// Find the first signature present in the build output
    #[must_use]
    pub fn classify(&self, output: &str) -> Option<&RetryReason> {
        self.reasons.iter().find(|r| r.is_found_in(output))
    }
}
