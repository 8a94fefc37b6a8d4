//! Artifact pattern matcher - matches glob patterns against candidate paths
//!
//! This module contains pure matching logic with no I/O dependencies.
//!
//! Patterns use shell-glob semantics with one deliberate difference from
//! path globbing: `*` also matches `/`, so `*.apk` matches `a/b/test.apk`
//! and `*/b/*.apk` matches `a/b/test.apk`. Matching is anchored at both ends.
//!
//! | Pattern | Matches |
//! |---------|---------|
//! | `*` | any run of characters, including `/` |
//! | `?` | exactly one character |
//! | `[abc]`, `[!abc]` | one character from (or not from) the class |
//! | `**` | like `*`, but only as a whole path component |

use glob::{MatchOptions, Pattern, PatternError};
use thiserror::Error;

use crate::core::models::PatternSet;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// An include or exclude pattern could not be compiled
#[derive(Debug, Error)]
#[error("invalid pattern {pattern:?}: {source}")]
pub struct InvalidPattern {
    /// The offending pattern
    pub pattern: String,
    /// Why it was rejected
    #[source]
    pub source: PatternError,
}

/// A compiled artifact pattern
///
/// Blank patterns compile to an inert pattern that matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPattern {
    raw: String,
    compiled: Option<Pattern>,
}

impl ArtifactPattern {
    /// Compile a pattern
    pub fn new(pattern: &str) -> Result<Self, InvalidPattern> {
        let trimmed = pattern.trim();
        let compiled = if trimmed.is_empty() {
            None
        } else {
            Some(Pattern::new(trimmed).map_err(|source| InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?)
        };

        Ok(Self {
            raw: pattern.to_string(),
            compiled,
        })
    }

    /// The pattern as written
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this pattern can never match
    #[must_use]
    pub const fn is_inert(&self) -> bool {
        self.compiled.is_none()
    }

    /// Check the whole candidate path against this pattern
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.compiled
            .as_ref()
            .is_some_and(|p| p.matches_with(candidate, MATCH_OPTIONS))
    }
}

/// A [`PatternSet`] compiled for repeated matching
#[derive(Debug, Clone)]
pub struct CompiledPatternSet {
    include: Vec<ArtifactPattern>,
    exclude: Vec<ArtifactPattern>,
}

impl CompiledPatternSet {
    /// Compile every pattern of a set, failing on the first invalid one
    pub fn new(set: &PatternSet) -> Result<Self, InvalidPattern> {
        let compile = |patterns: &[String]| {
            patterns.iter().map(|p| ArtifactPattern::new(p)).collect::<Result<Vec<_>, _>>()
        };

        Ok(Self {
            include: compile(set.include())?,
            exclude: compile(set.exclude())?,
        })
    }

    /// Whether the set has no include patterns
    #[must_use]
    pub fn matches_nothing(&self) -> bool {
        self.include.iter().all(ArtifactPattern::is_inert)
    }

    /// A path is selected when any include matches and no exclude matches
    #[must_use]
    pub fn is_match(&self, candidate: &str) -> bool {
        self.include.iter().any(|p| p.matches(candidate))
            && !self.exclude.iter().any(|p| p.matches(candidate))
    }
}

/// Check if a glob pattern matches a candidate path
///
/// Blank and invalid patterns match nothing.
///
/// # Examples
///
/// ```
/// use gradle_runner::core::services::matches;
///
/// assert!(matches("*.apk", "a/b/test.apk"));
/// assert!(matches("*/b/*.apk", "a/b/test.apk"));
/// assert!(!matches("*/mapping.txt", "mapping.txt"));
/// assert!(!matches("", "anything"));
/// ```
#[must_use]
pub fn matches(pattern: &str, candidate: &str) -> bool {
    ArtifactPattern::new(pattern).is_ok_and(|p| p.matches(candidate))
}
