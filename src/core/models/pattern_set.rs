//! Include/exclude pattern sets
//!
//! A `PatternSet` is what a user configures for one artifact category:
//! newline-separated include globs and newline-separated exclude globs.

use serde::Serialize;

use super::ArtifactCategory;

/// Paired include/exclude glob lists for one artifact category
///
/// Blank lines are dropped on construction, so an exclude list never holds
/// an inert empty pattern. An empty include list matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatternSet {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl PatternSet {
    /// Create a pattern set from include and exclude pattern lists
    pub fn new<I, E>(include: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            include: Self::clean(include),
            exclude: Self::clean(exclude),
        }
    }

    /// Create a pattern set from newline-separated pattern strings
    ///
    /// ```
    /// use gradle_runner::core::models::PatternSet;
    ///
    /// let set = PatternSet::from_lines("*.apk\n*.aab\n", "\n*unaligned*.apk");
    /// assert_eq!(set.include(), ["*.apk", "*.aab"]);
    /// assert_eq!(set.exclude(), ["*unaligned*.apk"]);
    /// ```
    #[must_use]
    pub fn from_lines(include: &str, exclude: &str) -> Self {
        Self::new(include.lines(), exclude.lines())
    }

    /// Include patterns, in configuration order
    #[must_use]
    pub fn include(&self) -> &[String] {
        &self.include
    }

    /// Exclude patterns, in configuration order
    #[must_use]
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Whether this set can never match (no include patterns)
    #[must_use]
    pub fn matches_nothing(&self) -> bool {
        self.include.is_empty()
    }

    fn clean<T>(patterns: T) -> Vec<String>
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    }
}

/// The canonical pattern sets of every artifact category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactFilters {
    /// Application packages and bundles
    pub app: PatternSet,
    /// Instrumentation test packages
    pub test_apk: PatternSet,
    /// Obfuscation mapping files
    pub mapping: PatternSet,
}

impl ArtifactFilters {
    /// Get the pattern set of a category
    #[must_use]
    pub const fn get(&self, category: ArtifactCategory) -> &PatternSet {
        match category {
            ArtifactCategory::App => &self.app,
            ArtifactCategory::TestApk => &self.test_apk,
            ArtifactCategory::Mapping => &self.mapping,
        }
    }

    /// Iterate categories and their pattern sets in pipeline order
    pub fn iter(&self) -> impl Iterator<Item = (ArtifactCategory, &PatternSet)> {
        ArtifactCategory::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}
