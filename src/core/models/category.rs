//! Artifact categories and their exported outputs

use std::fmt;
use std::path::Path;

use serde::Serialize;

/// A kind of build output collected by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactCategory {
    /// Application packages (`.apk`) and bundles (`.aab`)
    App,
    /// Instrumentation test packages
    TestApk,
    /// Obfuscation mapping files
    Mapping,
}

impl ArtifactCategory {
    /// All categories, in the order the pipeline collects them
    pub const ALL: [Self; 3] = [Self::App, Self::TestApk, Self::Mapping];

    /// Human-readable label used in log messages
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::App => "app",
            Self::TestApk => "test apk",
            Self::Mapping => "mapping",
        }
    }
}

impl fmt::Display for ArtifactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An exported output list
///
/// Each slot is exported under two keys: the most recently copied path and
/// the `|`-joined list of every copied path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSlot {
    /// Application packages
    Apk,
    /// Application bundles
    Aab,
    /// Test packages
    TestApk,
    /// Mapping files
    Mapping,
}

impl OutputSlot {
    /// All slots, in export order
    pub const ALL: [Self; 4] = [Self::Apk, Self::Aab, Self::TestApk, Self::Mapping];

    /// Environment key holding the last copied path
    #[must_use]
    pub const fn primary_key(self) -> &'static str {
        match self {
            Self::Apk => "BITRISE_APK_PATH",
            Self::Aab => "BITRISE_AAB_PATH",
            Self::TestApk => "BITRISE_TEST_APK_PATH",
            Self::Mapping => "BITRISE_MAPPING_PATH",
        }
    }

    /// Environment key holding the `|`-joined list of copied paths
    #[must_use]
    pub const fn list_key(self) -> &'static str {
        match self {
            Self::Apk => "BITRISE_APK_PATH_LIST",
            Self::Aab => "BITRISE_AAB_PATH_LIST",
            Self::TestApk => "BITRISE_TEST_APK_PATH_LIST",
            Self::Mapping => "BITRISE_MAPPING_PATH_LIST",
        }
    }

    /// Pick the slot for an artifact of a category
    ///
    /// App artifacts are partitioned by extension: `.aab` files are bundles,
    /// everything else is a package.
    #[must_use]
    pub fn for_artifact(category: ArtifactCategory, path: &Path) -> Self {
        match category {
            ArtifactCategory::App => {
                let is_bundle =
                    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("aab"));
                if is_bundle { Self::Aab } else { Self::Apk }
            },
            ArtifactCategory::TestApk => Self::TestApk,
            ArtifactCategory::Mapping => Self::Mapping,
        }
    }
}
