//! List files matching patterns

use std::path::Path;

use gradle_runner::core::models::PatternSet;
use gradle_runner::finder::{ArtifactFinder, PathConvention};
use gradle_runner::output::{FindResult, OutputMode};

/// Walk `root` and print the files selected by the patterns, sorted
pub fn find(
    root: &Path,
    include: Vec<String>,
    exclude: Vec<String>,
    absolute: bool,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let convention = if absolute {
        PathConvention::Absolute
    } else {
        PathConvention::Relative
    };

    let patterns = PatternSet::new(include, exclude);
    let mut matches = ArtifactFinder::new(convention).find(root, &patterns)?;
    matches.sort();

    FindResult {
        root: root.to_path_buf(),
        convention,
        matches,
    }
    .render(mode);

    Ok(())
}
