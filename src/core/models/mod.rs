//! Domain models for gradle-runner
//!
//! Pure data structures with no I/O dependencies.
//!
//! - [`PatternSet`] - Include/exclude glob lists for one artifact category
//! - [`ArtifactFilters`] - The pattern sets of every category, in pipeline order
//! - [`ArtifactCategory`] - Apps, test packages, mapping files
//! - [`OutputSlot`] - An exported output list and its environment keys
//! - [`Candidate`] - A discovered file with its modification time

mod artifact;
mod category;
mod pattern_set;

pub use artifact::{Candidate, filesystem_now, split_file_name};
pub use category::{ArtifactCategory, OutputSlot};
pub use pattern_set::{ArtifactFilters, PatternSet};
