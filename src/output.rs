//! Output formatting for human and JSON modes
//!
//! This module provides the structured results of a run, which can be
//! rendered either as human-readable text or machine-parseable JSON, and
//! exported to downstream steps.

use std::path::{Path, PathBuf};

use colored::Colorize;
use log::info;
use serde::Serialize;

use crate::core::models::{ArtifactCategory, OutputSlot};
use crate::core::ports::{EnvExporter, ExportError};
use crate::finder::PathConvention;

/// Separator of exported path lists
pub const LIST_SEPARATOR: &str = "|";

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (machine-readable)
    Json,
}

/// Print a step heading (human mode only)
pub fn section(mode: OutputMode, title: &str) {
    if mode == OutputMode::Human {
        println!("\n{}", title.blue().bold());
    }
}

/// Print a completion line (human mode only)
pub fn done(mode: OutputMode, message: &str) {
    if mode == OutputMode::Human {
        println!("  {}", message.green().bold());
    }
}

/// A file copied into the deploy directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopiedArtifact {
    /// Where the artifact was found
    pub source: PathBuf,
    /// Where it was copied to
    pub destination: PathBuf,
}

/// What happened to one artifact category
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    /// The category
    pub category: ArtifactCategory,
    /// Number of files the patterns selected
    pub found: usize,
    /// Files skipped because they predate the build
    pub stale: Vec<PathBuf>,
    /// Files copied, in copy order
    pub copied: Vec<CopiedArtifact>,
}

/// One exported output list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputList {
    /// Which output this is
    pub slot: OutputSlot,
    /// Key of the last copied path
    pub primary_key: &'static str,
    /// Key of the joined path list
    pub list_key: &'static str,
    /// Copied paths, in copy order
    pub paths: Vec<PathBuf>,
}

impl OutputList {
    /// Create an empty list for a slot
    #[must_use]
    pub const fn new(slot: OutputSlot) -> Self {
        Self {
            slot,
            primary_key: slot.primary_key(),
            list_key: slot.list_key(),
            paths: Vec::new(),
        }
    }

    /// The most recently copied path
    #[must_use]
    pub fn primary(&self) -> Option<&Path> {
        self.paths.last().map(PathBuf::as_path)
    }

    /// All paths joined with [`LIST_SEPARATOR`]
    #[must_use]
    pub fn joined(&self) -> String {
        self.paths
            .iter()
            .map(|p| p.to_string_lossy())
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR)
    }
}

/// Result of collecting every artifact category
#[derive(Debug, Clone, Serialize)]
pub struct CollectReport {
    /// Per-category summaries, in pipeline order
    pub categories: Vec<CategorySummary>,
    /// Output lists, one per slot, in export order
    pub outputs: Vec<OutputList>,
}

impl CollectReport {
    /// Build a report, partitioning copied files into output slots
    #[must_use]
    pub fn new(categories: Vec<CategorySummary>) -> Self {
        let mut outputs: Vec<OutputList> = OutputSlot::ALL.into_iter().map(OutputList::new).collect();

        for summary in &categories {
            for copied in &summary.copied {
                let slot = OutputSlot::for_artifact(summary.category, &copied.destination);
                if let Some(list) = outputs.iter_mut().find(|o| o.slot == slot) {
                    list.paths.push(copied.destination.clone());
                }
            }
        }

        Self {
            categories,
            outputs,
        }
    }

    /// Get the output list of a slot
    #[must_use]
    pub fn output(&self, slot: OutputSlot) -> Option<&OutputList> {
        self.outputs.iter().find(|o| o.slot == slot)
    }

    /// Total number of copied files
    #[must_use]
    pub fn copied_count(&self) -> usize {
        self.categories.iter().map(|c| c.copied.len()).sum()
    }

    /// Export every non-empty output list
    pub fn export(&self, exporter: &mut dyn EnvExporter) -> Result<(), ExportError> {
        for list in self.outputs.iter().filter(|o| !o.paths.is_empty()) {
            if let Some(primary) = list.primary() {
                let value = primary.to_string_lossy();
                exporter.export(list.primary_key, &value)?;
                info!(
                    "The {} path is now available in the Environment Variable: ${} (value: {value})",
                    slot_label(list.slot),
                    list.primary_key
                );
            }

            let joined = list.joined();
            exporter.export(list.list_key, &joined)?;
            info!(
                "The {} paths list is now available in the Environment Variable: ${} (value: {joined})",
                slot_label(list.slot),
                list.list_key
            );
        }
        Ok(())
    }

    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        println!();
        for summary in &self.categories {
            println!(
                "{}: {} found, {} stale, {} copied",
                summary.category.label().bold(),
                summary.found,
                summary.stale.len(),
                summary.copied.len()
            );
            for copied in &summary.copied {
                println!("  {} -> {}", copied.source.display(), copied.destination.display());
            }
        }

        if self.copied_count() == 0 {
            println!("\n{}", "No artifacts were deployed.".yellow());
            return;
        }

        println!();
        for list in self.outputs.iter().filter(|o| !o.paths.is_empty()) {
            println!("  ${} = {}", list.list_key, list.joined());
        }
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}

const fn slot_label(slot: OutputSlot) -> &'static str {
    match slot {
        OutputSlot::Apk => "apk",
        OutputSlot::Aab => "aab",
        OutputSlot::TestApk => "test apk",
        OutputSlot::Mapping => "mapping",
    }
}

/// Result of a standalone find
#[derive(Debug, Clone, Serialize)]
pub struct FindResult {
    /// The walked directory
    pub root: PathBuf,
    /// Matching convention used
    pub convention: PathConvention,
    /// Matching files, sorted
    pub matches: Vec<PathBuf>,
}

impl FindResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => {
                if self.matches.is_empty() {
                    println!("No files matched under {}", self.root.display());
                    return;
                }
                for path in &self.matches {
                    println!("{}", path.display());
                }
            },
            OutputMode::Json => {
                println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
            },
        }
    }
}
