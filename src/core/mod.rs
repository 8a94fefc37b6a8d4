//! Core domain logic for gradle-runner
//!
//! This module contains pure logic with no I/O dependencies.
//! All external interactions are abstracted through port traits.
//!
//! ## Architecture
//!
//! - `models/` - Domain types (`PatternSet`, `ArtifactCategory`, `Candidate`)
//! - `services/` - Pattern matching and retry-reason classification
//! - `ports/` - Trait definitions for the environment and subprocesses

pub mod models;
pub mod ports;
pub mod services;
