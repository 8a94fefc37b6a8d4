//! gradle-runner - A CI build step that runs a Gradle build and deploys its artifacts
//!
//! This library provides the artifact discovery engine (pattern matching,
//! directory walking, freshness filtering, collision-free deploy paths) and
//! the thin layers around it: environment configuration, build invocation
//! with automatic retry, cache-path collection and environment export.

// Deny all clippy warnings in this crate
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cargo_common_metadata
)]

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod adapters;
pub mod cache;
pub mod collector;
pub mod config;
pub mod core;
pub mod deploy;
pub mod finder;
pub mod gradle;
pub mod output;
