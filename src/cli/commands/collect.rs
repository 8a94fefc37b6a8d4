//! Deploy artifacts of a build that already ran

use std::time::SystemTime;

use anyhow::Context;
use chrono::DateTime;

use gradle_runner::adapters::ProcessEnv;
use gradle_runner::collector::Collector;
use gradle_runner::config::ArtifactConfig;
use gradle_runner::core::ports::EnvSource;
use gradle_runner::deploy::DeployPathResolver;
use gradle_runner::finder::ArtifactFinder;
use gradle_runner::output::OutputMode;

/// Collect and export artifacts from the project location
///
/// Only the artifact inputs are read from the environment. Without
/// `since`, every matching file is deployed regardless of its age.
pub fn collect(since: Option<&str>, print_env: bool, mode: OutputMode) -> anyhow::Result<()> {
    let env = ProcessEnv;
    let config = ArtifactConfig::from_env(&env).context("invalid step configuration")?;
    config.log_summary();

    let project_location = env
        .get("project_location")
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| ".".to_string());

    let mut collector = Collector::new(
        project_location,
        ArtifactFinder::new(config.path_convention),
        DeployPathResolver::new(&config.deploy_dir),
    );
    if let Some(since) = since {
        collector = collector.since(parse_since(since)?);
    }

    let report = collector.collect(&config.filters)?;
    let mut exporter = super::exporter(print_env);
    report.export(exporter.as_mut())?;
    report.render(mode);

    Ok(())
}

fn parse_since(value: &str) -> anyhow::Result<SystemTime> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("--since: expected an RFC 3339 timestamp, got {value:?}"))?;
    Ok(SystemTime::from(parsed))
}
