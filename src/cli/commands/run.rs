//! Full build step: build, cache, deploy

use std::fs;

use anyhow::Context;
use log::{info, warn};

use gradle_runner::adapters::{ProcessEnv, ProcessRunner};
use gradle_runner::cache::{self, CacheCollector};
use gradle_runner::collector::Collector;
use gradle_runner::config::StepConfig;
use gradle_runner::core::models::filesystem_now;
use gradle_runner::core::ports::{EnvExporter, EnvSource};
use gradle_runner::core::services::RetryClassifier;
use gradle_runner::deploy::DeployPathResolver;
use gradle_runner::finder::ArtifactFinder;
use gradle_runner::gradle::{self, GradleInvocation};
use gradle_runner::output::{self, OutputMode};

/// Run the Gradle build and deploy what it produced
pub fn run(print_env: bool, mode: OutputMode) -> anyhow::Result<()> {
    let env = ProcessEnv;
    let config = StepConfig::from_env(&env).context("invalid step configuration")?;
    config.log_summary();

    let classifier = load_classifier(&config)?;

    output::section(mode, "Build");
    let gradlew = gradle::resolve_gradlew_path(&config.project_location, &config.gradlew_path)?;
    gradle::ensure_executable(&gradlew)?;

    let invocation = GradleInvocation {
        gradlew,
        build_file: config.gradle_file.clone(),
        tasks: config.gradle_task.clone(),
        options: config.gradle_options.clone(),
    };

    let build_started = filesystem_now(&config.project_location).with_context(|| {
        format!("failed to stamp the build start in {}", config.project_location.display())
    })?;
    gradle::run_build(&ProcessRunner, &invocation, &classifier, config.retry_on_failure)?;
    output::done(mode, "Build succeeded");

    let mut exporter = super::exporter(print_env);

    output::section(mode, "Collecting cache");
    collect_cache(&config, &env, exporter.as_mut());

    output::section(mode, "Exporting artifacts");
    let collector = Collector::new(
        &config.project_location,
        ArtifactFinder::new(config.artifacts.path_convention),
        DeployPathResolver::new(&config.artifacts.deploy_dir),
    )
    .since(build_started);

    let report = collector.collect(&config.artifacts.filters)?;
    report.export(exporter.as_mut())?;
    report.render(mode);

    Ok(())
}

fn load_classifier(config: &StepConfig) -> anyhow::Result<RetryClassifier> {
    let Some(path) = &config.retry_reasons_file else {
        return Ok(RetryClassifier::default());
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read retry reasons from {}", path.display()))?;
    RetryClassifier::with_overrides_toml(&content)
        .with_context(|| format!("invalid retry reasons in {}", path.display()))
}

/// Cache problems never fail the step
fn collect_cache(config: &StepConfig, env: &dyn EnvSource, exporter: &mut dyn EnvExporter) {
    let collector = CacheCollector::new(&config.project_location, config.cache_level);
    match collector.collect() {
        Ok(Some(paths)) => {
            if let Err(err) = cache::commit(&paths, env, exporter) {
                warn!("{err}");
            }
        },
        Ok(None) => info!("Cache collection disabled"),
        Err(err) => warn!("{err}"),
    }
}
