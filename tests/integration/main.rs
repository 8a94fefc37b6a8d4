//! Integration tests for the gradle-runner CLI
//!
//! These tests run the binary against scratch project trees, covering the
//! standalone `find` and `collect` commands and a full `run` with a fake
//! Gradle wrapper.

use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper function to create a gradle-runner command
fn gradle_runner() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(cargo::cargo_bin!("gradle-runner"));
    cmd.env_remove("RUST_LOG")
        .env_remove("BITRISE_DEPLOY_DIR")
        .env_remove("BITRISE_CACHE_INCLUDE_PATHS")
        .env_remove("BITRISE_CACHE_EXCLUDE_PATHS");
    cmd
}

/// Helper to create a file with parent directories
fn touch(root: &Path, path: &str) {
    let full = root.join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, path).unwrap();
}

// =============================================================================
// Version
// =============================================================================

#[test]
fn test_version() {
    gradle_runner()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("gradle-runner v{}", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_version_json() {
    gradle_runner()
        .args(["--json", "version"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"version\""));
}

// =============================================================================
// Find
// =============================================================================

#[test]
fn test_find_prints_sorted_matches() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "b/app.apk");
    touch(dir.path(), "a/app.apk");
    touch(dir.path(), "a/app-unaligned.apk");
    touch(dir.path(), "a/notes.txt");

    let output = gradle_runner()
        .arg("find")
        .arg(dir.path())
        .args(["--include", "*.apk", "--exclude", "*unaligned*"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        [
            dir.path().join("a/app.apk").display().to_string(),
            dir.path().join("b/app.apk").display().to_string(),
        ]
    );
}

#[test]
fn test_find_without_matches() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "README.md");

    gradle_runner()
        .arg("find")
        .arg(dir.path())
        .args(["--include", "*.apk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No files matched"));
}

#[test]
fn test_find_missing_root_fails() {
    let dir = TempDir::new().unwrap();

    gradle_runner()
        .arg("find")
        .arg(dir.path().join("missing"))
        .args(["--include", "*.apk"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("search root does not exist"));
}

#[test]
fn test_find_invalid_pattern_fails() {
    let dir = TempDir::new().unwrap();

    gradle_runner()
        .arg("find")
        .arg(dir.path())
        .args(["--include", "***.apk"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid pattern"));
}

// =============================================================================
// Collect
// =============================================================================

#[test]
fn test_collect_exports_paths() {
    let project = TempDir::new().unwrap();
    let deploy = TempDir::new().unwrap();
    touch(project.path(), "app/build/outputs/apk/release/app-release.apk");
    touch(project.path(), "app/build/outputs/bundle/release/app-release.aab");
    touch(project.path(), "app/build/outputs/mapping/release/mapping.txt");

    gradle_runner()
        .args(["--print-env", "collect"])
        .env("project_location", project.path())
        .env("BITRISE_DEPLOY_DIR", deploy.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "BITRISE_APK_PATH={}",
            deploy.path().join("app-release.apk").display()
        )))
        .stdout(predicate::str::contains(format!(
            "BITRISE_AAB_PATH_LIST={}",
            deploy.path().join("app-release.aab").display()
        )))
        .stdout(predicate::str::contains("BITRISE_MAPPING_PATH="))
        .stdout(predicate::str::contains("BITRISE_TEST_APK_PATH").not());

    assert!(deploy.path().join("app-release.apk").exists());
    assert!(deploy.path().join("mapping.txt").exists());
}

#[test]
fn test_collect_since_skips_old_artifacts() {
    let project = TempDir::new().unwrap();
    let deploy = TempDir::new().unwrap();
    touch(project.path(), "out/app.apk");

    gradle_runner()
        .args(["--print-env", "collect", "--since", "2999-01-01T00:00:00Z"])
        .env("project_location", project.path())
        .env("BITRISE_DEPLOY_DIR", deploy.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("BITRISE_APK_PATH").not());

    assert!(!deploy.path().join("app.apk").exists());
}

#[test]
fn test_collect_rejects_bad_since() {
    let deploy = TempDir::new().unwrap();

    gradle_runner()
        .args(["collect", "--since", "yesterday"])
        .env("BITRISE_DEPLOY_DIR", deploy.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("RFC 3339"));
}

#[test]
fn test_collect_requires_deploy_dir() {
    gradle_runner()
        .arg("collect")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("BITRISE_DEPLOY_DIR"));
}

#[test]
fn test_collect_json_report() {
    let project = TempDir::new().unwrap();
    let deploy = TempDir::new().unwrap();
    touch(project.path(), "out/app.apk");

    let output = gradle_runner()
        .args(["--json", "collect"])
        .env("project_location", project.path())
        .env("BITRISE_DEPLOY_DIR", deploy.path())
        .env("mapping_file_include_filter", "")
        .output()
        .unwrap();

    // envman is not installed in the test environment
    if output.status.success() {
        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["categories"][0]["copied"].as_array().unwrap().len(), 1);
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("export"), "unexpected failure: {stderr}");
    }
}

// =============================================================================
// Run
// =============================================================================

#[cfg(unix)]
fn write_gradlew(project: &Path, script: &str) {
    fs::write(project.join("gradlew"), format!("#!/bin/sh\n{script}\n")).unwrap();
}

#[cfg(unix)]
#[test]
fn test_run_builds_and_deploys() {
    let project = TempDir::new().unwrap();
    let deploy = TempDir::new().unwrap();
    write_gradlew(
        project.path(),
        "mkdir -p app/build/outputs/apk/debug\necho \"$@\" > app/build/outputs/apk/debug/app-debug.apk",
    );

    gradle_runner()
        .args(["--print-env", "run"])
        .current_dir(project.path())
        .env("gradle_task", "assembleDebug")
        .env("gradle_options", "--stacktrace")
        .env("cache_level", "none")
        .env("BITRISE_DEPLOY_DIR", deploy.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("BITRISE_APK_PATH="));

    let deployed = fs::read_to_string(deploy.path().join("app-debug.apk")).unwrap();
    assert_eq!(deployed.trim(), "assembleDebug --stacktrace");
}

#[cfg(unix)]
#[test]
fn test_run_ignores_outputs_older_than_the_build() {
    let project = TempDir::new().unwrap();
    let deploy = TempDir::new().unwrap();
    touch(project.path(), "app/build/outputs/apk/debug/stale.apk");
    let stale = fs::File::options()
        .write(true)
        .open(project.path().join("app/build/outputs/apk/debug/stale.apk"))
        .unwrap();
    stale
        .set_modified(std::time::SystemTime::now() - std::time::Duration::from_secs(3600))
        .unwrap();
    write_gradlew(project.path(), "exit 0");

    gradle_runner()
        .args(["--print-env", "run"])
        .current_dir(project.path())
        .env("gradle_task", "assembleDebug")
        .env("cache_level", "none")
        .env("BITRISE_DEPLOY_DIR", deploy.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("BITRISE_APK_PATH").not());
}

#[cfg(unix)]
#[test]
fn test_run_reports_build_failure() {
    let project = TempDir::new().unwrap();
    let deploy = TempDir::new().unwrap();
    write_gradlew(project.path(), "echo 'Compilation failed'\nexit 3");

    gradle_runner()
        .args(["--print-env", "run"])
        .current_dir(project.path())
        .env("gradle_task", "assembleDebug")
        .env("cache_level", "none")
        .env("BITRISE_DEPLOY_DIR", deploy.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("exit code 3"));
}

#[cfg(unix)]
#[test]
fn test_run_collects_cache_paths() {
    let project = TempDir::new().unwrap();
    let deploy = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    fs::write(project.path().join("build.gradle"), "").unwrap();
    write_gradlew(project.path(), "exit 0");

    gradle_runner()
        .args(["--print-env", "run"])
        .current_dir(project.path())
        .env("HOME", home.path())
        .env("gradle_task", "assembleDebug")
        .env("BITRISE_DEPLOY_DIR", deploy.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("BITRISE_CACHE_INCLUDE_PATHS="))
        .stdout(predicate::str::contains("gradle.deps"));

    assert!(project.path().join("gradle.deps").exists());
}

#[test]
fn test_run_requires_task() {
    let deploy = TempDir::new().unwrap();

    gradle_runner()
        .arg("run")
        .env_remove("gradle_task")
        .env("BITRISE_DEPLOY_DIR", deploy.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("gradle_task"));
}
