//! Tests for the environment and subprocess adapters

use gradle_runner::adapters::MapEnv;
use gradle_runner::core::ports::EnvSource;

#[test]
fn test_map_env_lookup() {
    let env: MapEnv = [("gradle_task", "assemble"), ("cache_level", "")].into_iter().collect();
    assert_eq!(env.get("gradle_task").as_deref(), Some("assemble"));
    assert_eq!(env.get("cache_level").as_deref(), Some(""));
    assert_eq!(env.get("missing"), None);
}

#[test]
fn test_map_env_set_overrides() {
    let mut env = MapEnv::new().with("key", "first");
    env.set("key", "second");
    assert_eq!(env.get("key").as_deref(), Some("second"));
}

#[cfg(unix)]
mod unix {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    use gradle_runner::adapters::{Envman, ProcessRunner};
    use gradle_runner::core::ports::{CommandRunner, EnvExporter, ExportError};

    use crate::common::TestTree;

    /// A stand-in for `envman` that stores each value in a file named after its key
    fn fake_envman(tree: &TestTree, exit_code: i32) -> String {
        let script = format!(
            "#!/bin/sh\n[ \"$1\" = add ] && [ \"$2\" = --key ] || exit 2\ncat > \"$(dirname \"$0\")/$3\"\nexit {exit_code}\n"
        );
        let path = tree.add_file("envman", &script);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_envman_passes_value_on_stdin() {
        let tree = TestTree::new();
        let mut exporter = Envman::with_program(fake_envman(&tree, 0));

        exporter.export("BITRISE_APK_PATH", "/deploy/app.apk").unwrap();

        let stored = fs::read_to_string(tree.join("BITRISE_APK_PATH")).unwrap();
        assert_eq!(stored, "/deploy/app.apk");
    }

    #[test]
    fn test_envman_rejected() {
        let tree = TestTree::new();
        let mut exporter = Envman::with_program(fake_envman(&tree, 1));

        let err = exporter.export("BITRISE_APK_PATH", "/deploy/app.apk").unwrap_err();

        assert!(matches!(err, ExportError::Rejected { key, .. } if key == "BITRISE_APK_PATH"));
    }

    #[test]
    fn test_envman_missing_program() {
        let mut exporter = Envman::with_program("/nonexistent/envman");
        let err = exporter.export("KEY", "value").unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }

    #[test]
    fn test_process_runner_captures_both_streams() {
        let args = vec!["-c".to_string(), "echo out; echo err >&2; exit 3".to_string()];

        let output = ProcessRunner.run(Path::new("/bin/sh"), &args).unwrap();

        assert!(!output.success);
        assert_eq!(output.code, Some(3));
        assert!(output.output.contains("out\n"));
        assert!(output.output.contains("err\n"));
    }

    #[test]
    fn test_process_runner_success() {
        let output = ProcessRunner.run(Path::new("/bin/sh"), &["-c".to_string(), "exit 0".to_string()]).unwrap();
        assert!(output.success);
        assert_eq!(output.code, Some(0));
    }
}
