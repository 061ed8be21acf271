//! End-to-end runs of the `aspect` binary against a scripted `bazel`.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use aspect_flags_core::FlagDescriptor;
use aspect_flags_discovery::wire::encode_flag_collection;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tempfile::TempDir;

fn run_aspect(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_aspect"))
        .args(args)
        .current_dir(cwd)
        .env_remove("ASPECT_CONFIG")
        .env_remove("ASPECT_LOG")
        .output()
        .expect("failed to run aspect")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn version_works_outside_a_workspace() {
    let dir = TempDir::new().unwrap();
    let out = run_aspect(dir.path(), &["version"]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(
        stdout(&out).trim(),
        format!("aspect {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn flags_listing_is_empty_outside_a_workspace() {
    let dir = TempDir::new().unwrap();
    let out = run_aspect(dir.path(), &["flags", "--json"]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let listed: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(listed, serde_json::json!([]));
}

#[test]
fn unknown_flag_on_administrative_command_is_rejected() {
    let dir = TempDir::new().unwrap();
    let out = run_aspect(dir.path(), &["version", "--bogus"]);

    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("--bogus"));
}

#[cfg(unix)]
mod with_bazel {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// A workspace whose `tools/bazel` answers the flag query from
    /// `flags.b64` and otherwise echoes its arguments.
    fn workspace(descriptors: &[FlagDescriptor], query_exit: i32) -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("MODULE.bazel"), "module(name = \"demo\")\n").unwrap();

        let tools = root.join("tools");
        fs::create_dir_all(&tools).unwrap();
        fs::write(
            tools.join("flags.b64"),
            STANDARD.encode(encode_flag_collection(descriptors)),
        )
        .unwrap();
        let script = format!(
            r#"#!/bin/sh
if [ "$1" = "help" ] && [ "$2" = "flags-as-proto" ]; then
  if [ {query_exit} -ne 0 ]; then
    echo "ERROR: broken bazelrc" >&2
    exit {query_exit}
  fi
  cat "$(dirname "$0")/flags.b64"
  exit 0
fi
echo "bazel $*"
case " $* " in
  *" shutdown "*) exit 7 ;;
esac
"#
        );
        let bazel = tools.join("bazel");
        fs::write(&bazel, script).unwrap();
        fs::set_permissions(&bazel, fs::Permissions::from_mode(0o755)).unwrap();

        let config_dir = root.join(".aspect/cli");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join("config.yaml"),
            "bazel:\n  binary: tools/bazel\n",
        )
        .unwrap();
        dir
    }

    fn schema() -> Vec<FlagDescriptor> {
        vec![
            FlagDescriptor::new("output_base").with_commands(["startup"]),
            FlagDescriptor::new("keep_going")
                .with_abbreviation('k')
                .with_negative_flag()
                .with_documentation("Continue as much as possible after an error.")
                .with_commands(["build", "test"]),
            FlagDescriptor::new("copt")
                .allow_multiple()
                .with_commands(["build"]),
            FlagDescriptor::new("announce_rc")
                .with_negative_flag()
                .with_commands(["build"]),
        ]
    }

    #[test]
    fn verb_is_forwarded_with_normalized_flags() {
        let ws = workspace(&schema(), 0);
        let out = run_aspect(
            ws.path(),
            &[
                "--output_base=/tmp/ob",
                "build",
                "-k",
                "--copt=-O2",
                "//app:server",
                "--remote_cache=grpc://cache",
            ],
        );

        assert!(out.status.success(), "stderr: {}", stderr(&out));
        assert_eq!(
            stdout(&out).trim(),
            "bazel --output_base=/tmp/ob build --keep_going --copt=-O2 //app:server --remote_cache=grpc://cache"
        );
    }

    #[test]
    fn bazel_exit_code_is_propagated() {
        let ws = workspace(&schema(), 0);
        let out = run_aspect(ws.path(), &["shutdown"]);
        assert_eq!(out.status.code(), Some(7));
    }

    #[test]
    fn invalid_negated_value_is_a_usage_error() {
        let ws = workspace(&schema(), 0);
        let out = run_aspect(ws.path(), &["build", "--nokeep_going=false"]);

        assert_eq!(out.status.code(), Some(2));
        assert!(stderr(&out).contains("nokeep_going"));
        assert!(!stdout(&out).contains("bazel"));
    }

    #[test]
    fn help_shows_only_documented_flags() {
        let ws = workspace(&schema(), 0);
        let out = run_aspect(ws.path(), &["build", "--help"]);

        assert!(out.status.success(), "stderr: {}", stderr(&out));
        let help = stdout(&out);
        assert!(help.contains("--keep_going"));
        assert!(help.contains("--nokeep_going"));
        assert!(!help.contains("--announce_rc"));
        assert!(!help.contains("--copt"));
        // Startup flag inherited from the root.
        assert!(!help.contains("--output_base"));
    }

    #[test]
    fn flags_listing_classifies_schema() {
        let ws = workspace(&schema(), 0);
        let out = run_aspect(ws.path(), &["flags", "--all", "--json"]);

        assert!(out.status.success(), "stderr: {}", stderr(&out));
        let listed: Vec<serde_json::Value> = serde_json::from_str(&stdout(&out)).unwrap();
        let kinds: Vec<(&str, &str)> = listed
            .iter()
            .map(|flag| {
                (
                    flag["name"].as_str().unwrap(),
                    flag["kind"].as_str().unwrap(),
                )
            })
            .collect();
        assert_eq!(
            kinds,
            [
                ("announce_rc", "negatable_bool"),
                ("copt", "multi_string"),
                ("keep_going", "negatable_bool"),
                ("output_base", "scalar_string"),
            ]
        );

        let out = run_aspect(ws.path(), &["flags", "--json"]);
        let listed: Vec<serde_json::Value> = serde_json::from_str(&stdout(&out)).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["name"], "keep_going");
    }

    #[test]
    fn failing_flag_query_is_fatal() {
        let ws = workspace(&schema(), 3);
        let out = run_aspect(ws.path(), &["version"]);

        assert_eq!(out.status.code(), Some(1));
        let err = stderr(&out);
        assert!(err.starts_with("error: "), "{err}");
        assert!(err.contains("unable to determine available bazel flags"), "{err}");
    }
}
