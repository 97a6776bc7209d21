//! End-to-end tests for the `thriftgen` binary using a fake compiler script.

#![cfg(unix)]
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn thriftgen() -> Command {
    Command::cargo_bin("thriftgen").expect("thriftgen binary")
}

/// Writes `<base>_types.{erl,hrl}` into the `--out` dir; schemas named
/// `bad*` fail. The version printed is substituted per project.
fn fake_thrift(version: &str) -> String {
    format!(
        r#"#!/bin/sh
if [ "$1" = "-version" ]; then
  echo "Thrift version {version}"
  exit 0
fi
out="$2"
for last; do :; done
base=$(basename "$last" .thrift)
case "$base" in
  bad*) echo "[FAILURE:$last] syntax error" >&2; exit 1 ;;
esac
touch "$out/${{base}}_types.erl" "$out/${{base}}_types.hrl"
"#
    )
}

/// Temporary project with `idl/*.thrift` schemas, a fake compiler in
/// `bin/thrift` and a thriftgen.toml pointing at both.
fn create_project(schemas: &[&str], version: &str, extra_config: &str) -> TempDir {
    let td = tempfile::tempdir().expect("tempdir");
    let root = td.path();

    fs::create_dir_all(root.join("bin")).unwrap();
    let exe = root.join("bin").join("thrift");
    fs::write(&exe, fake_thrift(version)).unwrap();
    fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();

    fs::create_dir_all(root.join("idl")).unwrap();
    for schema in schemas {
        let file = File::create(root.join("idl").join(schema)).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(1_000))
            .unwrap();
    }

    let files = schemas
        .iter()
        .map(|s| format!("\"idl/{s}\""))
        .collect::<Vec<_>>()
        .join(", ");
    fs::write(
        root.join("thriftgen.toml"),
        format!(
            "[thrift]\nfiles = [{files}]\nexecutable = \"bin/thrift\"\n{extra_config}"
        ),
    )
    .unwrap();

    td
}

fn generated(root: &Path, name: &str) -> PathBuf {
    root.join("src").join(name)
}

#[test]
fn test_compile_then_noop() {
    let temp = create_project(&["user.thrift"], "0.10.0", "version = \"~> 0.10\"\n");

    thriftgen()
        .current_dir(temp.path())
        .arg("compile")
        .assert()
        .success()
        .stdout(predicate::str::contains("compiled 1 of 1"))
        .stderr(predicate::str::contains("compiled"));

    assert!(generated(temp.path(), "user_types.erl").is_file());
    assert!(generated(temp.path(), "user_types.hrl").is_file());

    thriftgen()
        .current_dir(temp.path())
        .arg("compile")
        .assert()
        .success()
        .stdout(predicate::str::diff("noop\n"));
}

#[test]
fn test_force_recompiles() {
    let temp = create_project(&["user.thrift"], "0.10.0", "");

    thriftgen()
        .current_dir(temp.path())
        .arg("compile")
        .assert()
        .success();

    thriftgen()
        .current_dir(temp.path())
        .args(["compile", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("compiled 1 of 1"));
}

#[test]
fn test_project_root_flag() {
    let temp = create_project(&["user.thrift"], "0.10.0", "");

    thriftgen()
        .arg("compile")
        .arg("--project-root")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("compiled 1 of 1"));

    assert!(generated(temp.path(), "user_types.erl").is_file());
}

#[test]
fn test_failed_schema_does_not_fail_the_run() {
    let temp = create_project(&["bad.thrift", "good.thrift"], "0.10.0", "");

    thriftgen()
        .current_dir(temp.path())
        .arg("compile")
        .assert()
        .success()
        .stdout(predicate::str::contains("compiled 1 of 2"))
        .stderr(predicate::str::contains("failed to compile"))
        .stderr(predicate::str::contains("exit code 1"));

    assert!(generated(temp.path(), "good_types.erl").is_file());
    assert!(!generated(temp.path(), "bad_types.erl").exists());
}

#[test]
fn test_unsupported_version_exits_2() {
    let temp = create_project(&["user.thrift"], "0.9.3", "version = \"~> 0.10\"\n");

    thriftgen()
        .current_dir(temp.path())
        .arg("compile")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unsupported compiler version 0.9.3"));

    assert!(!temp.path().join("src").exists());
}

#[test]
fn test_version_req_flag_overrides_config() {
    let temp = create_project(&["user.thrift"], "0.9.3", "version = \"~> 0.10\"\n");

    thriftgen()
        .current_dir(temp.path())
        .args(["compile", "--version-req", ">= 0.9.0"])
        .assert()
        .success();
}

#[test]
fn test_missing_executable_exits_1() {
    let temp = create_project(&["user.thrift"], "0.10.0", "");

    thriftgen()
        .current_dir(temp.path())
        .env("PATH", temp.path().join("nowhere"))
        .args(["compile", "--executable", "thrift"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found on PATH"));
}

#[test]
fn test_invalid_config_exits_1() {
    let temp = create_project(&["user.thrift"], "0.10.0", "");
    fs::write(temp.path().join("thriftgen.toml"), "[thrift\n").unwrap();

    thriftgen()
        .current_dir(temp.path())
        .arg("compile")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("thriftgen.toml"));
}

#[test]
fn test_stale_lists_work_without_running_compiler() {
    let temp = create_project(&["user.thrift", "order.thrift"], "0.10.0", "");

    thriftgen()
        .current_dir(temp.path())
        .args(["stale", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("idl/user.thrift"))
        .stdout(predicate::str::contains("idl/order.thrift"));

    assert!(!temp.path().join("src").exists());

    thriftgen()
        .current_dir(temp.path())
        .args(["compile", "idl/user.thrift"])
        .assert()
        .success();

    thriftgen()
        .current_dir(temp.path())
        .arg("stale")
        .assert()
        .success()
        .stdout(predicate::str::diff("idl/order.thrift\n"));
}

#[test]
fn test_clean_removes_generated_files() {
    let temp = create_project(&["user.thrift"], "0.10.0", "");
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::write(generated(temp.path(), "handwritten.erl"), "").unwrap();

    thriftgen()
        .current_dir(temp.path())
        .arg("compile")
        .assert()
        .success();

    thriftgen()
        .current_dir(temp.path())
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("user_types.erl"))
        .stdout(predicate::str::contains("user_types.hrl"));

    assert!(!generated(temp.path(), "user_types.erl").exists());
    assert!(generated(temp.path(), "handwritten.erl").is_file());
}
