//! Full `relaunch update` against scripted stand-ins for the toolchain and the
//! provider CLI. Kept in its own test binary: it writes and then executes
//! scripts, which must not race with other tests spawning processes.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const RECORD: &str =
    r#"{"bucketName":"site-bucket","distributionId":"DIST123","domainName":"app.example.com"}"#;

fn write_script(path: &Path, body: &str) {
    fs::write(path, body).expect("write script");
    let mut perms = fs::metadata(path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("chmod");
}

const ACCEPT_INVALIDATION: &str =
    r#"echo '{"Invalidation":{"Id":"I2J0I21PCUYOIK","Status":"InProgress"}}'"#;

const THROTTLE_INVALIDATION: &str = "echo 'An error occurred (TooManyInvalidationsInProgress) \
when calling the CreateInvalidation operation: too many invalidations' >&2; exit 254";

/// Fake `aws`: logs every invocation, answers like the real CLI would for a
/// bucket holding `index.html` and a superseded `app.old99.js`.
/// `invalidation` is the shell run for `create-invalidation`.
fn fake_aws(dir: &Path, log: &Path, invalidation: &str) -> PathBuf {
    let path = dir.join("fake-aws");
    write_script(
        &path,
        &format!(
            r#"#!/bin/sh
echo "$@" >> "{log}"
case "$2" in
  list-objects-v2) echo '{{"Contents":[{{"Key":"index.html"}},{{"Key":"app.old99.js"}}]}}' ;;
  head-object) echo '{{"Metadata":{{}}}}' ;;
  put-object) echo '{{"ETag":"\"x\""}}' ;;
  delete-object) echo '{{}}' ;;
  create-invalidation) {invalidation} ;;
  *) echo "unexpected $2" >&2; exit 2 ;;
esac
"#,
            log = log.display(),
            invalidation = invalidation,
        ),
    );
    path
}

fn fake_build(dir: &Path) -> PathBuf {
    let path = dir.join("fake-build");
    write_script(
        &path,
        r#"#!/bin/sh
mkdir -p dist
echo '<script src="/app.a1b2.js"></script>' > dist/index.html
echo 'console.log(1)' > dist/app.a1b2.js
"#,
    );
    path
}

#[test]
fn update_mirrors_build_and_invalidates() {
    let project = TempDir::new().expect("project");
    let tools = TempDir::new().expect("tools");
    fs::write(project.path().join("deployment-info.json"), RECORD).expect("record");
    let log = tools.path().join("aws.log");
    let aws = fake_aws(tools.path(), &log, ACCEPT_INVALIDATION);
    let build = fake_build(tools.path());

    Command::new(assert_cmd::cargo::cargo_bin!("relaunch"))
        .arg("update")
        .arg("--project-dir")
        .arg(project.path())
        .arg("--build-cmd")
        .arg(&build)
        .arg("--aws-bin")
        .arg(&aws)
        .env_remove("RELAUNCH_RECORD")
        .env_remove("RELAUNCH_ARTIFACT_DIR")
        .assert()
        .success()
        .stdout(contains("https://app.example.com"))
        .stdout(contains("2 uploaded, 1 deleted"))
        .stdout(contains("I2J0I21PCUYOIK"))
        .stdout(contains("in progress"));

    let calls = fs::read_to_string(&log).expect("aws log");
    let lines: Vec<&str> = calls.lines().collect();
    let position = |needle: &str| {
        lines
            .iter()
            .position(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("no call matching {needle:?} in:\n{calls}"))
    };

    let put_bundle = position("put-object --output json --bucket site-bucket --key app.a1b2.js");
    let put_index = position("put-object --output json --bucket site-bucket --key index.html");
    let delete_old = position("delete-object --output json --bucket site-bucket --key app.old99.js");
    let invalidate = position("create-invalidation --output json --distribution-id DIST123 --paths /*");

    assert!(put_bundle < put_index, "bundle must land before the HTML referencing it");
    assert!(put_index < delete_old, "deletes run after uploads");
    assert!(delete_old < invalidate, "invalidation runs after sync");
    assert!(calls.contains("--metadata sha256="));
}

#[test]
fn throttled_invalidation_exits_non_zero_but_content_is_live() {
    let project = TempDir::new().expect("project");
    let tools = TempDir::new().expect("tools");
    fs::write(project.path().join("deployment-info.json"), RECORD).expect("record");
    let log = tools.path().join("aws.log");
    let aws = fake_aws(tools.path(), &log, THROTTLE_INVALIDATION);
    let build = fake_build(tools.path());

    Command::new(assert_cmd::cargo::cargo_bin!("relaunch"))
        .arg("update")
        .arg("--project-dir")
        .arg(project.path())
        .arg("--build-cmd")
        .arg(&build)
        .arg("--aws-bin")
        .arg(&aws)
        .env_remove("RELAUNCH_RECORD")
        .env_remove("RELAUNCH_ARTIFACT_DIR")
        .assert()
        .failure()
        .stderr(contains("invalidate stage failed"))
        .stderr(contains("TooManyInvalidationsInProgress"))
        .stderr(contains("content is live"));

    let calls = fs::read_to_string(&log).expect("aws log");
    assert!(calls.contains("delete-object --output json --bucket site-bucket --key app.old99.js"));
    assert_eq!(
        calls.lines().filter(|l| l.contains("create-invalidation")).count(),
        1,
        "a rejected invalidation is not retried"
    );
}
