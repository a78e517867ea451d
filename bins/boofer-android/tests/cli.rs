//! End-to-end tests for the boofer-android binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("boofer-android").unwrap();
    cmd.arg("--no-color");
    cmd
}

fn rules_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../firebase").join(name)
}

#[test]
fn channels_json_lists_ten() {
    let output = cli().args(["channels", "--json"]).output().unwrap();
    assert!(output.status.success());
    let channels: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(channels.as_array().unwrap().len(), 10);
    assert_eq!(channels[3]["id"], "calls");
}

#[test]
fn register_twice_keeps_ten_channels() {
    cli()
        .args(["register", "--sdk", "33", "--twice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Round 2"))
        .stdout(predicate::str::contains("Store holds 10 channels"));
}

#[test]
fn register_skips_old_platforms() {
    cli()
        .args(["register", "--sdk", "24"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing registered"));
}

#[test]
fn settings_intent_falls_back_before_oreo() {
    cli()
        .args(["settings-intent", "--sdk", "25", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("android.settings.APPLICATION_DETAILS_SETTINGS"))
        .stdout(predicate::str::contains("package:com.shaadow.boofer.android"));
}

#[test]
fn invoke_known_and_unknown_methods() {
    cli()
        .args(["invoke", "openNotificationSettings"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-> true"));

    cli()
        .args(["invoke", "openCamera"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not implemented"));
}

#[test]
fn rules_check_blocks_testing_rules_in_production() {
    cli()
        .arg("rules")
        .arg("check")
        .arg(rules_file("firestore.testing.rules"))
        .args(["--env", "production"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("E7003"));
}

#[test]
fn rules_check_accepts_production_rules() {
    cli()
        .arg("rules")
        .arg("check")
        .arg(rules_file("firestore.rules"))
        .args(["--env", "production"])
        .assert()
        .success();
}

#[test]
fn rules_eval_participants() {
    let resource = r#"{"participants":["alice","bob"]}"#;
    cli()
        .args(["rules", "eval", "--path", "/conversations/c1", "--uid", "alice", "--resource", resource])
        .assert()
        .success();
    cli()
        .args(["rules", "eval", "--path", "/conversations/c1", "--uid", "carol", "--resource", resource])
        .assert()
        .code(5);
}

#[test]
fn signing_reports_missing_keys() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("key.properties");
    std::fs::write(&file, "keyAlias=upload\n").unwrap();

    cli()
        .arg("signing")
        .arg("--file")
        .arg(&file)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("keyPassword, storeFile, storePassword"));
}

#[test]
fn platforms_below_min_sdk_are_rejected() {
    cli()
        .args(["register", "--sdk", "5"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("below the app's minimum SDK 23"));

    cli()
        .args(["invoke", "openNotificationSettings", "--sdk", "5"])
        .assert()
        .code(2);
}

#[test]
fn lowered_min_sdk_warns_below_supported_floor() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("boofer.toml");
    std::fs::write(&config, "[app]\nmin_sdk = 21\n").unwrap();

    cli()
        .arg("--config")
        .arg(&config)
        .args(["settings-intent", "--sdk", "22"])
        .assert()
        .success()
        .stderr(predicate::str::contains("older than API 23"));
}

#[test]
fn rules_check_blocks_allow_split_across_lines() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("firestore.rules");
    std::fs::write(
        &file,
        "service cloud.firestore {\n  match /databases/{database}/documents {\n    match /{document=**} {\n      allow read, write:\n        if true;\n    }\n  }\n}\n",
    )
    .unwrap();

    cli()
        .arg("rules")
        .arg("check")
        .arg(&file)
        .args(["--env", "production"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("E7003"))
        .stderr(predicate::str::contains("firestore.rules:4"));
}

#[test]
fn rules_eval_denial_is_readable() {
    cli()
        .args(["rules", "eval", "--path", "/conversations/new", "--op", "create", "--uid", "alice"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("E7002"))
        .stderr(predicate::str::contains("condition failed to evaluate: resource is null"));
}

#[test]
fn signing_reads_escaped_windows_path() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("key.properties");
    std::fs::write(
        &file,
        "storePassword=s3cret\nkeyPassword=s3cret\nkeyAlias=upload\nstoreFile=C:\\\\Users\\\\dev\\\\upload.jks\n",
    )
    .unwrap();

    cli()
        .arg("signing")
        .arg("--file")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("is complete"))
        .stdout(predicate::str::contains(r"C:\Users\dev\upload.jks"));
}
