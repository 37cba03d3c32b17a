//! End-to-end tests against the `tagfix` binary.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn tagfix() -> Command {
    let mut cmd = Command::cargo_bin("tagfix").expect("tagfix binary");
    cmd.env_remove("TAGFIX_DATA_DIR");
    cmd
}

/// A data directory with binary package metadata and a stable tag snapshot.
fn create_data_dir() -> TempDir {
    let td = tempfile::tempdir().expect("tempdir");
    let data = td.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(
        data.join("binpackages.json"),
        r#"[
  {"package": "libfoo-dev", "version": "1.0-1", "section": "libdevel",
   "description": "Foo development files\n Headers for foo."},
  {"package": "libfoo1", "version": "1.0-1", "section": "libs",
   "description": "Foo shared library"},
  {"package": "linux-image-6.1", "version": "6.1-1", "section": "admin",
   "description": "Linux kernel image"},
  {"package": "nodesc", "version": "1"}
]"#,
    )
    .unwrap();
    fs::write(
        data.join("tags-stable"),
        "libfoo-dev: role::devel-lib\nlibfoo1: role::shared-lib, admin::kernel\nlinux-image-6.1: admin::kernel\n",
    )
    .unwrap();
    td
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read output")
}

#[test]
fn autotag_prints_simplified_patch() {
    let temp = create_data_dir();

    tagfix()
        .current_dir(temp.path())
        .arg("autotag")
        .assert()
        .success()
        .stdout(
            "libfoo-dev: +devel::library\nlinux-image-6.1: +implemented-in::c\n",
        );
}

#[test]
fn autotag_no_simplify_keeps_existing_tags() {
    let temp = create_data_dir();
    let out = temp.path().join("proposed.patch");

    tagfix()
        .current_dir(temp.path())
        .args(["autotag", "--no-simplify", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout("");

    assert_eq!(
        read(&out),
        "libfoo-dev: +devel::library, +role::devel-lib\nlibfoo1: +role::shared-lib\nlinux-image-6.1: +admin::kernel, +implemented-in::c\n"
    );
}

#[test]
fn autotag_respects_whitelist_and_config_data_dir() {
    let temp = create_data_dir();
    let moved = temp.path().join("elsewhere");
    fs::rename(temp.path().join("data"), &moved).unwrap();
    fs::write(
        temp.path().join("tagfix.toml"),
        "[sources]\ndata_dir = \"elsewhere\"\n",
    )
    .unwrap();
    fs::write(temp.path().join("only"), "linux-image-6.1\n").unwrap();

    tagfix()
        .current_dir(temp.path())
        .args(["autotag", "--whitelist", "only"])
        .assert()
        .success()
        .stdout("linux-image-6.1: +implemented-in::c\n");
}

#[test]
fn check_reports_violations_and_fixes() {
    let temp = create_data_dir();
    let fixes = temp.path().join("fixes.patch");
    let report = temp.path().join("report.json");

    tagfix()
        .current_dir(temp.path())
        .args(["check", "--fixes"])
        .arg(&fixes)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "libfoo1: [hint] Shared libraries should have no tags except implemented-in::*",
        ))
        .stdout(predicate::str::contains("  fix: -admin::kernel"));

    let fixes = read(&fixes);
    assert!(fixes.contains("libfoo1: -admin::kernel"));
    assert!(fixes.contains("libfoo-dev: +devel::library"));

    let report: serde_json::Value = serde_json::from_str(&read(&report)).unwrap();
    assert_eq!(report["schema"], "tagfix.check.v1");
    assert_eq!(report["packages_checked"], 3);
}

#[test]
fn check_fail_on_violations_exits_2() {
    let temp = create_data_dir();

    tagfix()
        .current_dir(temp.path())
        .args(["check", "--fail-on-violations"])
        .assert()
        .code(2);
}

#[test]
fn check_fail_on_violations_from_config() {
    let temp = create_data_dir();
    fs::write(
        temp.path().join("tagfix.toml"),
        "[check]\nfail_on_violations = true\n",
    )
    .unwrap();

    tagfix()
        .current_dir(temp.path())
        .arg("check")
        .assert()
        .code(2);
}

#[test]
fn check_json_is_a_report() {
    let temp = create_data_dir();

    let output = tagfix()
        .current_dir(temp.path())
        .args(["check", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["tool"]["name"], "tagfix");
    assert!(report["violations"].as_array().is_some_and(|v| !v.is_empty()));
}

#[test]
fn check_applying_the_fixes_clears_the_fixed_checks() {
    let temp = create_data_dir();
    let fixes = temp.path().join("fixes.patch");

    tagfix()
        .current_dir(temp.path())
        .args(["check", "--fixes"])
        .arg(&fixes)
        .assert()
        .success();

    tagfix()
        .current_dir(temp.path())
        .args(["check", "--patch"])
        .arg(&fixes)
        .assert()
        .success()
        .stdout(predicate::str::contains("Shared libraries").not())
        .stdout(predicate::str::contains("  fix:").not());
}

#[test]
fn simplify_diff_apply_round() {
    let temp = create_data_dir();
    let root = temp.path();
    fs::write(root.join("old.patch"), "libfoo1: +role::shared-lib\nlinux-image-6.1: +admin::kernel, +implemented-in::c\n").unwrap();
    fs::write(root.join("new.patch"), "linux-image-6.1: +implemented-in::c\n").unwrap();

    tagfix()
        .current_dir(root)
        .args(["simplify", "old.patch"])
        .assert()
        .success()
        .stdout("linux-image-6.1: +implemented-in::c\n");

    tagfix()
        .current_dir(root)
        .args(["diff", "old.patch", "new.patch"])
        .assert()
        .success()
        .stdout("libfoo1: -role::shared-lib\nlinux-image-6.1: -admin::kernel\n");

    tagfix()
        .current_dir(root)
        .args(["apply", "new.patch", "--out", "patched"])
        .assert()
        .success();
    assert_eq!(
        read(&root.join("patched")),
        "libfoo-dev: role::devel-lib\nlibfoo1: admin::kernel, role::shared-lib\nlinux-image-6.1: admin::kernel, implemented-in::c\n"
    );
}

#[test]
fn bad_patch_file_exits_1() {
    let temp = create_data_dir();
    fs::write(temp.path().join("bad.patch"), "no colon here\n").unwrap();

    tagfix()
        .current_dir(temp.path())
        .args(["simplify", "bad.patch"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("bad.patch"));
}

#[test]
fn mine_rules_with_missing_program_exits_1() {
    let temp = create_data_dir();

    tagfix()
        .current_dir(temp.path())
        .args(["mine-rules", "--program", "./no-such-apriori", "--quiet"])
        .assert()
        .code(1);
    assert!(!temp.path().join("data/rules.json").exists());
}

#[test]
fn list_checks_text_and_json() {
    tagfix()
        .arg("list-checks")
        .assert()
        .success()
        .stdout(predicate::str::contains("HasEquivs"))
        .stdout(predicate::str::contains("Shlibs"));

    let output = tagfix()
        .args(["list-checks", "--format", "json"])
        .output()
        .unwrap();
    let checks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<u64> = checks
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 9, 10]);
}

#[test]
fn list_producers_in_pipeline_order() {
    let output = tagfix()
        .args(["list-producers", "--format", "json"])
        .output()
        .unwrap();
    let producers: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = producers
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["sections", "uitoolkit", "kernel", "names", "perl", "apriori", "new-versions"]
    );
}

#[test]
fn unknown_preset_is_rejected_by_clap() {
    tagfix()
        .args(["mine-rules", "--preset", "fastest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fastest"));
}
