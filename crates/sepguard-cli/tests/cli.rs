//! End-to-end CLI tests against the fixtures in `tests/fixtures/`.
//!
//! Exit codes: 0 = pass, 2 = violations found, 1 = runtime error.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get a Command for the sepguard binary.
#[allow(deprecated)]
fn sepguard_cmd() -> Command {
    Command::cargo_bin("sepguard").expect("sepguard binary not found - run `cargo build` first")
}

/// Get the path to the test fixtures directory
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("sepguard-cli crate should have a parent directory")
        .parent()
        .expect("crates directory should have a parent (repo root)")
        .join("tests")
        .join("fixtures")
}

fn fixture(rel: &str) -> String {
    fixtures_dir().join(rel).to_string_lossy().into_owned()
}

/// A sepguard command run from an empty directory, so no stray config is picked up.
fn isolated_cmd(dir: &TempDir) -> Command {
    let mut cmd = sepguard_cmd();
    cmd.current_dir(dir.path());
    cmd
}

fn device_args() -> Vec<String> {
    vec![
        "-p".into(),
        fixture("device/policy.conf"),
        "-f".into(),
        fixture("device/plat_file_contexts"),
        "-f".into(),
        fixture("device/vendor_file_contexts"),
    ]
}

fn compat_args() -> Vec<String> {
    vec![
        "-b".into(),
        fixture("compat/base.conf"),
        "-o".into(),
        fixture("compat/old.conf"),
        "-m".into(),
        fixture("compat/30.0.cil"),
        "-u".into(),
        fixture("compat/public.cil"),
    ]
}

#[test]
fn sepolicy_single_test_prints_exact_message() {
    let dir = TempDir::new().expect("tempdir");
    isolated_cmd(&dir)
        .arg("sepolicy-tests")
        .args(device_args())
        .args(["-t", "TestDataTypeViolations"])
        .assert()
        .code(2)
        .stdout(
            "The following types on /data/ must be associated with the \"data_file_type\" \
             attribute: rogue_data_file\n corresponding to files: /data(/.*)? /data/rogue(/.*)? \
             /data/vendor(/.*)? /data/vendor_ce(/.*)? /data/vendor_de(/.*)?\n",
        );
}

#[test]
fn sepolicy_default_run_reports_in_catalog_order() {
    let dir = TempDir::new().expect("tempdir");
    let output = isolated_cmd(&dir)
        .arg("--format")
        .arg("json")
        .arg("sepolicy-tests")
        .args(device_args())
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(2));
    let report: Value = serde_json::from_slice(&output.stdout).expect("json");
    let ids: Vec<&str> = report
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|v| v["check_id"].as_str())
        .collect();
    assert_eq!(ids, vec!["TestDataTypeViolations", "TestCoredomainViolations"]);
}

#[test]
fn config_allow_list_silences_a_check() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(
        dir.path().join("sepguard.toml"),
        "[checks.TestDataTypeViolations]\nallow = [\"rogue_data_file\"]\n",
    )
    .expect("write config");
    isolated_cmd(&dir)
        .arg("sepolicy-tests")
        .args(device_args())
        .args(["-t", "TestDataTypeViolations"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn bad_config_is_a_runtime_error() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("sepguard.toml"), "[checks.NoSuchCheck]\n").expect("write");
    isolated_cmd(&dir)
        .arg("sepolicy-tests")
        .args(device_args())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown check id in config: NoSuchCheck"));
}

#[test]
fn treble_coredomain_flags_vendor_coredomain() {
    let dir = TempDir::new().expect("tempdir");
    isolated_cmd(&dir)
        .arg("treble-tests")
        .args(device_args())
        .args(["-t", "CoredomainViolations"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains(
            "must not be associated with the \"coredomain\" attribute because they are \
             executed off of /vendor or /system/vendor:\nvendor_daemon\n",
        ));
}

#[test]
fn treble_compat_mapping_reports_added_and_removed_types() {
    let dir = TempDir::new().expect("tempdir");
    isolated_cmd(&dir)
        .arg("treble-tests")
        .args(device_args())
        .args(compat_args())
        .args(["-t", "TrebleCompatMapping"])
        .assert()
        .code(2)
        .stdout(
            predicate::str::contains("V.v[.ignore].cil, where V.v is the latest API level.\nnew_public\n")
                .and(predicate::str::contains("latest API level.\ngone_public\n"))
                .and(predicate::str::contains("mapped_new").not()),
        );
}

#[test]
fn treble_defaults_need_compat_files() {
    let dir = TempDir::new().expect("tempdir");
    isolated_cmd(&dir)
        .arg("treble-tests")
        .args(device_args())
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with(
            "sepguard error: must specify the current platform-only policy file",
        ));
}

#[test]
fn treble_unknown_test_lists_available_tests() {
    let dir = TempDir::new().expect("tempdir");
    isolated_cmd(&dir)
        .arg("treble-tests")
        .args(device_args())
        .args(["-t", "NoSuchTest"])
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("unknown test: NoSuchTest\nAvailable tests:\n")
                .and(predicate::str::contains("ViolatorAttributes")),
        );
}

#[test]
fn apex_generic_rules() {
    let dir = TempDir::new().expect("tempdir");
    isolated_cmd(&dir)
        .args(["apex-tests", "-p"])
        .arg(fixture("device/policy.conf"))
        .arg("-f")
        .arg(fixture("apex/apex_fc"))
        .assert()
        .code(2)
        .stdout(
            "Error: ./: apexd can't search. (tcontext=system_file)\n\
             Error: ./: linkerconfig can't search. (tcontext=system_file)\n\
             Error: ./apex_manifest.pb: apexd can't read. (tcontext=system_file)\n\
             Error: ./apex_manifest.pb: linkerconfig can't read. (tcontext=system_file)\n\
             Error: ./bin/tool: can't be labelled as 'vendor_file'\n\
             Error: invalid file_contexts: ./lib/libfoo.so u:object_r\n",
        );
}

#[test]
fn apex_all_also_resolves_types() {
    let dir = TempDir::new().expect("tempdir");
    isolated_cmd(&dir)
        .args(["apex-tests", "--all", "-p"])
        .arg(fixture("device/policy.conf"))
        .arg("-f")
        .arg(fixture("apex/apex_fc"))
        .assert()
        .code(2)
        .stdout(predicate::str::contains(
            "Error: ./etc/made_up: tcontext(made_up_file) is unknown\n",
        ));
}

#[test]
fn freeze_test_reports_added_type() {
    let dir = TempDir::new().expect("tempdir");
    isolated_cmd(&dir)
        .args(["freeze-test", "-c"])
        .arg(fixture("freeze/current.cil"))
        .arg("-p")
        .arg(fixture("freeze/prebuilt.cil"))
        .assert()
        .code(2)
        .stdout(
            predicate::str::starts_with("The following public types were added:\nadded_public\n")
                .and(predicate::str::contains("base_typeattr").not()),
        );
}

#[test]
fn freeze_test_passes_against_itself() {
    let dir = TempDir::new().expect("tempdir");
    isolated_cmd(&dir)
        .args(["freeze-test", "-c"])
        .arg(fixture("freeze/prebuilt.cil"))
        .arg("-p")
        .arg(fixture("freeze/prebuilt.cil"))
        .assert()
        .success()
        .stdout("");
}

#[test]
fn prop_prefix_only_fails_when_strict() {
    let dir = TempDir::new().expect("tempdir");
    let contexts = fixture("property/property_contexts");
    isolated_cmd(&dir)
        .args(["prop-prefix", "--property-contexts", &contexts])
        .args(["--allowed-property-prefix", "ro.vendor."])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("1 violations found:\nro.rogue ")
                .and(predicate::str::contains("BUILD_BROKEN").not()),
        );

    isolated_cmd(&dir)
        .args(["prop-prefix", "--strict", "--property-contexts", &contexts])
        .args(["--allowed-property-prefix", "ro.vendor."])
        .assert()
        .code(2)
        .stdout(predicate::str::contains(
            "BUILD_BROKEN_VENDOR_PROPERTY_NAMESPACE := true",
        ));
}

#[test]
fn fc_sort_writes_output_file() {
    let dir = TempDir::new().expect("tempdir");
    let out = dir.path().join("sorted").join("file_contexts");
    isolated_cmd(&dir)
        .args(["fc-sort", "-i"])
        .arg(fixture("device/plat_file_contexts"))
        .arg("-i")
        .arg(fixture("device/vendor_file_contexts"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success();
    let sorted = std::fs::read_to_string(&out).expect("read sorted");
    let patterns: Vec<&str> = sorted
        .lines()
        .filter_map(|l| l.split_whitespace().next())
        .collect();
    assert_eq!(
        patterns,
        vec![
            "/data(/.*)?",
            "/system(/.*)?",
            "/vendor(/.*)?",
            "/data/rogue(/.*)?",
            "/data/vendor(/.*)?",
            "/data/vendor_ce(/.*)?",
            "/data/vendor_de(/.*)?",
            "/system/bin/init",
            "/vendor/bin/vendor_daemon",
        ]
    );
}

#[test]
fn dump_domains_shows_classification() {
    let dir = TempDir::new().expect("tempdir");
    isolated_cmd(&dir)
        .arg("dump-domains")
        .args(device_args())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("vendor_daemon\n\tcoredomain=true\n")
                .and(predicate::str::contains("\t\t/vendor/bin/vendor_daemon\n")),
        );
}

#[test]
fn list_checks_for_treble() {
    let dir = TempDir::new().expect("tempdir");
    isolated_cmd(&dir)
        .args(["list-checks", "--suite", "treble"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "TrebleCompatMapping (TestNoUnmappedNewTypes)",
        ));
}

#[test]
fn missing_policy_is_a_runtime_error() {
    let dir = TempDir::new().expect("tempdir");
    isolated_cmd(&dir)
        .args(["sepolicy-tests", "-p", "absent.conf", "-f"])
        .arg(fixture("device/plat_file_contexts"))
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("sepguard error: load policy absent.conf"));
}
