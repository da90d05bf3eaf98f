use assert_cmd::Command;
use predicates::prelude::*;

/// Helper to get a Command for the sepguard binary.
#[allow(deprecated)]
fn sepguard_cmd() -> Command {
    Command::cargo_bin("sepguard").unwrap()
}

#[test]
fn help_works() {
    sepguard_cmd().arg("--help").assert().success();
}

#[test]
fn help_lists_every_tool() {
    sepguard_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("sepolicy-tests")
            .and(predicate::str::contains("treble-tests"))
            .and(predicate::str::contains("apex-tests"))
            .and(predicate::str::contains("freeze-test"))
            .and(predicate::str::contains("prop-prefix"))
            .and(predicate::str::contains("fc-sort"))
            .and(predicate::str::contains("dump-domains")),
    );
}

#[test]
fn suite_requires_file_contexts() {
    sepguard_cmd()
        .args(["sepolicy-tests", "-p", "policy.conf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--file_contexts"));
}
