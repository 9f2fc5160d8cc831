// CLI surface checks: bare invocation guidance, help output, parse errors.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_bare_invocation_shows_getting_started_guidance() {
    let mut cmd = Command::cargo_bin("dugout").unwrap();

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Dugout - Transfer Negotiation Orchestration",
        ))
        .stdout(predicate::str::contains("dugout status"))
        .stdout(predicate::str::contains("dugout create"))
        .stdout(predicate::str::contains("dugout init"));
}

#[test]
fn test_help_lists_every_subcommand() {
    let mut cmd = Command::cargo_bin("dugout").unwrap();

    let mut assert = cmd.arg("--help").assert().success();
    for subcommand in [
        "status", "show", "create", "assign", "send", "advance", "sign", "review", "sweep",
        "timeline", "init",
    ] {
        assert = assert.stdout(predicate::str::contains(subcommand));
    }
}

#[test]
fn test_advance_rejects_unknown_stage_spellings() {
    let mut cmd = Command::cargo_bin("dugout").unwrap();

    cmd.args([
        "advance",
        "8f6f4a3e-5d8a-4f2b-9c3d-2f1e0b9a8c7d",
        "haggling",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown deal stage 'haggling'"));
}

#[test]
fn test_show_rejects_malformed_contract_ids() {
    let mut cmd = Command::cargo_bin("dugout").unwrap();

    cmd.args(["show", "not-a-uuid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_review_requires_a_reviewer() {
    let mut cmd = Command::cargo_bin("dugout").unwrap();

    cmd.args([
        "review",
        "8f6f4a3e-5d8a-4f2b-9c3d-2f1e0b9a8c7d",
        "accept",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("--reviewer"));
}
