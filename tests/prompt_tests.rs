//! Variant selection without a terminal falls back to a numbered prompt

mod common;

use common::TestHome;
use predicates::prelude::*;

#[test]
fn test_prompt_answer_selects_variant() {
    TestHome::new()
        .cmd()
        .args(["--dry-run", "--only", "optimize"])
        .write_stdin("2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Enter choice [1-3]"))
        .stdout(predicate::str::contains("variant:  B"));
}

#[test]
fn test_end_of_input_exits_one() {
    TestHome::new()
        .cmd()
        .args(["--dry-run", "--only", "optimize"])
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No variant selected"));
}

#[test]
fn test_out_of_range_answer_exits_one() {
    TestHome::new()
        .cmd()
        .args(["--dry-run"])
        .write_stdin("7\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid choice '7'"));
}
