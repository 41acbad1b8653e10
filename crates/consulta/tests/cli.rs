// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests of the `consulta` binary's administration commands.
//!
//! Each test writes its own config pointing at a temp-dir database.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn write_config(dir: &Path) -> PathBuf {
    let db = dir.join("consulta.db");
    let path = dir.join("consulta.toml");
    std::fs::write(
        &path,
        format!(
            "[storage]\ndatabase_path = \"{}\"\n",
            db.display().to_string().replace('\\', "/")
        ),
    )
    .unwrap();
    path
}

fn consulta(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_consulta"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn config_validate_reports_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    let output = consulta(&config, &["config", "validate"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("configuration is valid"));
    assert!(stdout(&output).contains("consulta.db"));
}

#[test]
fn invalid_config_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[conversation]\nmax_bot_responses = 0\n").unwrap();

    let output = consulta(&path, &["config", "validate"]);
    assert!(!output.status.success());
}

#[test]
fn added_profile_is_listed_and_offers_slots() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    let added = consulta(
        &config,
        &[
            "profile", "add", "--lecturer", "Dr. Lan", "--day", "monday", "--start", "09:00",
            "--end", "10:00", "--location", "Room 101",
        ],
    );
    assert!(added.status.success(), "{}", String::from_utf8_lossy(&added.stderr));
    assert!(stdout(&added).contains("added profile 1"));

    let listed = consulta(&config, &["profile", "list"]);
    assert!(stdout(&listed).contains("Dr. Lan, Monday 09:00-10:00"));

    let slots = consulta(&config, &["slots", "--date", "2030-01-07"]);
    let text = stdout(&slots);
    assert!(text.contains("Free slots on 2030-01-07"));
    assert!(text.contains("09:00  Dr. Lan (General, Room 101, 30 min)"));
    assert!(text.contains("09:30  Dr. Lan"));
}

#[test]
fn blocked_date_has_no_free_slots() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    consulta(
        &config,
        &[
            "profile", "add", "--lecturer", "Dr. Lan", "--day", "0", "--start", "09:00", "--end",
            "10:00",
        ],
    );

    let blocked = consulta(&config, &["profile", "block", "--id", "1", "--date", "2030-01-07"]);
    assert!(blocked.status.success());

    let slots = consulta(&config, &["slots", "--date", "2030-01-07"]);
    assert!(stdout(&slots).contains("none"));
}

#[test]
fn disabling_an_unknown_profile_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    let output = consulta(&config, &["profile", "disable", "--id", "7"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("availability profile not found: 7"));
}
