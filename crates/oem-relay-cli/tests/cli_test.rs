//! End-to-end tests for the `oem-notify` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SMTP: &str = "\
[SMTP]
server = smtp.example.com
port = 25
sender = oem@example.com
";

const RULES: &str = "\
[RULES]
evaluation_mode = all_match
rule1.condition.target_type = oracle_database
rule1.action.recipients = dba@example.com
rule1.action.priority = 1
rule2.condition.target_name = WebServer
rule2.action.recipients = web@example.com
";

fn write_config(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("oem_notify.ini");
    fs::write(&path, body).unwrap();
    path
}

fn oem_notify(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("oem-notify").unwrap();
    cmd.env_remove("OEM_NOTIFY_CONFIG")
        .env_remove("OEM_NOTIFY_LOG")
        .env_remove("RUST_LOG")
        .env("EVENT_NAME", "Tablespace Full")
        .env("SEVERITY", "CRITICAL")
        .env("TARGET_NAME", "ORCL")
        .env("TARGET_TYPE", "oracle_database")
        .env("TARGET_LIFECYCLE_STATUS", "Production")
        .env("MESSAGE", "USERS is 97% full")
        .arg("--config")
        .arg(config);
    cmd
}

fn read_log(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join("oem_notify.log")).unwrap()
}

#[test]
fn missing_config_fails() {
    let dir = TempDir::new().unwrap();

    oem_notify(&dir.path().join("absent.ini"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));

    assert!(read_log(&dir).contains("cannot load configuration"));
}

#[test]
fn disabled_sending_succeeds_without_transport() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        &format!("{SMTP}[SENDMAIL]\nenable = false\nprogram = /nonexistent/sendEmail\n{RULES}"),
    );

    oem_notify(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Sending:          disabled"))
        .stdout(predicate::str::contains("rule1"))
        .stdout(predicate::str::contains("Matched: 1 of 2 rule(s), 0 failure(s)"));

    let log = read_log(&dir);
    assert!(log.contains("rule matched"));
    assert!(log.contains("sending disabled, notification not sent"));
}

#[test]
fn dry_run_reports_json() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &format!("{SMTP}{RULES}"));

    let output = oem_notify(&config)
        .args(["--dry-run", "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["dry_run"], true);
    assert_eq!(value["report"]["mode"], "all_match");
    assert_eq!(value["report"]["any_rule_matched"], true);
    assert_eq!(value["report"]["outcomes"][0]["rule_index"], 1);
    assert_eq!(value["report"]["outcomes"][0]["attempted"], false);
    assert_eq!(value["event"]["target_name"], "ORCL");
}

#[test]
fn no_matching_rule_still_succeeds() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &format!("{SMTP}{RULES}"));

    oem_notify(&config)
        .env("TARGET_TYPE", "host")
        .env("TARGET_NAME", "webserver")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("No rule matched (2 rule(s) evaluated)"));

    assert!(read_log(&dir).contains("no rule matched the event"));
}

#[test]
fn incomplete_smtp_is_logged_and_succeeds() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &format!("[SMTP]\nserver = smtp.example.com\n{RULES}"));

    oem_notify(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("missing: port, sender"));

    assert!(read_log(&dir).contains("failed to send notification"));
}

#[cfg(unix)]
#[test]
fn successful_transport_exit() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &format!("{SMTP}[SENDMAIL]\nprogram = true\n{RULES}"));

    oem_notify(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"))
        .stdout(predicate::str::contains("0 failure(s)"));

    assert!(read_log(&dir).contains("notification dispatched"));
}

#[cfg(unix)]
#[test]
fn failing_transport_still_exits_zero() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &format!("{SMTP}[SENDMAIL]\nprogram = false\n{RULES}"));

    oem_notify(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("failed"))
        .stdout(predicate::str::contains("1 failure(s)"));

    assert!(read_log(&dir).contains("failed to send notification"));
}

#[test]
fn debug_lines_follow_config() {
    let quiet = TempDir::new().unwrap();
    let config = write_config(&quiet, &format!("{SMTP}{RULES}"));
    oem_notify(&config).arg("--dry-run").assert().success();
    assert!(!read_log(&quiet).contains("DEBUG"));

    let verbose = TempDir::new().unwrap();
    let config = write_config(&verbose, &format!("{SMTP}[DEBUG]\nenable = true\n{RULES}"));
    oem_notify(&config).arg("--dry-run").assert().success();
    assert!(read_log(&verbose).contains("DEBUG"));
}

#[test]
fn log_file_is_appended_across_runs() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &format!("{SMTP}{RULES}"));

    oem_notify(&config).arg("--dry-run").assert().success();
    oem_notify(&config).arg("--dry-run").assert().success();

    assert_eq!(read_log(&dir).matches("configuration loaded").count(), 2);
}

#[test]
fn explicit_log_file_overrides_config() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        &format!("{SMTP}[DEBUG]\nlog_file = configured.log\n{RULES}"),
    );
    let explicit = dir.path().join("explicit.log");

    oem_notify(&config)
        .arg("--log-file")
        .arg(&explicit)
        .arg("--dry-run")
        .assert()
        .success();

    assert!(fs::read_to_string(&explicit).unwrap().contains("rule matched"));
    assert!(!dir.path().join("configured.log").exists());
}

#[test]
fn configured_log_file_is_relative_to_config() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        &format!("{SMTP}[DEBUG]\nlog_file = configured.log\n{RULES}"),
    );

    oem_notify(&config).arg("--dry-run").assert().success();

    let log = fs::read_to_string(dir.path().join("configured.log")).unwrap();
    assert!(log.contains("rule matched"));
}

#[test]
fn rules_command_lists_table() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &format!("{SMTP}{RULES}"));

    oem_notify(&config)
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("Evaluation mode: all_match"))
        .stdout(predicate::str::contains("dba@example.com"))
        .stdout(predicate::str::contains("web@example.com"))
        .stdout(predicate::str::contains("Total: 2 rule(s), 2 active"));
}
