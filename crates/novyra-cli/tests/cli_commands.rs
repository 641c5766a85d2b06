//! End-to-end tests for the `novyra-deploy` binary.
// crates/novyra-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Runs the binary against scratch projects and dotenv files.
// Purpose: Pin exit codes, layering, redaction, and artifact generation.
// Dependencies: novyra-cli binary, novyra-config, serde_json, tempfile
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::process::Command;
use std::process::Output;

use novyra_config::contract_docs_markdown;
use serde_json::Value;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Signing key that passes every strength heuristic.
const STRONG_SECRET_KEY: &str = "q8#Lm2!vZx9@Rt4$Wp7^Ny1&Ks6*Hd3(Jf5)Gb0-Cu8=Ea2+Yo7";

/// Runs the binary in `dir` with a cleared environment plus `env`.
fn run_in(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_novyra-deploy"));
    command.current_dir(dir).env_clear().args(args);
    for (key, value) in env {
        command.env(key, value);
    }
    command.output().expect("spawn novyra-deploy")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Writes a deployable `.env` for the server target into `dir`.
fn write_clean_dotenv(dir: &Path) {
    let dotenv = format!(
        "SECRET_KEY='{STRONG_SECRET_KEY}'\nDEBUG=False\nALLOWED_HOSTS=novyra.vercel.app\n\
         DB_ENGINE=postgresql\nDB_NAME=novyra\nDB_USER=novyra_app\nDB_PASSWORD=pg-password\n\
         DB_HOST=db.example.net\nDEEPSEEK_API_KEY=sk-test-key\n\
         CORS_ALLOWED_ORIGINS=https://novyra.agency\n\
         EMAIL_BACKEND=django.core.mail.backends.smtp.EmailBackend\n\
         EMAIL_HOST_USER=mailer@novyra.agency\nEMAIL_HOST_PASSWORD=smtp-password\n\
         FRONTEND_URL=https://novyra.agency\nEMBED_BASE_URL=https://novyra.agency\n"
    );
    fs::write(dir.join(".env"), dotenv).unwrap();
}

fn scratch() -> TempDir {
    tempfile::tempdir().unwrap()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn version_flag_prints_package_version() {
    let dir = scratch();
    let output = run_in(dir.path(), &["--version"], &[]);
    assert!(output.status.success());
    assert_eq!(stdout_of(&output).trim(), format!("novyra-deploy {}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn check_passes_for_a_clean_server_deploy() {
    let dir = scratch();
    write_clean_dotenv(dir.path());
    let output =
        run_in(dir.path(), &["check", "--target", "server", "--domain", "novyra.vercel.app"], &[]);
    let stdout = stdout_of(&output);
    assert!(output.status.success(), "stdout: {stdout}");
    assert!(stdout.starts_with("Preflight PASS"));
    assert!(stdout.contains("No findings."));
}

#[test]
fn check_rejects_sqlite_on_serverless() {
    let dir = scratch();
    write_clean_dotenv(dir.path());
    let output = run_in(
        dir.path(),
        &["check", "--format", "json"],
        &[("DB_ENGINE", "sqlite"), ("VERCEL_URL", "novyra.vercel.app")],
    );
    assert_eq!(output.status.code(), Some(1));
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcome"], "fail");
    assert_eq!(report["domain"], "novyra.vercel.app");
    let codes: Vec<_> =
        report["diagnostics"].as_array().unwrap().iter().map(|d| d["code"].clone()).collect();
    assert!(codes.contains(&Value::from("db.engine_unsupported")));
}

#[test]
fn deny_warnings_fails_on_debug() {
    let dir = scratch();
    write_clean_dotenv(dir.path());
    let args = ["check", "--target", "server", "--domain", "novyra.vercel.app", "--deny-warnings"];
    let output = run_in(dir.path(), &args, &[("DEBUG", "True")]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_of(&output).contains("debug.enabled"));
}

#[test]
fn audit_log_is_written_next_to_the_report() {
    let dir = scratch();
    write_clean_dotenv(dir.path());
    let output = run_in(dir.path(), &["check", "--audit-log", "audit.jsonl"], &[]);
    assert!(output.status.success());
    let audit = fs::read_to_string(dir.path().join("audit.jsonl")).unwrap();
    let first: Value = serde_json::from_str(audit.lines().next().unwrap()).unwrap();
    assert_eq!(first["event"], "preflight_started");
    assert!(!audit.contains("pg-password"));
}

#[test]
fn env_show_redacts_and_prefers_process_values() {
    let dir = scratch();
    write_clean_dotenv(dir.path());
    let output = run_in(
        dir.path(),
        &["env", "show", "--format", "json"],
        &[("DB_HOST", "db.override.net")],
    );
    assert!(output.status.success());
    let shown: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["DB_HOST"], "db.override.net");
    assert_eq!(shown["DB_PASSWORD"], "********");
    assert_eq!(shown["SECRET_KEY"], "********");
    assert!(!stdout_of(&output).contains("sk-test-key"));
}

#[test]
fn env_show_reveal_prints_secrets() {
    let dir = scratch();
    write_clean_dotenv(dir.path());
    let output = run_in(dir.path(), &["env", "show", "--reveal"], &[]);
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("sk-test-key"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("clear text"));
}

#[test]
fn explicit_missing_env_file_is_an_error() {
    let dir = scratch();
    let output = run_in(dir.path(), &["env", "show", "--env-file", "nope.env"], &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load environment"));
}

#[test]
fn env_docs_write_then_verify() {
    let dir = scratch();
    let output = run_in(dir.path(), &["env", "docs", "--output", "docs/environment.md"], &[]);
    assert!(output.status.success());
    let written = fs::read_to_string(dir.path().join("docs/environment.md")).unwrap();
    assert_eq!(written, contract_docs_markdown());

    let output = run_in(dir.path(), &["env", "docs", "--verify", "docs/environment.md"], &[]);
    assert!(output.status.success());

    fs::write(dir.path().join("docs/environment.md"), "stale").unwrap();
    let output = run_in(dir.path(), &["env", "docs", "--verify", "docs/environment.md"], &[]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn env_example_lists_every_core_variable() {
    let dir = scratch();
    let output = run_in(dir.path(), &["env", "example"], &[]);
    assert!(output.status.success());
    let example = stdout_of(&output);
    for name in ["SECRET_KEY=", "DEBUG=", "DB_ENGINE=", "DB_PORT=", "CORS_ALLOWED_ORIGINS="] {
        assert!(example.contains(name), "missing {name}");
    }
}

#[test]
fn hosts_check_exit_code_follows_the_verdict() {
    let dir = scratch();
    let env = [("ALLOWED_HOSTS", ".novyra.agency")];
    let output = run_in(dir.path(), &["hosts", "check", "chat.novyra.agency:443"], &env);
    assert!(output.status.success());
    let output = run_in(dir.path(), &["hosts", "check", "novyra.vercel.app"], &env);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_of(&output).contains("rejected"));
}

#[test]
fn plan_reports_link_step_and_missing_variables() {
    let dir = scratch();
    let output = run_in(dir.path(), &["plan", "--format", "json"], &[("DB_ENGINE", "postgresql")]);
    assert_eq!(output.status.code(), Some(1));
    let plan: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["steps"][0]["status"], "pending");
    assert_eq!(plan["steps"][2]["status"], "blocked");
    let missing: Vec<_> = plan["variables"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|row| row["status"] == "missing")
        .map(|row| row["name"].as_str().unwrap().to_string())
        .collect();
    assert!(missing.contains(&"SECRET_KEY".to_string()));
    assert!(missing.contains(&"DB_HOST".to_string()));
}

#[test]
fn catalan_output_carries_disclaimer() {
    let dir = scratch();
    let output = run_in(dir.path(), &["--lang", "ca", "plan"], &[]);
    assert!(stdout_of(&output).starts_with("Pla de desplegament"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("traduïda automàticament"));
}

#[test]
fn invalid_lang_environment_fails() {
    let dir = scratch();
    let output = run_in(dir.path(), &["plan"], &[("NOVYRA_DEPLOY_LANG", "xx")]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("NOVYRA_DEPLOY_LANG"));
}

#[test]
fn usage_errors_exit_with_failure() {
    let dir = scratch();
    let output = run_in(dir.path(), &["check", "--target", "mainframe"], &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("mainframe"));
    let output = run_in(dir.path(), &["env", "docs", "--output", "a.md", "--verify", "b.md"], &[]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn help_request_succeeds() {
    let dir = scratch();
    let output = run_in(dir.path(), &["check", "--help"], &[]);
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("--deny-warnings"));
}
