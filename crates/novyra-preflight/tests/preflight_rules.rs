//! Preflight scenario tests for novyra-preflight.
// crates/novyra-preflight/tests/preflight_rules.rs
// ============================================================================
// Module: Preflight Scenario Tests
// Description: End-to-end rule evaluation over realistic snapshots.
// Purpose: Pin deploy rejection, warning surfacing, and finding aggregation.
// Dependencies: novyra-config, novyra-preflight
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

mod common;

use novyra_config::AssistantConfig;
use novyra_config::ConfigError;
use novyra_config::keys;
use novyra_preflight::Diagnostic;
use novyra_preflight::Outcome;
use novyra_preflight::Preflight;
use novyra_preflight::PreflightOptions;
use novyra_preflight::Severity;
use novyra_preflight::Target;
use novyra_preflight::codes;

use crate::common::codes_of;
use crate::common::options_for;
use crate::common::snapshot_with;

type TestResult = Result<(), String>;

#[test]
fn clean_server_deploy_has_no_findings() -> TestResult {
    let report = Preflight::run(&snapshot_with(&[]), &options_for(Target::Server));
    if !report.diagnostics().is_empty() {
        return Err(format!("unexpected findings: {:?}", codes_of(report.diagnostics())));
    }
    if report.outcome() != Outcome::Pass {
        return Err("clean deploy should pass".to_string());
    }
    Ok(())
}

#[test]
fn clean_serverless_deploy_passes_with_platform_caveats() -> TestResult {
    let report = Preflight::run(&snapshot_with(&[]), &options_for(Target::Serverless));
    let found = codes_of(report.diagnostics());
    if found != vec![codes::HOSTS_WILDCARD, codes::REALTIME_IN_MEMORY_LAYER] {
        return Err(format!("unexpected findings: {found:?}"));
    }
    if !report.passed() {
        return Err("warnings alone should not fail the deploy".to_string());
    }
    let strict = PreflightOptions {
        deny_warnings: true,
        ..options_for(Target::Serverless)
    };
    if Preflight::run(&snapshot_with(&[]), &strict).passed() {
        return Err("denied warnings should fail the deploy".to_string());
    }
    Ok(())
}

#[test]
fn sqlite_engine_fails_fast_with_clear_message() -> TestResult {
    let report = Preflight::run(
        &snapshot_with(&[(keys::DB_ENGINE, "sqlite")]),
        &options_for(Target::Serverless),
    );
    if report.passed() {
        return Err("sqlite on the serverless target must fail".to_string());
    }
    let finding = report
        .diagnostics()
        .iter()
        .find(|diagnostic| diagnostic.code == codes::DB_ENGINE_UNSUPPORTED)
        .ok_or("missing db.engine_unsupported")?;
    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(finding.key, Some(keys::DB_ENGINE));
    assert!(finding.message.contains("DB_ENGINE=postgresql"));
    Ok(())
}

#[test]
fn unknown_engine_is_rejected() {
    let report =
        Preflight::run(&snapshot_with(&[(keys::DB_ENGINE, "mysql")]), &options_for(Target::Server));
    assert!(report.has_code(codes::DB_ENGINE_INVALID));
    assert!(!report.passed());
}

#[test]
fn debug_true_surfaces_a_warning() -> TestResult {
    let report =
        Preflight::run(&snapshot_with(&[(keys::DEBUG, "True")]), &options_for(Target::Server));
    let debug = report
        .with_severity(Severity::Warning)
        .find(|diagnostic| diagnostic.code == codes::DEBUG_ENABLED);
    if debug.is_none() {
        return Err("DEBUG=True should surface debug.enabled".to_string());
    }
    if !report.passed() {
        return Err("debug alone is a warning, not a failure".to_string());
    }
    Ok(())
}

#[test]
fn allowed_hosts_must_admit_the_deployed_domain() {
    let snapshot = snapshot_with(&[(keys::ALLOWED_HOSTS, "novyra.agency")]);
    let report = Preflight::run(&snapshot, &options_for(Target::Server));
    assert!(report.has_code(codes::HOSTS_DOMAIN_MISSING));
    assert!(!report.passed());
    assert_eq!(report.domain(), Some("novyra.vercel.app"));
}

#[test]
fn missing_assistant_key_is_reported_and_fails_at_first_use() {
    let snapshot = snapshot_with(&[(keys::DEEPSEEK_API_KEY, "")]);
    let report = Preflight::run(&snapshot, &options_for(Target::Server));
    assert!(report.has_code(codes::ASSISTANT_KEY_MISSING));

    let assistant = AssistantConfig::from_snapshot(&snapshot).unwrap();
    assert_eq!(assistant.credentials().unwrap_err(), ConfigError::AssistantKeyMissing);
}

#[test]
fn disabled_assistant_needs_no_key() {
    let snapshot = snapshot_with(&[(keys::DEEPSEEK_API_KEY, ""), (keys::USE_DEEPSEEK_AI, "False")]);
    let report = Preflight::run(&snapshot, &options_for(Target::Server));
    assert_eq!(codes_of(report.diagnostics()), vec![codes::ASSISTANT_DISABLED]);
    assert!(report.passed());
}

#[test]
fn independent_problems_each_yield_a_diagnostic() -> TestResult {
    let snapshot = snapshot_with(&[
        (keys::SECRET_KEY, ""),
        (keys::DB_HOST, ""),
        (keys::DEEPSEEK_API_KEY, ""),
        (keys::CORS_ALLOWED_ORIGINS, "https://novyra.agency/app"),
        (keys::EMAIL_PORT, "smtp"),
        (keys::FRONTEND_URL, "novyra.agency"),
    ]);
    let report = Preflight::run(&snapshot, &options_for(Target::Server));
    let expected = vec![
        codes::SECRET_KEY_MISSING,
        codes::DB_PARAM_MISSING,
        codes::CORS_ORIGIN_INVALID,
        codes::ASSISTANT_KEY_MISSING,
        codes::EMAIL_PORT_INVALID,
        codes::FRONTEND_URL_INVALID,
    ];
    let found = codes_of(report.diagnostics());
    if found != expected {
        return Err(format!("expected {expected:?}, found {found:?}"));
    }
    assert_eq!(report.counts().errors, 5);
    assert_eq!(report.counts().warnings, 1);
    Ok(())
}

#[test]
fn loopback_database_host_warns_on_serverless() {
    let snapshot = snapshot_with(&[(keys::DB_HOST, "localhost")]);
    let serverless = Preflight::run(&snapshot, &options_for(Target::Serverless));
    assert!(serverless.has_code(codes::DB_HOST_LOOPBACK));
    let server = Preflight::run(&snapshot, &options_for(Target::Server));
    assert!(!server.has_code(codes::DB_HOST_LOOPBACK));
}

#[test]
fn redis_on_serverless_is_flagged() {
    let snapshot = snapshot_with(&[(keys::REDIS_URL, "redis://cache.internal:6379")]);
    let report = Preflight::run(&snapshot, &options_for(Target::Serverless));
    let finding = report
        .diagnostics()
        .iter()
        .find(|diagnostic| diagnostic.code == codes::REALTIME_SERVERLESS_UNSUPPORTED)
        .unwrap();
    assert_eq!(finding.severity, Severity::Warning);
    assert!(finding.message.contains("WebSocket"));
}

#[test]
fn console_mail_backend_warns_in_production() {
    let snapshot = snapshot_with(&[(keys::EMAIL_BACKEND, "")]);
    let report = Preflight::run(&snapshot, &options_for(Target::Server));
    assert_eq!(codes_of(report.diagnostics()), vec![codes::EMAIL_CONSOLE_BACKEND]);
}

/// Runs the clean server deploy with `overrides` and returns its only finding.
fn only_finding(overrides: &[(&'static str, &str)]) -> Diagnostic {
    let report = Preflight::run(&snapshot_with(overrides), &options_for(Target::Server));
    let [finding] = report.diagnostics() else {
        panic!("expected one finding, got {:?}", codes_of(report.diagnostics()));
    };
    finding.clone()
}

#[test]
fn out_of_range_database_port_is_rejected() {
    let finding = only_finding(&[(keys::DB_PORT, "70000")]);
    assert_eq!(finding.code, codes::DB_PORT_INVALID);
    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(finding.key, Some(keys::DB_PORT));
}

#[test]
fn unreadable_assistant_flag_is_rejected() {
    let finding = only_finding(&[(keys::USE_DEEPSEEK_AI, "sometimes")]);
    assert_eq!(finding.code, codes::ASSISTANT_FLAG_INVALID);
    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(finding.key, Some(keys::USE_DEEPSEEK_AI));
}

#[test]
fn confidence_threshold_above_one_is_rejected() {
    let finding = only_finding(&[(keys::AI_CONFIDENCE_THRESHOLD, "1.5")]);
    assert_eq!(finding.code, codes::ASSISTANT_THRESHOLD_INVALID);
    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(finding.key, Some(keys::AI_CONFIDENCE_THRESHOLD));
}

#[test]
fn unreadable_tls_flag_is_rejected() {
    let finding = only_finding(&[(keys::EMAIL_USE_TLS, "maybe")]);
    assert_eq!(finding.code, codes::EMAIL_TLS_INVALID);
    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(finding.key, Some(keys::EMAIL_USE_TLS));
}

#[test]
fn malformed_sender_address_is_rejected() {
    let finding = only_finding(&[(keys::DEFAULT_FROM_EMAIL, "not-an-address")]);
    assert_eq!(finding.code, codes::EMAIL_ADDRESS_INVALID);
    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(finding.key, Some(keys::DEFAULT_FROM_EMAIL));
}

#[test]
fn smtp_without_password_warns() {
    let finding = only_finding(&[(keys::EMAIL_HOST_PASSWORD, "")]);
    assert_eq!(finding.code, codes::EMAIL_SMTP_CREDENTIALS);
    assert_eq!(finding.severity, Severity::Warning);
}

#[test]
fn loopback_frontend_warns_in_production() {
    let finding = only_finding(&[(keys::FRONTEND_URL, "http://localhost:3000")]);
    assert_eq!(finding.code, codes::FRONTEND_LOOPBACK);
    assert_eq!(finding.severity, Severity::Warning);
    assert_eq!(finding.key, Some(keys::FRONTEND_URL));
}

#[test]
fn schemeless_embed_base_is_rejected() {
    let finding = only_finding(&[(keys::EMBED_BASE_URL, "widget.novyra.agency")]);
    assert_eq!(finding.code, codes::EMBED_BASE_INVALID);
    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(finding.key, Some(keys::EMBED_BASE_URL));
}

#[test]
fn missing_embed_base_is_noted_in_production() {
    let finding = only_finding(&[(keys::EMBED_BASE_URL, "")]);
    assert_eq!(finding.code, codes::EMBED_BASE_MISSING);
    assert_eq!(finding.severity, Severity::Info);
}

#[test]
fn report_serializes_with_stable_labels() {
    let report = Preflight::run(
        &snapshot_with(&[(keys::DB_ENGINE, "sqlite")]),
        &options_for(Target::Serverless),
    );
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["outcome"], "fail");
    assert_eq!(json["target"], "serverless");
    assert_eq!(json["diagnostics"][0]["code"], "db.engine_unsupported");
    assert_eq!(json["diagnostics"][0]["severity"], "error");
}
