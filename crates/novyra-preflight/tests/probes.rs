//! Network probe tests for novyra-preflight.
// crates/novyra-preflight/tests/probes.rs
// ============================================================================
// Module: Probe Tests
// Description: Assistant and database probes against local fake services.
// Purpose: Pin status classification, bearer auth, and redirect refusal.
// Dependencies: novyra-config, novyra-preflight, tiny_http
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

use std::net::TcpListener;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use novyra_config::keys;
use novyra_preflight::Preflight;
use novyra_preflight::PreflightOptions;
use novyra_preflight::Severity;
use novyra_preflight::Target;
use novyra_preflight::codes;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

use crate::common::snapshot_with;

/// Serves one request with `status`, returning the request path and auth header.
fn serve_once(status: u16) -> (String, JoinHandle<(String, Option<String>)>) {
    serve_once_with(status, None)
}

/// Serves one request with `status` and an optional `Location` header.
fn serve_once_with(
    status: u16,
    location: Option<&'static str>,
) -> (String, JoinHandle<(String, Option<String>)>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let handle = thread::spawn(move || {
        let request = server.recv().unwrap();
        let path = request.url().to_string();
        let auth = request
            .headers()
            .iter()
            .find(|header| header.field.equiv("Authorization"))
            .map(|header| header.value.to_string());
        let mut response = Response::empty(status);
        if let Some(location) = location {
            response.add_header(Header::from_bytes("Location", location).unwrap());
        }
        let _ = request.respond(response);
        (path, auth)
    });
    (format!("http://{addr}"), handle)
}

fn assistant_options() -> PreflightOptions {
    PreflightOptions {
        target: Target::Server,
        domain: Some(common::DEPLOYED_DOMAIN.to_string()),
        probe_assistant: true,
        assistant_probe_timeout: Duration::from_secs(2),
        ..PreflightOptions::default()
    }
}

#[test]
fn accepted_key_adds_no_diagnostic() {
    let (base, handle) = serve_once(200);
    let snapshot = snapshot_with(&[(keys::DEEPSEEK_API_BASE, base.as_str())]);
    let report = Preflight::run(&snapshot, &assistant_options());
    let (path, auth) = handle.join().unwrap();
    assert_eq!(path, "/models");
    assert_eq!(auth.as_deref(), Some("Bearer sk-test-key"));
    assert!(report.diagnostics().is_empty());
}

#[test]
fn rejected_key_is_an_error() {
    let (base, handle) = serve_once(401);
    let snapshot = snapshot_with(&[(keys::DEEPSEEK_API_BASE, base.as_str())]);
    let report = Preflight::run(&snapshot, &assistant_options());
    handle.join().unwrap();
    let finding = report
        .diagnostics()
        .iter()
        .find(|diagnostic| diagnostic.code == codes::PROBE_ASSISTANT_REJECTED)
        .unwrap();
    assert_eq!(finding.severity, Severity::Error);
    assert!(!finding.message.contains("sk-test-key"));
    assert!(!report.passed());
}

#[test]
fn server_errors_are_warnings() {
    let (base, handle) = serve_once(503);
    let snapshot = snapshot_with(&[(keys::DEEPSEEK_API_BASE, base.as_str())]);
    let report = Preflight::run(&snapshot, &assistant_options());
    handle.join().unwrap();
    assert!(report.has_code(codes::PROBE_ASSISTANT_UNREACHABLE));
    assert!(report.passed());
}

#[test]
fn redirects_are_not_followed() {
    let (base, handle) = serve_once_with(302, Some("http://127.0.0.1:9/models"));
    let snapshot = snapshot_with(&[(keys::DEEPSEEK_API_BASE, base.as_str())]);
    let report = Preflight::run(&snapshot, &assistant_options());
    handle.join().unwrap();
    assert!(report.has_code(codes::PROBE_ASSISTANT_UNREACHABLE));
}

#[test]
fn missing_key_skips_the_probe() {
    let snapshot = snapshot_with(&[
        (keys::DEEPSEEK_API_KEY, ""),
        (keys::DEEPSEEK_API_BASE, "http://127.0.0.1:9"),
    ]);
    let report = Preflight::run(&snapshot, &assistant_options());
    assert!(report.has_code(codes::ASSISTANT_KEY_MISSING));
    assert!(!report.has_code(codes::PROBE_ASSISTANT_UNREACHABLE));
}

#[test]
fn database_probe_reports_closed_ports() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let port = port.to_string();
    let snapshot = snapshot_with(&[(keys::DB_HOST, "127.0.0.1"), (keys::DB_PORT, port.as_str())]);
    let options = PreflightOptions {
        probe_database: true,
        database_probe_timeout: Duration::from_millis(500),
        ..common::options_for(Target::Server)
    };
    let report = Preflight::run(&snapshot, &options);
    assert!(report.has_code(codes::PROBE_DATABASE_UNREACHABLE));
}

#[test]
fn database_probe_accepts_open_ports() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port().to_string();
    let snapshot = snapshot_with(&[(keys::DB_HOST, "127.0.0.1"), (keys::DB_PORT, port.as_str())]);
    let options = PreflightOptions {
        probe_database: true,
        ..common::options_for(Target::Server)
    };
    let report = Preflight::run(&snapshot, &options);
    assert!(!report.has_code(codes::PROBE_DATABASE_UNREACHABLE));
}
