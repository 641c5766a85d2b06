// crates/novyra-preflight/src/audit.rs
// ============================================================================
// Module: Preflight Audit Logging
// Description: Structured audit events for preflight runs.
// Purpose: Emit redacted JSON-line records without a logging framework.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Each preflight run emits `preflight_started`, one `preflight_diagnostic`
//! per finding, and `preflight_completed`. Sinks write one JSON object per
//! line so deployments can route events to any log pipeline.
//!
//! Security posture: events carry variable names, codes, and counts only;
//! values and messages are never logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use thiserror::Error;

use crate::diagnostic::Diagnostic;
use crate::diagnostic::Outcome;
use crate::diagnostic::PreflightReport;
use crate::diagnostic::Severity;
use crate::options::Target;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when opening an audit sink.
#[derive(Debug, Error)]
pub enum AuditError {
    /// IO failure while opening the audit log.
    #[error("audit log io error: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: Events
// ============================================================================

/// Preflight audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreflightAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Deployment target.
    pub target: Target,
    /// Diagnostic code, for diagnostic events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    /// Diagnostic severity, for diagnostic events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Variable name the event concerns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<&'static str>,
    /// Number of captured variables, for start events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured: Option<usize>,
    /// Run outcome, for completion events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    /// Error count, for completion events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<usize>,
    /// Warning count, for completion events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<usize>,
}

impl PreflightAuditEvent {
    /// Creates a run-start event.
    #[must_use]
    pub fn started(target: Target, captured: usize) -> Self {
        Self {
            captured: Some(captured),
            ..Self::base("preflight_started", target)
        }
    }

    /// Creates a diagnostic event (code, severity, and key only).
    #[must_use]
    pub fn diagnostic(target: Target, diagnostic: &Diagnostic) -> Self {
        Self {
            code: Some(diagnostic.code),
            severity: Some(diagnostic.severity),
            key: diagnostic.key,
            ..Self::base("preflight_diagnostic", target)
        }
    }

    /// Creates a run-completion event.
    #[must_use]
    pub fn completed(report: &PreflightReport) -> Self {
        let counts = report.counts();
        Self {
            outcome: Some(report.outcome()),
            errors: Some(counts.errors),
            warnings: Some(counts.warnings),
            ..Self::base("preflight_completed", report.target())
        }
    }

    /// Creates an event with a consistent timestamp and no optional fields.
    fn base(event: &'static str, target: Target) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            timestamp_ms,
            target,
            code: None,
            severity: None,
            key: None,
            captured: None,
            outcome: None,
            errors: None,
            warnings: None,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for preflight events.
pub trait PreflightAuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, event: &PreflightAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl PreflightAuditSink for StderrAuditSink {
    fn record(&self, event: &PreflightAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Io`] if the file cannot be opened.
    pub fn new(path: &Path) -> Result<Self, AuditError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| AuditError::Io(err.to_string()))?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl PreflightAuditSink for FileAuditSink {
    fn record(&self, event: &PreflightAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl PreflightAuditSink for NoopAuditSink {
    fn record(&self, _event: &PreflightAuditEvent) {}
}
