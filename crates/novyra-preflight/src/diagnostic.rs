// crates/novyra-preflight/src/diagnostic.rs
// ============================================================================
// Module: Preflight Diagnostics
// Description: Diagnostic records, severities, and the aggregated report.
// Purpose: Give rules one output shape and derive pass/fail from it.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every rule emits [`Diagnostic`] records. A [`PreflightReport`] keeps them in
//! rule order and derives the [`Outcome`]: any `Error` fails the deploy, and
//! with `deny_warnings` so does any `Warning`.
//!
//! Security posture: messages name variables but never carry secret values.

use serde::Serialize;

use crate::options::Target;

// ============================================================================
// SECTION: Severity
// ============================================================================

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational finding.
    Info,
    /// Surfaced but does not block unless warnings are denied.
    Warning,
    /// Blocks the deploy.
    Error,
}

impl Severity {
    /// Returns the stable label used in output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

// ============================================================================
// SECTION: Diagnostic
// ============================================================================

/// One finding produced by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Stable dotted rule code (for example `db.engine_unsupported`).
    pub code: &'static str,
    /// Severity of the finding.
    pub severity: Severity,
    /// Contract variable the finding is about, when there is one.
    pub key: Option<&'static str>,
    /// Human-readable explanation.
    pub message: String,
}

impl Diagnostic {
    /// Creates an error diagnostic.
    #[must_use]
    pub fn error(
        code: &'static str,
        key: Option<&'static str>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(code, Severity::Error, key, message)
    }

    /// Creates a warning diagnostic.
    #[must_use]
    pub fn warning(
        code: &'static str,
        key: Option<&'static str>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(code, Severity::Warning, key, message)
    }

    /// Creates an informational diagnostic.
    #[must_use]
    pub fn info(code: &'static str, key: Option<&'static str>, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Info, key, message)
    }

    /// Creates a diagnostic with an explicit severity.
    #[must_use]
    pub fn new(
        code: &'static str,
        severity: Severity,
        key: Option<&'static str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            severity,
            key,
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Overall preflight result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Deploy may proceed.
    Pass,
    /// Deploy is blocked.
    Fail,
}

impl Outcome {
    /// Returns the stable label used in output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

/// Diagnostic counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    /// Number of errors.
    pub errors: usize,
    /// Number of warnings.
    pub warnings: usize,
    /// Number of informational findings.
    pub infos: usize,
}

/// Aggregated preflight result.
///
/// # Invariants
/// - Diagnostics are kept in rule order.
/// - `outcome` is `Fail` iff an error exists, or a warning exists while
///   `deny_warnings` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreflightReport {
    /// Derived outcome.
    outcome: Outcome,
    /// Target the rules were evaluated for.
    target: Target,
    /// Deployed domain the host check used, when known.
    domain: Option<String>,
    /// Whether warnings were treated as failures.
    deny_warnings: bool,
    /// Whether a platform manifest was found; `None` when not checked.
    manifest_present: Option<bool>,
    /// Counts by severity.
    counts: SeverityCounts,
    /// Findings in rule order.
    diagnostics: Vec<Diagnostic>,
}

impl PreflightReport {
    /// Builds a report and derives its outcome.
    #[must_use]
    pub fn new(
        target: Target,
        domain: Option<String>,
        deny_warnings: bool,
        manifest_present: Option<bool>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        let mut counts = SeverityCounts::default();
        for diagnostic in &diagnostics {
            match diagnostic.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                Severity::Info => counts.infos += 1,
            }
        }
        let failed = counts.errors > 0 || (deny_warnings && counts.warnings > 0);
        Self {
            outcome: if failed { Outcome::Fail } else { Outcome::Pass },
            target,
            domain,
            deny_warnings,
            manifest_present,
            counts,
            diagnostics,
        }
    }

    /// Returns the derived outcome.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Returns true when the deploy may proceed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Pass
    }

    /// Returns the evaluated target.
    #[must_use]
    pub const fn target(&self) -> Target {
        self.target
    }

    /// Returns the domain used for the host check.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Returns whether a platform manifest was found.
    #[must_use]
    pub const fn manifest_present(&self) -> Option<bool> {
        self.manifest_present
    }

    /// Returns counts by severity.
    #[must_use]
    pub const fn counts(&self) -> SeverityCounts {
        self.counts
    }

    /// Returns findings in rule order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns the findings of a given severity.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |diagnostic| diagnostic.severity == severity)
    }

    /// Returns true when a finding with `code` is present.
    #[must_use]
    pub fn has_code(&self, code: &str) -> bool {
        self.diagnostics.iter().any(|diagnostic| diagnostic.code == code)
    }
}
