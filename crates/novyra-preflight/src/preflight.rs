// crates/novyra-preflight/src/preflight.rs
// ============================================================================
// Module: Preflight Runner
// Description: Orchestrates rules, manifest checks, probes, and auditing.
// Purpose: Produce one report per deploy attempt from a captured snapshot.
// Dependencies: novyra-config
// ============================================================================

//! ## Overview
//! [`Preflight::run`] evaluates the static rules, then the manifest check when
//! a project directory is given, then any requested probes. Every stage
//! appends to the same diagnostic list; nothing short-circuits. The snapshot is
//! captured by the caller so the run never reads the live environment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use novyra_config::AssistantConfig;
use novyra_config::DatabaseConfig;
use novyra_config::EnvSnapshot;
use novyra_config::keys;

use crate::audit::NoopAuditSink;
use crate::audit::PreflightAuditEvent;
use crate::audit::PreflightAuditSink;
use crate::diagnostic::Diagnostic;
use crate::diagnostic::PreflightReport;
use crate::manifest::check_manifest;
use crate::options::PreflightOptions;
use crate::probe::AssistantProbe;
use crate::probe::AssistantProbeStatus;
use crate::probe::probe_tcp;
use crate::rules::RuleContext;
use crate::rules::codes;
use crate::rules::evaluate;

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Deployment preflight entry point.
pub struct Preflight;

impl Preflight {
    /// Runs the preflight without auditing.
    #[must_use]
    pub fn run(snapshot: &EnvSnapshot, options: &PreflightOptions) -> PreflightReport {
        Self::run_audited(snapshot, options, &NoopAuditSink)
    }

    /// Runs the preflight and records audit events to `audit`.
    #[must_use]
    pub fn run_audited(
        snapshot: &EnvSnapshot,
        options: &PreflightOptions,
        audit: &dyn PreflightAuditSink,
    ) -> PreflightReport {
        audit.record(&PreflightAuditEvent::started(options.target, snapshot.len()));

        let ctx = RuleContext::new(snapshot, options.target, options.domain.as_deref());
        let mut diagnostics = evaluate(&ctx);

        let manifest_present = options.project_dir.as_deref().map(|dir| {
            let (findings, present) = check_manifest(dir);
            diagnostics.extend(findings);
            present
        });

        if options.probe_assistant {
            diagnostics.extend(probe_assistant(snapshot, options));
        }
        if options.probe_database {
            diagnostics.extend(probe_database(snapshot, options));
        }

        for diagnostic in &diagnostics {
            audit.record(&PreflightAuditEvent::diagnostic(options.target, diagnostic));
        }
        let report = PreflightReport::new(
            options.target,
            ctx.domain,
            options.deny_warnings,
            manifest_present,
            diagnostics,
        );
        audit.record(&PreflightAuditEvent::completed(&report));
        report
    }
}

// ============================================================================
// SECTION: Probes
// ============================================================================

/// Verifies the assistant key when the integration resolves with a key.
///
/// Configuration problems are already reported by the static rules, so an
/// unresolvable configuration skips the probe silently.
fn probe_assistant(snapshot: &EnvSnapshot, options: &PreflightOptions) -> Option<Diagnostic> {
    let config = AssistantConfig::from_snapshot(snapshot).ok()?;
    let api_key = config.credentials().ok()?;
    let outcome = AssistantProbe::new(options.assistant_probe_timeout)
        .and_then(|probe| probe.check(&config.models_url(), api_key));
    match outcome {
        Ok(AssistantProbeStatus::Accepted(_)) => None,
        Ok(AssistantProbeStatus::Rejected(status)) => Some(Diagnostic::error(
            codes::PROBE_ASSISTANT_REJECTED,
            Some(keys::DEEPSEEK_API_KEY),
            format!("the assistant API rejected DEEPSEEK_API_KEY (HTTP {status})"),
        )),
        Ok(AssistantProbeStatus::Unexpected(status)) => Some(Diagnostic::warning(
            codes::PROBE_ASSISTANT_UNREACHABLE,
            Some(keys::DEEPSEEK_API_BASE),
            format!("the assistant API answered HTTP {status}; the key could not be confirmed"),
        )),
        Err(err) => Some(Diagnostic::warning(
            codes::PROBE_ASSISTANT_UNREACHABLE,
            Some(keys::DEEPSEEK_API_BASE),
            format!("the assistant API could not be reached: {err}"),
        )),
    }
}

/// Opens a TCP connection to a resolvable PostgreSQL host.
fn probe_database(snapshot: &EnvSnapshot, options: &PreflightOptions) -> Option<Diagnostic> {
    let DatabaseConfig::PostgreSql {
        host,
        port,
        ..
    } = DatabaseConfig::from_snapshot(snapshot).ok()?
    else {
        return None;
    };
    probe_tcp(&host, port, options.database_probe_timeout).err().map(|err| {
        Diagnostic::warning(
            codes::PROBE_DATABASE_UNREACHABLE,
            Some(keys::DB_HOST),
            format!("the database at DB_HOST did not accept a connection: {err}"),
        )
    })
}
