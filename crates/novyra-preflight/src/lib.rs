// crates/novyra-preflight/src/lib.rs
// ============================================================================
// Module: Novyra Preflight Library
// Description: Deployment precondition checks for the environment contract.
// Purpose: Reject unsafe deploys before they reach the hosting platform.
// Dependencies: novyra-config, reqwest, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The preflight evaluates a captured [`novyra_config::EnvSnapshot`] against
//! the deployment rules and returns a [`PreflightReport`] of every finding.
//! Platform caveats become rules: a local-file database engine on the
//! serverless target fails the deploy, and real-time messaging without a
//! long-lived process is surfaced as a warning.
//!
//! Security posture: diagnostics, audit events, and probe errors name
//! variables but never carry their values.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod diagnostic;
pub mod manifest;
pub mod options;
pub mod plan;
pub mod preflight;
pub mod probe;
pub mod rules;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditError;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::PreflightAuditEvent;
pub use audit::PreflightAuditSink;
pub use audit::StderrAuditSink;
pub use diagnostic::Diagnostic;
pub use diagnostic::Outcome;
pub use diagnostic::PreflightReport;
pub use diagnostic::Severity;
pub use diagnostic::SeverityCounts;
pub use manifest::MANIFEST_FILE;
pub use manifest::ManifestError;
pub use manifest::PlatformManifest;
pub use manifest::check_manifest;
pub use options::PreflightOptions;
pub use options::Target;
pub use plan::DeploymentPlan;
pub use plan::PlanStep;
pub use plan::StepStatus;
pub use plan::VariableRow;
pub use plan::VariableStatus;
pub use preflight::Preflight;
pub use probe::AssistantProbe;
pub use probe::AssistantProbeStatus;
pub use probe::ProbeError;
pub use probe::probe_tcp;
pub use rules::codes;
