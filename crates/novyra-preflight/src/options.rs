// crates/novyra-preflight/src/options.rs
// ============================================================================
// Module: Preflight Options
// Description: Deployment target and run options for the preflight.
// Purpose: Parameterise rule evaluation without touching the environment.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`PreflightOptions`] selects the deployment [`Target`], the deployed domain
//! used by the host check, the project directory holding the platform
//! manifest, and which network probes run. Probes are off by default.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// Default assistant probe timeout.
pub const DEFAULT_ASSISTANT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Default database probe timeout.
pub const DEFAULT_DATABASE_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Hosting model the deploy targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Serverless platform with ephemeral filesystem and on-demand processes.
    #[default]
    Serverless,
    /// Long-running server.
    Server,
}

impl Target {
    /// Returns the stable label used in output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Serverless => "serverless",
            Self::Server => "server",
        }
    }

    /// Returns true for the serverless target.
    #[must_use]
    pub const fn is_serverless(self) -> bool {
        matches!(self, Self::Serverless)
    }
}

/// Options for one preflight run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightOptions {
    /// Deployment target.
    pub target: Target,
    /// Deployed domain; falls back to `VERCEL_URL` when unset.
    pub domain: Option<String>,
    /// Project directory holding `vercel.json`; the manifest check is skipped when unset.
    pub project_dir: Option<PathBuf>,
    /// Treat warnings as failures.
    pub deny_warnings: bool,
    /// Verify the assistant key against the API.
    pub probe_assistant: bool,
    /// Open a TCP connection to the database.
    pub probe_database: bool,
    /// Timeout for the assistant probe.
    pub assistant_probe_timeout: Duration,
    /// Timeout for the database probe.
    pub database_probe_timeout: Duration,
}

impl Default for PreflightOptions {
    fn default() -> Self {
        Self {
            target: Target::Serverless,
            domain: None,
            project_dir: None,
            deny_warnings: false,
            probe_assistant: false,
            probe_database: false,
            assistant_probe_timeout: DEFAULT_ASSISTANT_PROBE_TIMEOUT,
            database_probe_timeout: DEFAULT_DATABASE_PROBE_TIMEOUT,
        }
    }
}
