// crates/novyra-config/src/docs.rs
// ============================================================================
// Module: Contract Docs Generator
// Description: Markdown generator for the environment contract reference.
// Purpose: Keep operator docs in sync with the contract catalog.
// Dependencies: thiserror, std
// ============================================================================

//! ## Overview
//! Generates `docs/environment.md` from [`ENV_CONTRACT`]. Output is
//! deterministic so CI can verify the committed file has not drifted.
//!
//! Security posture: docs list variable names and defaults only; secret
//! variables never carry a default.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::contract::ENV_CONTRACT;
use crate::contract::EnvVarSpec;
use crate::contract::Requirement;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default output path for generated contract docs.
pub const DOCS_PATH: &str = "docs/environment.md";
/// Number of leading catalog entries that form the core contract.
pub const CORE_CONTRACT_LEN: usize = 11;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when generating or verifying contract docs.
#[derive(Debug, Error)]
pub enum DocsError {
    /// IO failure while reading or writing docs.
    #[error("docs io error: {0}")]
    Io(String),
    /// Generated docs do not match the committed file.
    #[error("docs drift: {0}")]
    Drift(String),
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Generates the contract markdown documentation.
#[must_use]
pub fn contract_docs_markdown() -> String {
    let mut out = String::new();

    out.push_str("<!--\n");
    out.push_str("docs/environment.md\n");
    out.push_str("============================================================================\n");
    out.push_str("Document: Novyra Environment Contract\n");
    out.push_str("Description: Reference for every environment variable the assistant reads.\n");
    out.push_str("Purpose: Tell operators what to set in the platform dashboard.\n");
    out.push_str("Generated: This file is auto-generated; do not edit manually.\n");
    out.push_str("============================================================================\n");
    out.push_str("-->\n\n");

    out.push_str("# Environment Contract\n\n");
    out.push_str("## Overview\n\n");
    out.push_str("Values are set once in the hosting platform's secret store, read once at\n");
    out.push_str("process start, and never changed at runtime. Locally a `.env` file in the\n");
    out.push_str("project directory is read; the process environment always wins over it.\n\n");

    let sections: [(&str, fn(&EnvVarSpec) -> bool); 3] = [
        ("Core Variables", is_core),
        ("Supplemental Variables", |spec: &EnvVarSpec| {
            !is_core(spec) && spec.requirement != Requirement::PlatformInjected
        }),
        ("Platform-Injected Variables", |spec: &EnvVarSpec| {
            spec.requirement == Requirement::PlatformInjected
        }),
    ];
    for (heading, include) in sections {
        let _ = writeln!(out, "## {heading}\n");
        out.push_str(&render_table(ENV_CONTRACT.iter().filter(|spec| include(spec))));
        out.push('\n');
    }

    out.push_str("## Deployment\n\n");
    out.push_str("1. Link the repository to the hosting platform.\n");
    out.push_str("2. Set the variables above in the platform dashboard.\n");
    out.push_str("3. Trigger a deploy.\n\n");
    out.push_str("Run `novyra-deploy check` before step 3.\n\n");

    out.push_str("## Platform Caveats\n\n");
    out.push_str("- `DB_ENGINE=sqlite` does not work on the serverless platform: the filesystem\n");
    out.push_str("  is ephemeral. Use `postgresql`.\n");
    out.push_str("- Real-time messaging over WebSockets may fail under the serverless\n");
    out.push_str("  execution model. The channel layer falls back to in-memory there.\n");

    out
}

/// Writes the generated docs to `path` or the standard location.
///
/// # Errors
///
/// Returns [`DocsError::Io`] when file output fails.
pub fn write_contract_docs(path: Option<&Path>) -> Result<(), DocsError> {
    let path = path.unwrap_or_else(|| Path::new(DOCS_PATH));
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| DocsError::Io(err.to_string()))?;
    }
    fs::write(path, contract_docs_markdown().as_bytes())
        .map_err(|err| DocsError::Io(err.to_string()))
}

/// Verifies the on-disk docs match the generated output.
///
/// # Errors
///
/// Returns [`DocsError::Drift`] when the docs differ.
pub fn verify_contract_docs(path: Option<&Path>) -> Result<(), DocsError> {
    let path = path.unwrap_or_else(|| Path::new(DOCS_PATH));
    let existing = fs::read_to_string(path).map_err(|err| DocsError::Io(err.to_string()))?;
    if existing != contract_docs_markdown() {
        return Err(DocsError::Drift(format!("docs mismatch: {}", path.display())));
    }
    Ok(())
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Returns true for the core contract entries that lead the catalog.
fn is_core(spec: &EnvVarSpec) -> bool {
    ENV_CONTRACT.iter().take(CORE_CONTRACT_LEN).any(|core| core.name == spec.name)
}

/// Renders a markdown table for `specs`.
fn render_table<'a>(specs: impl Iterator<Item = &'a EnvVarSpec>) -> String {
    let mut out = String::new();
    out.push_str("| Variable | Type | Requirement | Default | Secret | Description |\n");
    out.push_str("|---|---|---|---|---|---|\n");
    for spec in specs {
        let default = spec.default.map_or_else(|| "-".to_string(), |value| format!("`{value}`"));
        let secret = if spec.secret { "yes" } else { "no" };
        let _ = writeln!(
            out,
            "| `{}` | {} | {} | {} | {} | {} |",
            spec.name,
            spec.kind.label(),
            spec.requirement.label(),
            escape_table_cell(&default),
            secret,
            escape_table_cell(spec.description),
        );
    }
    out
}

/// Escapes pipe characters for markdown table cells.
fn escape_table_cell(value: &str) -> String {
    value.replace('|', "\\|")
}
