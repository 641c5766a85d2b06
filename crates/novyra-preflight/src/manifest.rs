// crates/novyra-preflight/src/manifest.rs
// ============================================================================
// Module: Platform Manifest
// Description: Bounded loader and checks for the `vercel.json` manifest.
// Purpose: Catch secrets committed inline in the deploy manifest.
// Dependencies: serde_json, thiserror, novyra-config
// ============================================================================

//! ## Overview
//! The platform manifest is pre-existing configuration in the project root.
//! The preflight only reads it: it must parse as a JSON object, and its `env`
//! and `build.env` tables must not define secret contract variables, which
//! belong in the platform secret store instead.
//!
//! Security posture: the manifest is untrusted input; reads are size-bounded
//! and errors never echo manifest contents.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use novyra_config::contract_var;
use novyra_config::is_secret_var;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::diagnostic::Diagnostic;
use crate::rules::codes;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Manifest file name in the project directory.
pub const MANIFEST_FILE: &str = "vercel.json";
/// Maximum manifest size in bytes.
pub const MAX_MANIFEST_BYTES: u64 = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading the platform manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// IO failure while reading the manifest.
    #[error("manifest io error: {0}")]
    Io(String),
    /// Manifest exceeds the size limit.
    #[error("manifest exceeds size limit: {actual} bytes (max {max})")]
    TooLarge {
        /// Maximum allowed bytes.
        max: u64,
        /// Actual size in bytes.
        actual: u64,
    },
    /// Manifest is not a JSON object.
    #[error("manifest is invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Manifest
// ============================================================================

/// Parsed platform manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformManifest {
    /// Source path.
    path: PathBuf,
    /// Top-level object.
    root: Map<String, Value>,
}

impl PlatformManifest {
    /// Loads the manifest from `project_dir` when present.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] when an existing manifest cannot be read or
    /// is not a JSON object.
    pub fn load(project_dir: &Path) -> Result<Option<Self>, ManifestError> {
        let path = project_dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let file = fs::File::open(&path).map_err(|err| ManifestError::Io(err.to_string()))?;
        let actual = file.metadata().map_err(|err| ManifestError::Io(err.to_string()))?.len();
        if actual > MAX_MANIFEST_BYTES {
            return Err(ManifestError::TooLarge {
                max: MAX_MANIFEST_BYTES,
                actual,
            });
        }
        let mut bytes = Vec::new();
        file.take(MAX_MANIFEST_BYTES + 1)
            .read_to_end(&mut bytes)
            .map_err(|err| ManifestError::Io(err.to_string()))?;
        let value: Value = serde_json::from_slice(&bytes).map_err(|err| {
            ManifestError::Invalid(format!("line {} column {}", err.line(), err.column()))
        })?;
        let Value::Object(root) = value else {
            return Err(ManifestError::Invalid("top-level value must be an object".to_string()));
        };
        Ok(Some(Self {
            path,
            root,
        }))
    }

    /// Returns the source path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns secret contract variables defined inline, `env` table first.
    ///
    /// Both the top-level `env` table and `build.env` are inspected.
    #[must_use]
    pub fn inline_secret_keys(&self) -> Vec<String> {
        let build_env = self.root.get("build").and_then(|build| build.get("env"));
        let mut found = Vec::new();
        for table in [self.root.get("env"), build_env].into_iter().flatten() {
            if let Value::Object(vars) = table {
                for name in vars.keys() {
                    if is_secret_var(name) && !found.contains(name) {
                        found.push(name.clone());
                    }
                }
            }
        }
        found
    }
}

// ============================================================================
// SECTION: Checks
// ============================================================================

/// Runs the manifest checks for `project_dir`.
///
/// Returns the findings and whether a readable manifest was found.
#[must_use]
pub fn check_manifest(project_dir: &Path) -> (Vec<Diagnostic>, bool) {
    match PlatformManifest::load(project_dir) {
        Ok(None) => (
            vec![Diagnostic::warning(
                codes::MANIFEST_MISSING,
                None,
                format!(
                    "no {MANIFEST_FILE} in {}; link the repository first",
                    project_dir.display()
                ),
            )],
            false,
        ),
        Ok(Some(manifest)) => {
            let findings = manifest
                .inline_secret_keys()
                .into_iter()
                .map(|name| {
                    Diagnostic::error(
                        codes::MANIFEST_INLINE_SECRET,
                        contract_var(&name).map(|spec| spec.name),
                        format!(
                            "{MANIFEST_FILE} defines {name} inline; move it to the platform \
                             secret store"
                        ),
                    )
                })
                .collect();
            (findings, true)
        }
        Err(err) => (
            vec![Diagnostic::error(
                codes::MANIFEST_INVALID,
                None,
                format!("{MANIFEST_FILE}: {err}"),
            )],
            true,
        ),
    }
}
