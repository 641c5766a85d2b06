// crates/novyra-config/src/error.rs
// ============================================================================
// Module: Config Errors
// Description: Error type shared by env capture and settings resolution.
// Purpose: Fail-closed, secret-free error reporting.
// Dependencies: thiserror
// ============================================================================

//! Error type for env capture and settings resolution.

use thiserror::Error;

/// Errors raised while capturing or resolving the environment contract.
///
/// # Invariants
/// - Messages name variables, never their values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading a dotenv file.
    #[error("config io error: {0}")]
    Io(String),
    /// Dotenv parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// A required variable is unset or blank.
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    /// A variable holds a value outside its accepted domain.
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// The assistant integration is switched off.
    #[error("assistant integration is disabled (USE_DEEPSEEK_AI=False)")]
    AssistantDisabled,
    /// The assistant integration is on but has no API key.
    #[error(
        "assistant integration requires DEEPSEEK_API_KEY; set it in the platform dashboard"
    )]
    AssistantKeyMissing,
}

impl ConfigError {
    /// Builds an [`ConfigError::Invalid`] for `key`.
    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}
