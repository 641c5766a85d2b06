// crates/novyra-config/src/settings.rs
// ============================================================================
// Module: Typed Settings
// Description: Strict resolution of an environment snapshot into settings.
// Purpose: Give the assistant one validated, typed view of its configuration.
// Dependencies: url
// ============================================================================

//! ## Overview
//! [`Settings::from_snapshot`] resolves raw contract values exactly the way the
//! assistant does at process start: debug and platform flags first, then the
//! values that depend on them (host allow-list, CORS, channel layer).
//! Resolution is strict and stops at the first invalid value; the preflight
//! crate reports every problem at once instead.
//!
//! The assistant key is deliberately optional here. A missing key surfaces as
//! a configuration error on first use through [`AssistantConfig::credentials`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use url::Url;

use crate::contract::CONSOLE_EMAIL_BACKEND;
use crate::contract::DEFAULT_DB_PORT;
use crate::contract::DEFAULT_DEEPSEEK_API_BASE;
use crate::contract::DEFAULT_DEEPSEEK_MODEL;
use crate::contract::DEFAULT_EMAIL_PORT;
use crate::contract::DEFAULT_REDIS_URL;
use crate::contract::contract_var;
use crate::contract::keys;
use crate::cors::CorsPolicy;
use crate::env::EnvSnapshot;
use crate::error::ConfigError;
use crate::hosts::HostAllowList;
use crate::secret::SecretValue;
use crate::values::is_email_like;
use crate::values::parse_flag_or;
use crate::values::parse_http_url;
use crate::values::parse_platform_flag;
use crate::values::parse_port_or;
use crate::values::parse_ratio;
use crate::values::split_list;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default SQLite database file.
pub const DEFAULT_SQLITE_NAME: &str = "db.sqlite3";
/// Default escalation confidence threshold.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;
/// Keywords that escalate a conversation to a human agent.
pub const ESCALATION_KEYWORDS: &[&str] = &["help", "agent", "human", "support", "escalate"];

// ============================================================================
// SECTION: Platform
// ============================================================================

/// Hosting platform the process runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Serverless platform (`VERCEL=1`).
    Vercel,
    /// Long-running server.
    Standalone,
}

impl Platform {
    /// Returns true on the serverless platform.
    #[must_use]
    pub const fn is_serverless(self) -> bool {
        matches!(self, Self::Vercel)
    }
}

// ============================================================================
// SECTION: Database
// ============================================================================

/// Supported database engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbEngine {
    /// Networked PostgreSQL server.
    PostgreSql,
    /// Local database file.
    Sqlite,
}

impl DbEngine {
    /// Parses a `DB_ENGINE` value; unset or blank selects SQLite.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for unrecognised engines.
    pub fn parse(raw: Option<&str>) -> Result<Self, ConfigError> {
        let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(Self::Sqlite);
        };
        match value.to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(Self::PostgreSql),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            _ => Err(ConfigError::invalid(keys::DB_ENGINE, "expected postgresql or sqlite")),
        }
    }

    /// Returns the canonical `DB_ENGINE` value.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PostgreSql => "postgresql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Returns true when the engine stores data on the local filesystem.
    #[must_use]
    pub const fn is_local_file(self) -> bool {
        matches!(self, Self::Sqlite)
    }
}

/// Resolved database connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConfig {
    /// PostgreSQL connection parameters.
    PostgreSql {
        /// Database name.
        name: String,
        /// Database user.
        user: String,
        /// Database password.
        password: SecretValue,
        /// Server host.
        host: String,
        /// Server port.
        port: u16,
    },
    /// SQLite database file.
    Sqlite {
        /// File path relative to the project root.
        path: String,
    },
}

impl DatabaseConfig {
    /// Resolves the database connection from `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unknown engine, a missing PostgreSQL
    /// parameter, or an invalid port.
    pub fn from_snapshot(snapshot: &EnvSnapshot) -> Result<Self, ConfigError> {
        match DbEngine::parse(snapshot.get(keys::DB_ENGINE))? {
            DbEngine::PostgreSql => Ok(Self::PostgreSql {
                name: required(snapshot, keys::DB_NAME)?,
                user: required(snapshot, keys::DB_USER)?,
                password: snapshot
                    .get_nonblank(keys::DB_PASSWORD)
                    .map(SecretValue::new)
                    .ok_or(ConfigError::Missing(keys::DB_PASSWORD))?,
                host: required(snapshot, keys::DB_HOST)?,
                port: parse_port_or(keys::DB_PORT, snapshot.get(keys::DB_PORT), DEFAULT_DB_PORT)?,
            }),
            DbEngine::Sqlite => Ok(Self::Sqlite {
                path: snapshot
                    .get_nonblank(keys::DB_NAME)
                    .unwrap_or(DEFAULT_SQLITE_NAME)
                    .trim()
                    .to_string(),
            }),
        }
    }

    /// Returns the engine of this connection.
    #[must_use]
    pub const fn engine(&self) -> DbEngine {
        match self {
            Self::PostgreSql {
                ..
            } => DbEngine::PostgreSql,
            Self::Sqlite {
                ..
            } => DbEngine::Sqlite,
        }
    }
}

// ============================================================================
// SECTION: Host Allow-List
// ============================================================================

/// Why the effective allow-list has its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostListSource {
    /// Debug mode admits every host.
    Debug,
    /// The serverless platform flag admits every host.
    Platform,
    /// `ALLOWED_HOSTS` is empty, so every host is admitted.
    Empty,
    /// The configured list applies as written.
    Configured,
}

impl HostListSource {
    /// Returns the stable label used in output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Platform => "platform",
            Self::Empty => "empty",
            Self::Configured => "configured",
        }
    }
}

/// Effective and configured host allow-lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveHosts {
    /// List the host-header check enforces.
    pub allowed: HostAllowList,
    /// List as written in `ALLOWED_HOSTS`.
    pub configured: HostAllowList,
    /// Reason for the effective list.
    pub source: HostListSource,
}

impl EffectiveHosts {
    /// Resolves the allow-lists from `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `DEBUG` is not a flag token.
    pub fn from_snapshot(snapshot: &EnvSnapshot) -> Result<Self, ConfigError> {
        let debug = parse_flag_or(keys::DEBUG, snapshot.get(keys::DEBUG), false)?;
        let platform = if parse_platform_flag(snapshot.get(keys::VERCEL)) {
            Platform::Vercel
        } else {
            Platform::Standalone
        };
        Ok(Self::resolve(snapshot, debug, platform))
    }

    /// Resolves the allow-lists for an already-parsed debug flag and platform.
    fn resolve(snapshot: &EnvSnapshot, debug: bool, platform: Platform) -> Self {
        let entries = split_list(snapshot.get(keys::ALLOWED_HOSTS).unwrap_or(""));
        let configured = HostAllowList::from_entries(entries);
        let source = if debug {
            HostListSource::Debug
        } else if platform.is_serverless() {
            HostListSource::Platform
        } else if configured.is_empty() {
            HostListSource::Empty
        } else {
            HostListSource::Configured
        };
        let allowed = match source {
            HostListSource::Configured => configured.clone(),
            _ => HostAllowList::wildcard(),
        };
        Self {
            allowed,
            configured,
            source,
        }
    }
}

// ============================================================================
// SECTION: Real-Time Messaging
// ============================================================================

/// Channel-layer backend for real-time messaging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelLayer {
    /// Per-process in-memory layer; messages never cross instances.
    InMemory,
    /// Redis-backed layer.
    Redis {
        /// Redis connection URL.
        url: String,
    },
}

// ============================================================================
// SECTION: Assistant
// ============================================================================

/// Assistant integration settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantConfig {
    /// Whether the integration is turned on.
    pub enabled: bool,
    /// API key, when provided.
    pub api_key: Option<SecretValue>,
    /// API base URL.
    pub api_base: Url,
    /// Model identifier.
    pub model: String,
    /// Confidence below which conversations escalate.
    pub confidence_threshold: f64,
    /// Keywords that escalate immediately.
    pub escalation_keywords: Vec<String>,
}

impl AssistantConfig {
    /// Resolves the assistant integration from `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a bad flag, base URL, or threshold.
    pub fn from_snapshot(snapshot: &EnvSnapshot) -> Result<Self, ConfigError> {
        let enabled =
            parse_flag_or(keys::USE_DEEPSEEK_AI, snapshot.get(keys::USE_DEEPSEEK_AI), true)?;
        let api_base = parse_http_url(
            keys::DEEPSEEK_API_BASE,
            value_or_default(snapshot, keys::DEEPSEEK_API_BASE)
                .unwrap_or(DEFAULT_DEEPSEEK_API_BASE),
        )?;
        let confidence_threshold = match snapshot.get_nonblank(keys::AI_CONFIDENCE_THRESHOLD) {
            Some(raw) => parse_ratio(keys::AI_CONFIDENCE_THRESHOLD, raw)?,
            None => DEFAULT_CONFIDENCE_THRESHOLD,
        };
        Ok(Self {
            enabled,
            api_key: snapshot.get_nonblank(keys::DEEPSEEK_API_KEY).map(SecretValue::new),
            api_base,
            model: value_or_default(snapshot, keys::DEEPSEEK_MODEL)
                .unwrap_or(DEFAULT_DEEPSEEK_MODEL)
                .trim()
                .to_string(),
            confidence_threshold,
            escalation_keywords: ESCALATION_KEYWORDS
                .iter()
                .map(|word| (*word).to_string())
                .collect(),
        })
    }

    /// Returns the API key for a request.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AssistantDisabled`] when the integration is off and
    /// [`ConfigError::AssistantKeyMissing`] when the key is blank.
    pub fn credentials(&self) -> Result<&SecretValue, ConfigError> {
        if !self.enabled {
            return Err(ConfigError::AssistantDisabled);
        }
        self.api_key.as_ref().filter(|key| !key.is_blank()).ok_or(ConfigError::AssistantKeyMissing)
    }

    /// Returns the chat completions endpoint.
    #[must_use]
    pub fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_without_slash())
    }

    /// Returns the model listing endpoint.
    #[must_use]
    pub fn models_url(&self) -> String {
        format!("{}/models", self.base_without_slash())
    }

    /// Returns true when `message` contains an escalation keyword.
    ///
    /// Keywords match as case-insensitive substrings, so "helpful" escalates.
    #[must_use]
    pub fn wants_escalation(&self, message: &str) -> bool {
        let lower = message.trim().to_lowercase();
        self.escalation_keywords.iter().any(|keyword| lower.contains(keyword.as_str()))
    }

    /// Returns the base URL without a trailing slash.
    fn base_without_slash(&self) -> &str {
        self.api_base.as_str().trim_end_matches('/')
    }
}

// ============================================================================
// SECTION: Email
// ============================================================================

/// Outgoing mail settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    /// Backend import path.
    pub backend: String,
    /// SMTP host.
    pub host: String,
    /// SMTP port.
    pub port: u16,
    /// STARTTLS flag.
    pub use_tls: bool,
    /// SMTP user; empty when unset.
    pub host_user: String,
    /// SMTP password, when provided.
    pub host_password: Option<SecretValue>,
    /// Sender address.
    pub default_from: String,
}

impl EmailConfig {
    /// Returns true when mail is printed instead of sent.
    #[must_use]
    pub fn is_console(&self) -> bool {
        self.backend == CONSOLE_EMAIL_BACKEND
    }
}

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Strict, typed view of the environment contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Framework signing key.
    pub secret_key: SecretValue,
    /// Debug mode.
    pub debug: bool,
    /// Hosting platform.
    pub platform: Platform,
    /// Effective host allow-list.
    pub allowed_hosts: HostAllowList,
    /// Allow-list as configured in `ALLOWED_HOSTS`.
    pub configured_hosts: HostAllowList,
    /// Database connection.
    pub database: DatabaseConfig,
    /// Cross-origin policy.
    pub cors: CorsPolicy,
    /// Real-time channel layer.
    pub channel_layer: ChannelLayer,
    /// Assistant integration.
    pub assistant: AssistantConfig,
    /// Outgoing mail.
    pub email: EmailConfig,
    /// Frontend origin.
    pub frontend_url: Url,
    /// Widget embed base URL.
    pub embed_base_url: Option<Url>,
    /// Administrator contact.
    pub admin_email: String,
}

impl Settings {
    /// Resolves `snapshot` into typed settings.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered.
    pub fn from_snapshot(snapshot: &EnvSnapshot) -> Result<Self, ConfigError> {
        let secret_key = snapshot
            .get_nonblank(keys::SECRET_KEY)
            .map(SecretValue::new)
            .ok_or(ConfigError::Missing(keys::SECRET_KEY))?;
        let debug = parse_flag_or(keys::DEBUG, snapshot.get(keys::DEBUG), false)?;
        let platform = if parse_platform_flag(snapshot.get(keys::VERCEL)) {
            Platform::Vercel
        } else {
            Platform::Standalone
        };

        let hosts = EffectiveHosts::resolve(snapshot, debug, platform);

        let cors = if debug {
            CorsPolicy::AllowAll
        } else {
            CorsPolicy::from_origins(split_list(
                snapshot.get(keys::CORS_ALLOWED_ORIGINS).unwrap_or(""),
            ))
        };

        let channel_layer = if debug || platform.is_serverless() {
            ChannelLayer::InMemory
        } else {
            ChannelLayer::Redis {
                url: value_or_default(snapshot, keys::REDIS_URL)
                    .unwrap_or(DEFAULT_REDIS_URL)
                    .to_string(),
            }
        };

        let embed_base_url = snapshot
            .get_nonblank(keys::EMBED_BASE_URL)
            .map(|raw| parse_http_url(keys::EMBED_BASE_URL, raw))
            .transpose()?;
        let frontend_url = parse_http_url(
            keys::FRONTEND_URL,
            value_or_default(snapshot, keys::FRONTEND_URL).unwrap_or_default(),
        )?;
        let admin_email = resolve_email(snapshot, keys::ADMIN_EMAIL)?;

        Ok(Self {
            secret_key,
            debug,
            platform,
            allowed_hosts: hosts.allowed,
            configured_hosts: hosts.configured,
            database: DatabaseConfig::from_snapshot(snapshot)?,
            cors,
            channel_layer,
            assistant: AssistantConfig::from_snapshot(snapshot)?,
            email: resolve_email_config(snapshot)?,
            frontend_url,
            embed_base_url,
            admin_email,
        })
    }
}

// ============================================================================
// SECTION: Resolution Helpers
// ============================================================================

/// Returns the non-blank value of `key`, else its contract default.
fn value_or_default<'a>(snapshot: &'a EnvSnapshot, key: &str) -> Option<&'a str> {
    snapshot.get_nonblank(key).or_else(|| contract_var(key).and_then(|spec| spec.default))
}

/// Returns a required non-blank value.
fn required(snapshot: &EnvSnapshot, key: &'static str) -> Result<String, ConfigError> {
    snapshot
        .get_nonblank(key)
        .map(|value| value.trim().to_string())
        .ok_or(ConfigError::Missing(key))
}

/// Resolves outgoing mail settings.
fn resolve_email_config(snapshot: &EnvSnapshot) -> Result<EmailConfig, ConfigError> {
    Ok(EmailConfig {
        backend: value_or_default(snapshot, keys::EMAIL_BACKEND)
            .unwrap_or(CONSOLE_EMAIL_BACKEND)
            .trim()
            .to_string(),
        host: value_or_default(snapshot, keys::EMAIL_HOST).unwrap_or_default().trim().to_string(),
        port: parse_port_or(
            keys::EMAIL_PORT,
            value_or_default(snapshot, keys::EMAIL_PORT),
            DEFAULT_EMAIL_PORT,
        )?,
        use_tls: parse_flag_or(keys::EMAIL_USE_TLS, snapshot.get(keys::EMAIL_USE_TLS), true)?,
        host_user: snapshot.get(keys::EMAIL_HOST_USER).unwrap_or_default().trim().to_string(),
        host_password: snapshot.get_nonblank(keys::EMAIL_HOST_PASSWORD).map(SecretValue::new),
        default_from: resolve_email(snapshot, keys::DEFAULT_FROM_EMAIL)?,
    })
}

/// Resolves an address-valued variable with its contract default.
fn resolve_email(snapshot: &EnvSnapshot, key: &'static str) -> Result<String, ConfigError> {
    let value = value_or_default(snapshot, key).unwrap_or_default().trim();
    if !is_email_like(value) {
        return Err(ConfigError::invalid(key, "expected an email address"));
    }
    Ok(value.to_string())
}
