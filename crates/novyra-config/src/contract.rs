// crates/novyra-config/src/contract.rs
// ============================================================================
// Module: Environment Contract
// Description: Catalog of every environment variable the assistant reads.
// Purpose: Drive capture, docs, examples, and preflight from one table.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`ENV_CONTRACT`] is the ordered catalog of environment variables an operator
//! sets in the hosting platform dashboard. Capture, rendering, docs, and the
//! deployment plan all iterate this table, so adding a variable here is enough
//! to surface it everywhere.
//!
//! ## Invariants
//! - Names are unique and bit-exact.
//! - Ordering is stable: core contract first, then supplemental settings.

// ============================================================================
// SECTION: Variable Names
// ============================================================================

/// Bit-exact variable names of the contract.
pub mod keys {
    /// Framework signing secret.
    pub const SECRET_KEY: &str = "SECRET_KEY";
    /// Debug mode flag.
    pub const DEBUG: &str = "DEBUG";
    /// Host-header allow-list.
    pub const ALLOWED_HOSTS: &str = "ALLOWED_HOSTS";
    /// Database engine selector.
    pub const DB_ENGINE: &str = "DB_ENGINE";
    /// Database name.
    pub const DB_NAME: &str = "DB_NAME";
    /// Database user.
    pub const DB_USER: &str = "DB_USER";
    /// Database password.
    pub const DB_PASSWORD: &str = "DB_PASSWORD";
    /// Database host.
    pub const DB_HOST: &str = "DB_HOST";
    /// Database port.
    pub const DB_PORT: &str = "DB_PORT";
    /// Assistant API key.
    pub const DEEPSEEK_API_KEY: &str = "DEEPSEEK_API_KEY";
    /// CORS origin allow-list.
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
    /// Platform marker injected by Vercel.
    pub const VERCEL: &str = "VERCEL";
    /// Deployment domain injected by Vercel.
    pub const VERCEL_URL: &str = "VERCEL_URL";
    /// Widget embed base URL.
    pub const EMBED_BASE_URL: &str = "EMBED_BASE_URL";
    /// Channel-layer backend URL.
    pub const REDIS_URL: &str = "REDIS_URL";
    /// Assistant API base URL.
    pub const DEEPSEEK_API_BASE: &str = "DEEPSEEK_API_BASE";
    /// Assistant model id.
    pub const DEEPSEEK_MODEL: &str = "DEEPSEEK_MODEL";
    /// Assistant enable flag.
    pub const USE_DEEPSEEK_AI: &str = "USE_DEEPSEEK_AI";
    /// Escalation confidence threshold.
    pub const AI_CONFIDENCE_THRESHOLD: &str = "AI_CONFIDENCE_THRESHOLD";
    /// Mail transport backend.
    pub const EMAIL_BACKEND: &str = "EMAIL_BACKEND";
    /// SMTP host.
    pub const EMAIL_HOST: &str = "EMAIL_HOST";
    /// SMTP port.
    pub const EMAIL_PORT: &str = "EMAIL_PORT";
    /// SMTP STARTTLS flag.
    pub const EMAIL_USE_TLS: &str = "EMAIL_USE_TLS";
    /// SMTP user.
    pub const EMAIL_HOST_USER: &str = "EMAIL_HOST_USER";
    /// SMTP password.
    pub const EMAIL_HOST_PASSWORD: &str = "EMAIL_HOST_PASSWORD";
    /// Default sender address.
    pub const DEFAULT_FROM_EMAIL: &str = "DEFAULT_FROM_EMAIL";
    /// Frontend origin.
    pub const FRONTEND_URL: &str = "FRONTEND_URL";
    /// Administrator contact.
    pub const ADMIN_EMAIL: &str = "ADMIN_EMAIL";
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Semantic type of a contract variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Opaque confidential string.
    Secret,
    /// Boolean flag (`True`/`False`).
    Flag,
    /// Platform flag (`1`/`0`).
    PlatformFlag,
    /// Comma-separated hostnames.
    HostList,
    /// Database engine enum.
    Engine,
    /// Free-form text.
    Text,
    /// TCP port number.
    Port,
    /// Absolute URL.
    Url,
    /// Comma-separated origin URLs.
    OriginList,
    /// Float in `[0, 1]`.
    Ratio,
    /// Email address.
    Email,
    /// Bare hostname.
    Hostname,
}

impl VarKind {
    /// Returns the stable label used in docs and JSON output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Secret => "secret",
            Self::Flag => "flag",
            Self::PlatformFlag => "platform_flag",
            Self::HostList => "host_list",
            Self::Engine => "engine",
            Self::Text => "text",
            Self::Port => "port",
            Self::Url => "url",
            Self::OriginList => "origin_list",
            Self::Ratio => "ratio",
            Self::Email => "email",
            Self::Hostname => "hostname",
        }
    }
}

/// When a contract variable must be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Always required.
    Required,
    /// Required together with the other connection parameters for PostgreSQL.
    DatabaseGroup,
    /// Required while the assistant integration is enabled.
    Assistant,
    /// Optional; a default applies.
    Optional,
    /// Injected by the hosting platform, never set by hand.
    PlatformInjected,
}

impl Requirement {
    /// Returns the stable label used in docs and JSON output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::DatabaseGroup => "required_with_postgresql",
            Self::Assistant => "required_for_assistant",
            Self::Optional => "optional",
            Self::PlatformInjected => "platform_injected",
        }
    }
}

/// One catalog entry of the environment contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvVarSpec {
    /// Bit-exact variable name.
    pub name: &'static str,
    /// Semantic type.
    pub kind: VarKind,
    /// Requirement level.
    pub requirement: Requirement,
    /// Default applied when unset.
    pub default: Option<&'static str>,
    /// Whether the value is confidential.
    pub secret: bool,
    /// One-line description for docs.
    pub description: &'static str,
}

/// Builds a catalog entry.
const fn spec(
    name: &'static str,
    kind: VarKind,
    requirement: Requirement,
    default: Option<&'static str>,
    description: &'static str,
) -> EnvVarSpec {
    EnvVarSpec {
        name,
        kind,
        requirement,
        default,
        secret: matches!(kind, VarKind::Secret),
        description,
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Default database port.
pub const DEFAULT_DB_PORT: u16 = 5432;
/// Default SMTP port.
pub const DEFAULT_EMAIL_PORT: u16 = 587;
/// Default assistant API base.
pub const DEFAULT_DEEPSEEK_API_BASE: &str = "https://api.deepseek.com";
/// Default assistant model.
pub const DEFAULT_DEEPSEEK_MODEL: &str = "deepseek-chat";
/// Default channel-layer URL.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
/// Console mail backend (prints instead of sending).
pub const CONSOLE_EMAIL_BACKEND: &str = "django.core.mail.backends.console.EmailBackend";
/// SMTP mail backend.
pub const SMTP_EMAIL_BACKEND: &str = "django.core.mail.backends.smtp.EmailBackend";

/// Ordered environment contract.
pub const ENV_CONTRACT: &[EnvVarSpec] = &[
    spec(
        keys::SECRET_KEY,
        VarKind::Secret,
        Requirement::Required,
        None,
        "Framework signing key. Must be long, random, and kept out of the repository.",
    ),
    spec(
        keys::DEBUG,
        VarKind::Flag,
        Requirement::Optional,
        Some("False"),
        "Debug mode. Must be False in production.",
    ),
    spec(
        keys::ALLOWED_HOSTS,
        VarKind::HostList,
        Requirement::Optional,
        None,
        "Comma-separated host-header allow-list. Must include the deployed domain.",
    ),
    spec(
        keys::DB_ENGINE,
        VarKind::Engine,
        Requirement::Required,
        None,
        "Database engine. Must be postgresql on the serverless platform.",
    ),
    spec(
        keys::DB_NAME,
        VarKind::Text,
        Requirement::DatabaseGroup,
        None,
        "Database name.",
    ),
    spec(
        keys::DB_USER,
        VarKind::Text,
        Requirement::DatabaseGroup,
        None,
        "Database user.",
    ),
    spec(
        keys::DB_PASSWORD,
        VarKind::Secret,
        Requirement::DatabaseGroup,
        None,
        "Database password.",
    ),
    spec(
        keys::DB_HOST,
        VarKind::Hostname,
        Requirement::DatabaseGroup,
        None,
        "Database host. Must be reachable from the platform.",
    ),
    spec(
        keys::DB_PORT,
        VarKind::Port,
        Requirement::Optional,
        Some("5432"),
        "Database port.",
    ),
    spec(
        keys::DEEPSEEK_API_KEY,
        VarKind::Secret,
        Requirement::Assistant,
        None,
        "Assistant API key. Required for the chat assistant.",
    ),
    spec(
        keys::CORS_ALLOWED_ORIGINS,
        VarKind::OriginList,
        Requirement::Optional,
        None,
        "Comma-separated origins allowed to call the API from browsers.",
    ),
    spec(
        keys::VERCEL,
        VarKind::PlatformFlag,
        Requirement::PlatformInjected,
        Some("0"),
        "Set to 1 by the platform at runtime.",
    ),
    spec(
        keys::VERCEL_URL,
        VarKind::Hostname,
        Requirement::PlatformInjected,
        None,
        "Deployment domain assigned by the platform.",
    ),
    spec(
        keys::EMBED_BASE_URL,
        VarKind::Url,
        Requirement::Optional,
        None,
        "Public base URL used in the embeddable chat widget script.",
    ),
    spec(
        keys::REDIS_URL,
        VarKind::Url,
        Requirement::Optional,
        Some(DEFAULT_REDIS_URL),
        "Channel-layer backend for real-time messaging. Ignored on the serverless platform.",
    ),
    spec(
        keys::DEEPSEEK_API_BASE,
        VarKind::Url,
        Requirement::Optional,
        Some(DEFAULT_DEEPSEEK_API_BASE),
        "Assistant API base URL.",
    ),
    spec(
        keys::DEEPSEEK_MODEL,
        VarKind::Text,
        Requirement::Optional,
        Some(DEFAULT_DEEPSEEK_MODEL),
        "Assistant model identifier.",
    ),
    spec(
        keys::USE_DEEPSEEK_AI,
        VarKind::Flag,
        Requirement::Optional,
        Some("True"),
        "Enables the assistant integration.",
    ),
    spec(
        keys::AI_CONFIDENCE_THRESHOLD,
        VarKind::Ratio,
        Requirement::Optional,
        Some("0.7"),
        "Minimum answer confidence before a conversation is escalated.",
    ),
    spec(
        keys::EMAIL_BACKEND,
        VarKind::Text,
        Requirement::Optional,
        Some(CONSOLE_EMAIL_BACKEND),
        "Mail transport backend.",
    ),
    spec(
        keys::EMAIL_HOST,
        VarKind::Hostname,
        Requirement::Optional,
        Some("smtp.gmail.com"),
        "SMTP host.",
    ),
    spec(keys::EMAIL_PORT, VarKind::Port, Requirement::Optional, Some("587"), "SMTP port."),
    spec(
        keys::EMAIL_USE_TLS,
        VarKind::Flag,
        Requirement::Optional,
        Some("True"),
        "Use STARTTLS for SMTP.",
    ),
    spec(keys::EMAIL_HOST_USER, VarKind::Text, Requirement::Optional, None, "SMTP user."),
    spec(
        keys::EMAIL_HOST_PASSWORD,
        VarKind::Secret,
        Requirement::Optional,
        None,
        "SMTP password.",
    ),
    spec(
        keys::DEFAULT_FROM_EMAIL,
        VarKind::Email,
        Requirement::Optional,
        Some("noreply@novyra.agency"),
        "Sender address for outgoing mail.",
    ),
    spec(
        keys::FRONTEND_URL,
        VarKind::Url,
        Requirement::Optional,
        Some("http://localhost:3000"),
        "Frontend origin used in generated links.",
    ),
    spec(
        keys::ADMIN_EMAIL,
        VarKind::Email,
        Requirement::Optional,
        Some("admin@novyra.agency"),
        "Administrator contact address.",
    ),
];

// ============================================================================
// SECTION: Lookups
// ============================================================================

/// Returns the catalog entry for `name`.
#[must_use]
pub fn contract_var(name: &str) -> Option<&'static EnvVarSpec> {
    ENV_CONTRACT.iter().find(|spec| spec.name == name)
}

/// Returns true when `name` is a confidential contract variable.
#[must_use]
pub fn is_secret_var(name: &str) -> bool {
    contract_var(name).is_some_and(|spec| spec.secret)
}
