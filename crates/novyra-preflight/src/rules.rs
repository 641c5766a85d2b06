// crates/novyra-preflight/src/rules.rs
// ============================================================================
// Module: Preflight Rules
// Description: Static rules evaluated against a raw environment snapshot.
// Purpose: Turn platform caveats into enforced, diagnosable preconditions.
// Dependencies: novyra-config
// ============================================================================

//! ## Overview
//! Rules read the raw [`EnvSnapshot`] with the same parsers the typed settings
//! use, but never stop at the first problem: each rule appends its findings and
//! the next rule runs regardless. A snapshot with N independent problems
//! yields N diagnostics.
//!
//! "Production" means `DEBUG` is false. An unparseable `DEBUG` is reported and
//! then treated as production so dependent rules stay strict.

// ============================================================================
// SECTION: Imports
// ============================================================================

use novyra_config::CONSOLE_EMAIL_BACKEND;
use novyra_config::DbEngine;
use novyra_config::EnvSnapshot;
use novyra_config::HostAllowList;
use novyra_config::SMTP_EMAIL_BACKEND;
use novyra_config::SecretValue;
use novyra_config::contract_var;
use novyra_config::is_email_like;
use novyra_config::is_loopback_host;
use novyra_config::keys;
use novyra_config::normalize_domain;
use novyra_config::origin_is_well_formed;
use novyra_config::parse_flag_or;
use novyra_config::parse_http_url;
use novyra_config::parse_platform_flag;
use novyra_config::parse_port;
use novyra_config::parse_ratio;
use novyra_config::secret_key_weakness;
use novyra_config::split_list;

use crate::diagnostic::Diagnostic;
use crate::options::Target;

// ============================================================================
// SECTION: Codes
// ============================================================================

/// Stable diagnostic codes.
pub mod codes {
    /// `SECRET_KEY` unset or blank.
    pub const SECRET_KEY_MISSING: &str = "secret_key.missing";
    /// `SECRET_KEY` fails the strength heuristics.
    pub const SECRET_KEY_WEAK: &str = "secret_key.weak";
    /// `DEBUG` is not a flag token.
    pub const DEBUG_INVALID: &str = "debug.invalid";
    /// `DEBUG` is on.
    pub const DEBUG_ENABLED: &str = "debug.enabled";
    /// `DB_ENGINE` is not a known engine.
    pub const DB_ENGINE_INVALID: &str = "db.engine_invalid";
    /// Local-file engine on the serverless target.
    pub const DB_ENGINE_UNSUPPORTED: &str = "db.engine_unsupported";
    /// Local-file engine on the server target.
    pub const DB_ENGINE_LOCAL_ONLY: &str = "db.engine_local_only";
    /// PostgreSQL connection parameter missing.
    pub const DB_PARAM_MISSING: &str = "db.param_missing";
    /// `DB_PORT` is not a port.
    pub const DB_PORT_INVALID: &str = "db.port_invalid";
    /// Database host is loopback on the serverless target.
    pub const DB_HOST_LOOPBACK: &str = "db.host_loopback";
    /// Allow-list does not admit the deployed domain.
    pub const HOSTS_DOMAIN_MISSING: &str = "hosts.domain_missing";
    /// Effective production allow-list admits every host.
    pub const HOSTS_WILDCARD: &str = "hosts.wildcard";
    /// No deployed domain known to check against.
    pub const HOSTS_UNKNOWN_DOMAIN: &str = "hosts.unknown_domain";
    /// CORS origin is not `scheme://host[:port]`.
    pub const CORS_ORIGIN_INVALID: &str = "cors.origin_invalid";
    /// Debug mode admits every origin.
    pub const CORS_ALLOW_ALL: &str = "cors.allow_all";
    /// Assistant enabled without a key.
    pub const ASSISTANT_KEY_MISSING: &str = "assistant.key_missing";
    /// Assistant integration turned off.
    pub const ASSISTANT_DISABLED: &str = "assistant.disabled";
    /// `USE_DEEPSEEK_AI` is not a flag token.
    pub const ASSISTANT_FLAG_INVALID: &str = "assistant.flag_invalid";
    /// `DEEPSEEK_API_BASE` is not an http(s) URL.
    pub const ASSISTANT_BASE_INVALID: &str = "assistant.base_invalid";
    /// `AI_CONFIDENCE_THRESHOLD` is not in `[0, 1]`.
    pub const ASSISTANT_THRESHOLD_INVALID: &str = "assistant.threshold_invalid";
    /// Redis channel layer configured on the serverless target.
    pub const REALTIME_SERVERLESS_UNSUPPORTED: &str = "realtime.serverless_unsupported";
    /// Serverless target runs an in-memory channel layer.
    pub const REALTIME_IN_MEMORY_LAYER: &str = "realtime.in_memory_layer";
    /// `EMAIL_PORT` is not a port.
    pub const EMAIL_PORT_INVALID: &str = "email.port_invalid";
    /// `EMAIL_USE_TLS` is not a flag token.
    pub const EMAIL_TLS_INVALID: &str = "email.tls_invalid";
    /// Sender or admin address is malformed.
    pub const EMAIL_ADDRESS_INVALID: &str = "email.address_invalid";
    /// Console mail backend in production.
    pub const EMAIL_CONSOLE_BACKEND: &str = "email.console_backend";
    /// SMTP backend without credentials.
    pub const EMAIL_SMTP_CREDENTIALS: &str = "email.smtp_credentials";
    /// `FRONTEND_URL` is not an http(s) URL.
    pub const FRONTEND_URL_INVALID: &str = "frontend.url_invalid";
    /// `FRONTEND_URL` points at the local machine in production.
    pub const FRONTEND_LOOPBACK: &str = "frontend.loopback";
    /// `EMBED_BASE_URL` is not an http(s) URL.
    pub const EMBED_BASE_INVALID: &str = "embed.base_invalid";
    /// `EMBED_BASE_URL` unset in production.
    pub const EMBED_BASE_MISSING: &str = "embed.base_missing";
    /// No platform manifest in the project directory.
    pub const MANIFEST_MISSING: &str = "manifest.missing";
    /// Platform manifest unreadable or not a JSON object.
    pub const MANIFEST_INVALID: &str = "manifest.invalid";
    /// Platform manifest defines a secret inline.
    pub const MANIFEST_INLINE_SECRET: &str = "manifest.inline_secret";
    /// Assistant API rejected the key.
    pub const PROBE_ASSISTANT_REJECTED: &str = "probe.assistant_rejected";
    /// Assistant API could not confirm the key.
    pub const PROBE_ASSISTANT_UNREACHABLE: &str = "probe.assistant_unreachable";
    /// Database did not accept a TCP connection.
    pub const PROBE_DATABASE_UNREACHABLE: &str = "probe.database_unreachable";
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Inputs shared by every static rule.
#[derive(Debug, Clone)]
pub struct RuleContext<'a> {
    /// Raw environment.
    pub snapshot: &'a EnvSnapshot,
    /// Deployment target.
    pub target: Target,
    /// Normalised deployed domain, when known.
    pub domain: Option<String>,
    /// Whether debug mode is on; false when `DEBUG` is invalid.
    pub debug: bool,
}

impl<'a> RuleContext<'a> {
    /// Builds the context, resolving the domain from `explicit` or `VERCEL_URL`.
    #[must_use]
    pub fn new(snapshot: &'a EnvSnapshot, target: Target, explicit: Option<&str>) -> Self {
        let domain = explicit
            .or_else(|| snapshot.get_nonblank(keys::VERCEL_URL))
            .map(normalize_domain)
            .filter(|domain| !domain.is_empty());
        let debug = parse_flag_or(keys::DEBUG, snapshot.get(keys::DEBUG), false).unwrap_or(false);
        Self {
            snapshot,
            target,
            domain,
            debug,
        }
    }

    /// Returns true when the deploy runs with debug off.
    #[must_use]
    pub const fn production(&self) -> bool {
        !self.debug
    }

    /// Returns the non-blank value of `key`, else its contract default.
    fn value_or_default(&self, key: &str) -> Option<&'a str> {
        let snapshot: &'a EnvSnapshot = self.snapshot;
        snapshot.get_nonblank(key).or_else(|| contract_var(key).and_then(|spec| spec.default))
    }
}

/// Evaluates every static rule in order.
#[must_use]
pub fn evaluate(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    check_secret_key(ctx, &mut out);
    check_debug(ctx, &mut out);
    check_database(ctx, &mut out);
    check_hosts(ctx, &mut out);
    check_cors(ctx, &mut out);
    check_assistant(ctx, &mut out);
    check_realtime(ctx, &mut out);
    check_email(ctx, &mut out);
    check_frontend(ctx, &mut out);
    out
}

// ============================================================================
// SECTION: Core Rules
// ============================================================================

/// `SECRET_KEY` presence and strength.
fn check_secret_key(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let Some(raw) = ctx.snapshot.get_nonblank(keys::SECRET_KEY) else {
        out.push(Diagnostic::error(
            codes::SECRET_KEY_MISSING,
            Some(keys::SECRET_KEY),
            "SECRET_KEY is not set; the framework cannot sign sessions without it",
        ));
        return;
    };
    if let Some(weakness) = secret_key_weakness(&SecretValue::new(raw)) {
        out.push(Diagnostic::warning(
            codes::SECRET_KEY_WEAK,
            Some(keys::SECRET_KEY),
            format!(
                "SECRET_KEY looks weak ({}); generate at least 50 random characters",
                weakness.label()
            ),
        ));
    }
}

/// `DEBUG` token and production state.
fn check_debug(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    match parse_flag_or(keys::DEBUG, ctx.snapshot.get(keys::DEBUG), false) {
        Err(_) => out.push(Diagnostic::error(
            codes::DEBUG_INVALID,
            Some(keys::DEBUG),
            "DEBUG must be True or False",
        )),
        Ok(true) => out.push(Diagnostic::warning(
            codes::DEBUG_ENABLED,
            Some(keys::DEBUG),
            "DEBUG is True; error pages expose internals and every host and origin is admitted",
        )),
        Ok(false) => {}
    }
}

/// Database engine, connection parameters, and port.
fn check_database(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let raw_engine = ctx.snapshot.get_nonblank(keys::DB_ENGINE);
    match DbEngine::parse(raw_engine) {
        Err(_) => out.push(Diagnostic::error(
            codes::DB_ENGINE_INVALID,
            Some(keys::DB_ENGINE),
            "DB_ENGINE must be postgresql or sqlite",
        )),
        Ok(engine) if engine.is_local_file() => {
            let source = if raw_engine.is_some() {
                "DB_ENGINE selects sqlite"
            } else {
                "DB_ENGINE is not set and falls back to sqlite"
            };
            let (code, consequence) = if ctx.target.is_serverless() {
                (
                    codes::DB_ENGINE_UNSUPPORTED,
                    "which stores data in a local file the serverless platform discards",
                )
            } else {
                (
                    codes::DB_ENGINE_LOCAL_ONLY,
                    "which keeps data in a local file on one machine, unshared and unmanaged",
                )
            };
            out.push(Diagnostic::error(
                code,
                Some(keys::DB_ENGINE),
                format!("{source}, {consequence}; set DB_ENGINE=postgresql"),
            ));
        }
        Ok(_) => {
            for key in [keys::DB_NAME, keys::DB_USER, keys::DB_PASSWORD, keys::DB_HOST] {
                if ctx.snapshot.get_nonblank(key).is_none() {
                    out.push(Diagnostic::error(
                        codes::DB_PARAM_MISSING,
                        Some(key),
                        format!("{key} is required when DB_ENGINE is postgresql"),
                    ));
                }
            }
            if ctx.target.is_serverless()
                && let Some(host) = ctx.snapshot.get_nonblank(keys::DB_HOST)
                && is_loopback_host(host)
            {
                out.push(Diagnostic::warning(
                    codes::DB_HOST_LOOPBACK,
                    Some(keys::DB_HOST),
                    "DB_HOST points at the local machine, which is unreachable from the platform",
                ));
            }
        }
    }
    if let Some(port) = ctx.snapshot.get_nonblank(keys::DB_PORT)
        && parse_port(keys::DB_PORT, port).is_err()
    {
        out.push(Diagnostic::error(
            codes::DB_PORT_INVALID,
            Some(keys::DB_PORT),
            "DB_PORT must be a port number between 1 and 65535",
        ));
    }
}

/// Host-header allow-list against the deployed domain.
fn check_hosts(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    if !ctx.production() {
        return;
    }
    let entries = split_list(ctx.snapshot.get(keys::ALLOWED_HOSTS).unwrap_or(""));
    let configured = HostAllowList::from_entries(entries);
    match &ctx.domain {
        Some(domain) if !configured.is_empty() && !configured.is_allowed(domain) => {
            out.push(Diagnostic::error(
                codes::HOSTS_DOMAIN_MISSING,
                Some(keys::ALLOWED_HOSTS),
                format!("ALLOWED_HOSTS does not admit {domain}; requests to it will be rejected"),
            ));
        }
        Some(_) => {}
        None => out.push(Diagnostic::info(
            codes::HOSTS_UNKNOWN_DOMAIN,
            Some(keys::ALLOWED_HOSTS),
            "no deployed domain known; pass --domain to check ALLOWED_HOSTS against it",
        )),
    }
    let platform_override =
        ctx.target.is_serverless() || parse_platform_flag(ctx.snapshot.get(keys::VERCEL));
    if platform_override {
        out.push(Diagnostic::warning(
            codes::HOSTS_WILDCARD,
            Some(keys::ALLOWED_HOSTS),
            "the serverless platform flag widens ALLOWED_HOSTS to * at runtime",
        ));
    } else if configured.is_empty() || configured.is_wildcard() {
        out.push(Diagnostic::warning(
            codes::HOSTS_WILDCARD,
            Some(keys::ALLOWED_HOSTS),
            "ALLOWED_HOSTS admits every host; list the deployed domains instead",
        ));
    }
}

/// CORS origin shape and debug allow-all.
fn check_cors(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    if ctx.debug {
        out.push(Diagnostic::warning(
            codes::CORS_ALLOW_ALL,
            Some(keys::CORS_ALLOWED_ORIGINS),
            "DEBUG is True, so every origin may call the API with credentials",
        ));
        return;
    }
    for origin in split_list(ctx.snapshot.get(keys::CORS_ALLOWED_ORIGINS).unwrap_or("")) {
        if !origin_is_well_formed(&origin) {
            out.push(Diagnostic::warning(
                codes::CORS_ORIGIN_INVALID,
                Some(keys::CORS_ALLOWED_ORIGINS),
                format!("CORS origin {origin} must look like https://host[:port] with no path"),
            ));
        }
    }
}

// ============================================================================
// SECTION: Supplemental Rules
// ============================================================================

/// Assistant flag, key, base URL, and threshold.
fn check_assistant(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let enabled = match parse_flag_or(
        keys::USE_DEEPSEEK_AI,
        ctx.snapshot.get(keys::USE_DEEPSEEK_AI),
        true,
    ) {
        Ok(enabled) => enabled,
        Err(_) => {
            out.push(Diagnostic::error(
                codes::ASSISTANT_FLAG_INVALID,
                Some(keys::USE_DEEPSEEK_AI),
                "USE_DEEPSEEK_AI must be True or False",
            ));
            true
        }
    };
    if !enabled {
        out.push(Diagnostic::info(
            codes::ASSISTANT_DISABLED,
            Some(keys::USE_DEEPSEEK_AI),
            "the assistant integration is turned off; chats fall back to human agents",
        ));
    } else if ctx.snapshot.get_nonblank(keys::DEEPSEEK_API_KEY).is_none() {
        out.push(Diagnostic::error(
            codes::ASSISTANT_KEY_MISSING,
            Some(keys::DEEPSEEK_API_KEY),
            "DEEPSEEK_API_KEY is not set; the assistant will fail on its first request",
        ));
    }
    if let Some(base) = ctx.snapshot.get_nonblank(keys::DEEPSEEK_API_BASE)
        && parse_http_url(keys::DEEPSEEK_API_BASE, base).is_err()
    {
        out.push(Diagnostic::error(
            codes::ASSISTANT_BASE_INVALID,
            Some(keys::DEEPSEEK_API_BASE),
            "DEEPSEEK_API_BASE must be an absolute http or https URL",
        ));
    }
    if let Some(threshold) = ctx.snapshot.get_nonblank(keys::AI_CONFIDENCE_THRESHOLD)
        && parse_ratio(keys::AI_CONFIDENCE_THRESHOLD, threshold).is_err()
    {
        out.push(Diagnostic::error(
            codes::ASSISTANT_THRESHOLD_INVALID,
            Some(keys::AI_CONFIDENCE_THRESHOLD),
            "AI_CONFIDENCE_THRESHOLD must be a number between 0 and 1",
        ));
    }
}

/// Real-time messaging on the serverless target.
fn check_realtime(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    if !ctx.target.is_serverless() {
        return;
    }
    if ctx.snapshot.get_nonblank(keys::REDIS_URL).is_some() {
        out.push(Diagnostic::warning(
            codes::REALTIME_SERVERLESS_UNSUPPORTED,
            Some(keys::REDIS_URL),
            "REDIS_URL is ignored on the serverless platform; WebSocket messaging may fail \
             because processes do not hold long-lived connections",
        ));
    }
    out.push(Diagnostic::info(
        codes::REALTIME_IN_MEMORY_LAYER,
        None,
        "real-time messaging uses an in-memory channel layer; messages do not cross instances",
    ));
}

/// Mail transport settings.
fn check_email(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    if let Some(port) = ctx.snapshot.get_nonblank(keys::EMAIL_PORT)
        && parse_port(keys::EMAIL_PORT, port).is_err()
    {
        out.push(Diagnostic::error(
            codes::EMAIL_PORT_INVALID,
            Some(keys::EMAIL_PORT),
            "EMAIL_PORT must be a port number between 1 and 65535",
        ));
    }
    if parse_flag_or(keys::EMAIL_USE_TLS, ctx.snapshot.get(keys::EMAIL_USE_TLS), true).is_err() {
        out.push(Diagnostic::error(
            codes::EMAIL_TLS_INVALID,
            Some(keys::EMAIL_USE_TLS),
            "EMAIL_USE_TLS must be True or False",
        ));
    }
    for key in [keys::DEFAULT_FROM_EMAIL, keys::ADMIN_EMAIL] {
        if !ctx.value_or_default(key).is_some_and(is_email_like) {
            out.push(Diagnostic::error(
                codes::EMAIL_ADDRESS_INVALID,
                Some(key),
                format!("{key} must be an email address"),
            ));
        }
    }
    let backend = ctx.value_or_default(keys::EMAIL_BACKEND).unwrap_or(CONSOLE_EMAIL_BACKEND).trim();
    if ctx.production() && backend == CONSOLE_EMAIL_BACKEND {
        out.push(Diagnostic::warning(
            codes::EMAIL_CONSOLE_BACKEND,
            Some(keys::EMAIL_BACKEND),
            "EMAIL_BACKEND prints mail to the console; escalation emails will not be delivered",
        ));
    }
    if backend == SMTP_EMAIL_BACKEND
        && (ctx.snapshot.get_nonblank(keys::EMAIL_HOST_USER).is_none()
            || ctx.snapshot.get_nonblank(keys::EMAIL_HOST_PASSWORD).is_none())
    {
        out.push(Diagnostic::warning(
            codes::EMAIL_SMTP_CREDENTIALS,
            Some(keys::EMAIL_HOST_USER),
            "the SMTP backend needs EMAIL_HOST_USER and EMAIL_HOST_PASSWORD",
        ));
    }
}

/// Frontend origin and widget embed base.
fn check_frontend(ctx: &RuleContext<'_>, out: &mut Vec<Diagnostic>) {
    let frontend = ctx.value_or_default(keys::FRONTEND_URL);
    match frontend.map(|raw| parse_http_url(keys::FRONTEND_URL, raw)) {
        Some(Ok(url)) => {
            if ctx.production() && url.host_str().is_some_and(is_loopback_host) {
                out.push(Diagnostic::warning(
                    codes::FRONTEND_LOOPBACK,
                    Some(keys::FRONTEND_URL),
                    "FRONTEND_URL points at localhost; links in emails will not resolve",
                ));
            }
        }
        Some(Err(_)) | None => out.push(Diagnostic::error(
            codes::FRONTEND_URL_INVALID,
            Some(keys::FRONTEND_URL),
            "FRONTEND_URL must be an absolute http or https URL",
        )),
    }
    match ctx.snapshot.get_nonblank(keys::EMBED_BASE_URL) {
        Some(raw) => {
            if parse_http_url(keys::EMBED_BASE_URL, raw).is_err() {
                out.push(Diagnostic::error(
                    codes::EMBED_BASE_INVALID,
                    Some(keys::EMBED_BASE_URL),
                    "EMBED_BASE_URL must be an absolute http or https URL",
                ));
            }
        }
        None if ctx.production() => out.push(Diagnostic::info(
            codes::EMBED_BASE_MISSING,
            Some(keys::EMBED_BASE_URL),
            "EMBED_BASE_URL is not set; the widget script falls back to the request host",
        )),
        None => {}
    }
}
