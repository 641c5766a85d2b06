// crates/novyra-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Message catalog and translation utilities for the CLI.
// Purpose: Keep every user-facing string of `novyra-deploy` in one place.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! `novyra-deploy` stores its own labels and messages in a small translation
//! catalog. Output is routed through the [`t!`](crate::t) macro. Diagnostic
//! messages produced by the preflight rules are not translated; only the
//! surrounding labels are.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to English and then to the key itself.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported CLI locales.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// Catalan.
    Ca,
}

impl Locale {
    /// Returns the canonical locale label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ca => "ca",
        }
    }

    /// Parses a locale value (case-insensitive, tolerant of region tags).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let normalized = value.to_ascii_lowercase();
        let lang = normalized.split(['-', '_', '.']).next().unwrap_or("");
        match lang {
            "en" => Some(Self::En),
            "ca" => Some(Self::Ca),
            _ => None,
        }
    }
}

/// Ordered list of supported CLI locales.
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::Ca];

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// Formatted value substituted for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Global locale selection for CLI output.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the CLI locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

/// Returns the current CLI locale (defaults to English).
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English catalog.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "novyra-deploy {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.json_failed", "Failed to render JSON: {error}"),
    ("env.load_failed", "Failed to load environment: {error}"),
    ("env.show.reveal_warning", "Warning: secret values are printed in clear text."),
    ("audit.open_failed", "Failed to open audit log {path}: {error}"),
    ("check.header", "Preflight {outcome} (target {target}, domain {domain})"),
    ("check.domain.unknown", "unknown"),
    ("check.outcome.pass", "PASS"),
    ("check.outcome.fail", "FAIL"),
    ("check.severity.error", "error"),
    ("check.severity.warning", "warning"),
    ("check.severity.info", "info"),
    ("check.finding", "  {severity} {code}{key}: {message}"),
    ("check.none", "  No findings."),
    ("check.summary", "{errors} error(s), {warnings} warning(s), {infos} note(s)"),
    ("check.manifest.absent", "No platform manifest found; the repository may not be linked."),
    ("docs.write_failed", "Failed to write contract docs: {error}"),
    ("docs.write.ok", "Contract docs written to {path}"),
    ("docs.verify.ok", "Contract docs at {path} are up to date."),
    ("docs.verify.failed", "Contract docs check failed: {error}"),
    ("example.write_failed", "Failed to write {path}: {error}"),
    ("example.write.ok", "Example environment written to {path}"),
    ("hosts.load_failed", "Failed to resolve the host allow-list: {error}"),
    ("hosts.effective.allowed", "{host}: allowed by the effective allow-list ({source})"),
    ("hosts.effective.rejected", "{host}: rejected by the effective allow-list ({source})"),
    ("hosts.configured.allowed", "{host}: admitted by ALLOWED_HOSTS as configured"),
    ("hosts.configured.rejected", "{host}: not admitted by ALLOWED_HOSTS as configured"),
    ("hosts.list", "Effective allow-list: {list}"),
    ("hosts.source.debug", "DEBUG is on"),
    ("hosts.source.platform", "platform flag widens it to *"),
    ("hosts.source.empty", "ALLOWED_HOSTS is empty"),
    ("hosts.source.configured", "ALLOWED_HOSTS"),
    ("plan.header", "Deployment plan"),
    ("plan.step.link_repository", "1. Link the repository to the hosting platform: {status}"),
    ("plan.step.set_variables", "2. Set the variables in the platform dashboard: {status}"),
    ("plan.step.trigger_deploy", "3. Trigger the deploy: {status}"),
    ("plan.status.done", "done"),
    ("plan.status.pending", "pending"),
    ("plan.status.ready", "ready"),
    ("plan.status.blocked", "blocked"),
    ("plan.variable", "   [{status}] {name}{secret}"),
    ("plan.variable.secret", " (secret store)"),
    ("plan.variable.set", "set"),
    ("plan.variable.default", "default"),
    ("plan.variable.missing", "missing"),
    ("plan.variable.unset", "unset"),
    ("plan.variable.injected", "injected"),
    ("i18n.lang.invalid_env", "Invalid value for {env}: {value}. Expected 'en' or 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Note: non-English output is machine-translated and may be inaccurate.",
    ),
];

/// Catalan catalog.
const CATALOG_CA: &[(&str, &str)] = &[
    ("main.version", "novyra-deploy {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "sortida"),
    ("output.write_failed", "No s'ha pogut escriure a {stream}: {error}"),
    ("output.json_failed", "No s'ha pogut generar el JSON: {error}"),
    ("env.load_failed", "No s'ha pogut carregar l'entorn: {error}"),
    ("env.show.reveal_warning", "Avís: els valors secrets es mostren en text pla."),
    ("audit.open_failed", "No s'ha pogut obrir el registre d'auditoria {path}: {error}"),
    ("check.header", "Comprovació prèvia {outcome} (destí {target}, domini {domain})"),
    ("check.domain.unknown", "desconegut"),
    ("check.outcome.pass", "SUPERADA"),
    ("check.outcome.fail", "FALLIDA"),
    ("check.severity.error", "error"),
    ("check.severity.warning", "avís"),
    ("check.severity.info", "info"),
    ("check.finding", "  {severity} {code}{key}: {message}"),
    ("check.none", "  Cap incidència."),
    ("check.summary", "{errors} error(s), {warnings} avís(os), {infos} nota(es)"),
    (
        "check.manifest.absent",
        "No s'ha trobat el manifest de la plataforma; potser el repositori no està enllaçat.",
    ),
    ("docs.write_failed", "No s'ha pogut escriure la documentació del contracte: {error}"),
    ("docs.write.ok", "Documentació del contracte escrita a {path}"),
    ("docs.verify.ok", "La documentació del contracte a {path} està al dia."),
    ("docs.verify.failed", "La comprovació de la documentació ha fallat: {error}"),
    ("example.write_failed", "No s'ha pogut escriure {path}: {error}"),
    ("example.write.ok", "Entorn d'exemple escrit a {path}"),
    ("hosts.load_failed", "No s'ha pogut resoldre la llista d'amfitrions: {error}"),
    ("hosts.effective.allowed", "{host}: permès per la llista efectiva ({source})"),
    ("hosts.effective.rejected", "{host}: rebutjat per la llista efectiva ({source})"),
    ("hosts.configured.allowed", "{host}: admès per ALLOWED_HOSTS tal com està configurat"),
    ("hosts.configured.rejected", "{host}: no admès per ALLOWED_HOSTS tal com està configurat"),
    ("hosts.list", "Llista efectiva: {list}"),
    ("hosts.source.debug", "DEBUG està activat"),
    ("hosts.source.platform", "l'indicador de la plataforma l'amplia a *"),
    ("hosts.source.empty", "ALLOWED_HOSTS és buit"),
    ("hosts.source.configured", "ALLOWED_HOSTS"),
    ("plan.header", "Pla de desplegament"),
    ("plan.step.link_repository", "1. Enllaçar el repositori amb la plataforma: {status}"),
    ("plan.step.set_variables", "2. Definir les variables al tauler de la plataforma: {status}"),
    ("plan.step.trigger_deploy", "3. Iniciar el desplegament: {status}"),
    ("plan.status.done", "fet"),
    ("plan.status.pending", "pendent"),
    ("plan.status.ready", "a punt"),
    ("plan.status.blocked", "bloquejat"),
    ("plan.variable", "   [{status}] {name}{secret}"),
    ("plan.variable.secret", " (magatzem de secrets)"),
    ("plan.variable.set", "definida"),
    ("plan.variable.default", "per defecte"),
    ("plan.variable.missing", "falta"),
    ("plan.variable.unset", "sense definir"),
    ("plan.variable.injected", "injectada"),
    ("i18n.lang.invalid_env", "Valor no vàlid per a {env}: {value}. S'esperava 'en' o 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Nota: la sortida que no és en anglès està traduïda automàticament i pot ser inexacta.",
    ),
];

/// Returns the message catalog for the requested locale.
pub(crate) fn catalog_for(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static CATALOG_CA_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    match locale {
        Locale::En => CATALOG_EN_MAP.get_or_init(|| CATALOG_EN.iter().copied().collect()),
        Locale::Ca => CATALOG_CA_MAP.get_or_init(|| CATALOG_CA.iter().copied().collect()),
    }
}

/// Returns the catalog keys for `locale` in declaration order.
#[must_use]
pub fn catalog_keys(locale: Locale) -> Vec<&'static str> {
    let catalog = match locale {
        Locale::En => CATALOG_EN,
        Locale::Ca => CATALOG_CA,
    };
    catalog.iter().map(|(key, _)| *key).collect()
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the selected locale while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let locale = current_locale();
    let template = catalog_for(locale)
        .get(key)
        .copied()
        .or_else(|| catalog_for(Locale::En).get(key).copied())
        .unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
