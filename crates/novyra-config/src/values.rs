// crates/novyra-config/src/values.rs
// ============================================================================
// Module: Value Parsers
// Description: Primitive parsers for raw environment strings.
// Purpose: Share one interpretation of flags, ports, lists, and URLs.
// Dependencies: url
// ============================================================================

//! ## Overview
//! Settings resolution and preflight rules must agree on how a raw string is
//! read, so every primitive interpretation lives here. Parsers take the
//! variable name only to label errors; values are never echoed back.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::IpAddr;

use url::Url;

use crate::error::ConfigError;

// ============================================================================
// SECTION: Flags
// ============================================================================

/// Parses a boolean flag.
///
/// Accepts `True`/`False` in any case plus `1`/`0`.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] for any other token.
pub fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    let value = raw.trim();
    if value == "1" || value.eq_ignore_ascii_case("true") {
        return Ok(true);
    }
    if value == "0" || value.eq_ignore_ascii_case("false") {
        return Ok(false);
    }
    Err(ConfigError::invalid(key, "expected True or False"))
}

/// Parses an optional flag, falling back to `default` when unset or blank.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] for unrecognised tokens.
pub fn parse_flag_or(
    key: &'static str,
    raw: Option<&str>,
    default: bool,
) -> Result<bool, ConfigError> {
    match raw {
        Some(value) if !value.trim().is_empty() => parse_flag(key, value),
        _ => Ok(default),
    }
}

/// Reads a platform marker, which is set only when the value is exactly `1`.
#[must_use]
pub fn parse_platform_flag(raw: Option<&str>) -> bool {
    raw.is_some_and(|value| value.trim() == "1")
}

// ============================================================================
// SECTION: Numbers
// ============================================================================

/// Parses a TCP port in `1..=65535`.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the value is not a valid port.
pub fn parse_port(key: &'static str, raw: &str) -> Result<u16, ConfigError> {
    let port: u16 =
        raw.trim().parse().map_err(|_| ConfigError::invalid(key, "expected a port number"))?;
    if port == 0 {
        return Err(ConfigError::invalid(key, "port must be between 1 and 65535"));
    }
    Ok(port)
}

/// Parses an optional port, falling back to `default` when unset or blank.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when a present value is not a port.
pub fn parse_port_or(
    key: &'static str,
    raw: Option<&str>,
    default: u16,
) -> Result<u16, ConfigError> {
    match raw {
        Some(value) if !value.trim().is_empty() => parse_port(key, value),
        _ => Ok(default),
    }
}

/// Parses a float in `[0, 1]`.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the value is not a finite ratio.
pub fn parse_ratio(key: &'static str, raw: &str) -> Result<f64, ConfigError> {
    let value: f64 =
        raw.trim().parse().map_err(|_| ConfigError::invalid(key, "expected a number"))?;
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::invalid(key, "must be between 0 and 1"));
    }
    Ok(value)
}

// ============================================================================
// SECTION: Lists and URLs
// ============================================================================

/// Splits a comma-separated list, trimming entries and dropping blanks.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty()).map(str::to_string).collect()
}

/// Parses an absolute `http` or `https` URL with a host.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the URL is malformed or uses another scheme.
pub fn parse_http_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|err| ConfigError::invalid(key, err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(key, "scheme must be http or https"));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::invalid(key, "URL must include a host"));
    }
    Ok(url)
}

/// Returns true when `raw` looks like `local@domain`.
///
/// Only the shape is checked; deliverability is out of scope.
#[must_use]
pub fn is_email_like(raw: &str) -> bool {
    let value = raw.trim();
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.contains(char::is_whitespace)
}

/// Returns true when `host` names the local machine.
///
/// Covers `localhost` (and its subdomains), loopback IPs, and the unspecified
/// address. Brackets around IPv6 literals are ignored.
#[must_use]
pub fn is_loopback_host(host: &str) -> bool {
    let host = host.trim().trim_start_matches('[').trim_end_matches(']').trim_end_matches('.');
    let lower = host.to_ascii_lowercase();
    if lower == "localhost" || lower.ends_with(".localhost") {
        return true;
    }
    host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback() || ip.is_unspecified())
}

#[cfg(test)]
mod tests {
    use super::is_email_like;
    use super::is_loopback_host;
    use super::parse_flag;
    use super::parse_flag_or;
    use super::parse_http_url;
    use super::parse_platform_flag;
    use super::parse_port;
    use super::parse_ratio;
    use super::split_list;

    #[test]
    fn flags_accept_framework_tokens() {
        assert_eq!(parse_flag("DEBUG", "True"), Ok(true));
        assert_eq!(parse_flag("DEBUG", "false"), Ok(false));
        assert_eq!(parse_flag("DEBUG", " 1 "), Ok(true));
        assert!(parse_flag("DEBUG", "yes").is_err());
        assert_eq!(parse_flag_or("DEBUG", None, false), Ok(false));
        assert_eq!(parse_flag_or("DEBUG", Some(""), true), Ok(true));
    }

    #[test]
    fn platform_flag_requires_exact_one() {
        assert!(parse_platform_flag(Some("1")));
        assert!(!parse_platform_flag(Some("true")));
        assert!(!parse_platform_flag(None));
    }

    #[test]
    fn ports_reject_zero_and_text() {
        assert_eq!(parse_port("DB_PORT", "5432"), Ok(5432));
        assert!(parse_port("DB_PORT", "0").is_err());
        assert!(parse_port("DB_PORT", "postgres").is_err());
        assert!(parse_port("DB_PORT", "70000").is_err());
    }

    #[test]
    fn ratio_is_bounded() {
        assert_eq!(parse_ratio("AI_CONFIDENCE_THRESHOLD", "0.7"), Ok(0.7));
        assert!(parse_ratio("AI_CONFIDENCE_THRESHOLD", "1.5").is_err());
        assert!(parse_ratio("AI_CONFIDENCE_THRESHOLD", "NaN").is_err());
    }

    #[test]
    fn list_split_drops_blanks() {
        assert_eq!(split_list(" a.com, ,b.com,"), vec!["a.com".to_string(), "b.com".to_string()]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn http_urls_only() {
        assert!(parse_http_url("FRONTEND_URL", "https://novyra.agency").is_ok());
        assert!(parse_http_url("FRONTEND_URL", "ftp://novyra.agency").is_err());
        assert!(parse_http_url("FRONTEND_URL", "novyra.agency").is_err());
    }

    #[test]
    fn loopback_detection() {
        assert!(is_loopback_host("localhost"));
        assert!(is_loopback_host("127.0.0.1"));
        assert!(is_loopback_host("[::1]"));
        assert!(is_loopback_host("0.0.0.0"));
        assert!(!is_loopback_host("db.neon.tech"));
    }

    #[test]
    fn email_shape() {
        assert!(is_email_like("admin@novyra.agency"));
        assert!(!is_email_like("admin"));
        assert!(!is_email_like("@novyra.agency"));
        assert!(!is_email_like("ad min@novyra.agency"));
    }
}
