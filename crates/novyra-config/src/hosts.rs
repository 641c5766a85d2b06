// crates/novyra-config/src/hosts.rs
// ============================================================================
// Module: Host Allow-List
// Description: Host-header validation against the ALLOWED_HOSTS patterns.
// Purpose: Predict which request hosts the framework guard will reject.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The web framework rejects any request whose `Host` header is not admitted
//! by `ALLOWED_HOSTS`. [`HostAllowList`] reproduces that guard so a deploy can
//! be checked against the platform-assigned domain before any request arrives.
//!
//! ## Invariants
//! - `*` admits every well-formed host.
//! - `.example.com` admits `example.com` and every subdomain of it.
//! - Any other pattern must match exactly, ignoring ASCII case.
//! - Ports and a trailing dot are stripped from the request host before matching.

// ============================================================================
// SECTION: Patterns
// ============================================================================

/// A single allow-list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostPattern {
    /// `*`: any host.
    Wildcard,
    /// `.domain`: the domain and all of its subdomains (stored without the dot).
    Subdomains(String),
    /// Exact host match (lowercased).
    Exact(String),
}

impl HostPattern {
    /// Parses one allow-list entry; blank input yields `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim().to_ascii_lowercase();
        if value.is_empty() {
            return None;
        }
        if value == "*" {
            return Some(Self::Wildcard);
        }
        if let Some(rest) = value.strip_prefix('.') {
            if rest.is_empty() {
                return None;
            }
            return Some(Self::Subdomains(rest.to_string()));
        }
        Some(Self::Exact(value))
    }

    /// Returns true when this pattern admits the normalised `domain`.
    #[must_use]
    pub fn matches(&self, domain: &str) -> bool {
        match self {
            Self::Wildcard => true,
            Self::Subdomains(base) => {
                domain == base
                    || domain.strip_suffix(base.as_str()).is_some_and(|head| head.ends_with('.'))
            }
            Self::Exact(host) => domain == host,
        }
    }

    /// Renders the pattern in `ALLOWED_HOSTS` syntax.
    #[must_use]
    pub fn as_pattern(&self) -> String {
        match self {
            Self::Wildcard => "*".to_string(),
            Self::Subdomains(base) => format!(".{base}"),
            Self::Exact(host) => host.clone(),
        }
    }
}

// ============================================================================
// SECTION: Allow-List
// ============================================================================

/// Ordered host-header allow-list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostAllowList {
    /// Parsed patterns in configured order.
    patterns: Vec<HostPattern>,
}

impl HostAllowList {
    /// Builds an allow-list from raw entries, dropping blanks.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: entries
                .into_iter()
                .filter_map(|entry| HostPattern::parse(entry.as_ref()))
                .collect(),
        }
    }

    /// Returns an allow-list that admits every host.
    #[must_use]
    pub fn wildcard() -> Self {
        Self {
            patterns: vec![HostPattern::Wildcard],
        }
    }

    /// Returns the configured patterns.
    #[must_use]
    pub fn patterns(&self) -> &[HostPattern] {
        &self.patterns
    }

    /// Returns true when no pattern is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns true when a `*` pattern is present.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.patterns.contains(&HostPattern::Wildcard)
    }

    /// Returns true when the request `Host` header value is admitted.
    ///
    /// Malformed hosts are always rejected.
    #[must_use]
    pub fn is_allowed(&self, host: &str) -> bool {
        let Some((domain, _port)) = split_host_port(host) else {
            return false;
        };
        if domain.is_empty() {
            return false;
        }
        self.patterns.iter().any(|pattern| pattern.matches(&domain))
    }

    /// Renders the allow-list as a comma-separated `ALLOWED_HOSTS` value.
    #[must_use]
    pub fn to_env_value(&self) -> String {
        self.patterns.iter().map(HostPattern::as_pattern).collect::<Vec<_>>().join(",")
    }
}

// ============================================================================
// SECTION: Host Parsing
// ============================================================================

/// Splits a `Host` header value into a lowercased domain and optional port.
///
/// Bracketed IPv6 literals keep their brackets. A trailing dot on the domain
/// is removed. Returns `None` when the port is not numeric or brackets are
/// unbalanced.
#[must_use]
pub fn split_host_port(host: &str) -> Option<(String, Option<u16>)> {
    let host = host.trim().to_ascii_lowercase();
    if host.is_empty() {
        return Some((String::new(), None));
    }
    let (domain, port) = if host.starts_with('[') {
        if host.ends_with(']') {
            (host.as_str(), None)
        } else {
            let idx = host.rfind("]:")?;
            (&host[..=idx], Some(&host[idx + 2..]))
        }
    } else if host.contains(['[', ']']) {
        return None;
    } else {
        match host.rsplit_once(':') {
            Some((domain, port)) => (domain, Some(port)),
            None => (host.as_str(), None),
        }
    };
    let port = match port {
        Some(text) => Some(text.parse::<u16>().ok()?),
        None => None,
    };
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    Some((domain.to_string(), port))
}

/// Reduces a domain or URL (`https://app.vercel.app/`) to its bare host.
#[must_use]
pub fn normalize_domain(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed.split_once("://").map_or(trimmed, |(_, rest)| rest);
    let authority = without_scheme.split(['/', '?', '#']).next().unwrap_or_default();
    split_host_port(authority).map(|(domain, _)| domain).unwrap_or_default()
}
