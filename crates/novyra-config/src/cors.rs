// crates/novyra-config/src/cors.rs
// ============================================================================
// Module: CORS Policy
// Description: Cross-origin allow-list derived from CORS_ALLOWED_ORIGINS.
// Purpose: Evaluate browser origins the same way the deployed API will.
// Dependencies: url
// ============================================================================

//! ## Overview
//! Browser callers are admitted when their `Origin` header matches the
//! configured list exactly after normalisation. Debug deployments admit every
//! origin. Credentials are always allowed on admitted origins.

use url::Url;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Cross-origin policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Every origin is admitted.
    AllowAll,
    /// Only the listed origins (normalised) are admitted.
    Origins(Vec<String>),
}

impl CorsPolicy {
    /// Builds an origin list policy from raw entries, dropping blanks.
    pub fn from_origins<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Origins(
            origins
                .into_iter()
                .map(|origin| normalize_origin(origin.as_ref()))
                .filter(|origin| !origin.is_empty())
                .collect(),
        )
    }

    /// Returns true when `origin` is admitted.
    #[must_use]
    pub fn allows(&self, origin: &str) -> bool {
        match self {
            Self::AllowAll => true,
            Self::Origins(list) => {
                let origin = normalize_origin(origin);
                !origin.is_empty() && list.iter().any(|entry| *entry == origin)
            }
        }
    }

    /// Returns true when credentials are sent on admitted requests.
    #[must_use]
    pub const fn allows_credentials(&self) -> bool {
        true
    }

    /// Returns the configured origins; empty for [`CorsPolicy::AllowAll`].
    #[must_use]
    pub fn origins(&self) -> &[String] {
        match self {
            Self::AllowAll => &[],
            Self::Origins(list) => list,
        }
    }
}

// ============================================================================
// SECTION: Origin Helpers
// ============================================================================

/// Lowercases scheme and host and removes trailing slashes.
#[must_use]
pub fn normalize_origin(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    match trimmed.split_once("://") {
        Some((scheme, authority)) => {
            format!("{}://{}", scheme.to_ascii_lowercase(), authority.to_ascii_lowercase())
        }
        None => trimmed.to_ascii_lowercase(),
    }
}

/// Returns true when `raw` has the `scheme://host[:port]` origin shape.
///
/// The scheme must be `http` or `https`. Paths, queries, fragments, and
/// credentials are rejected; a single trailing slash is tolerated.
#[must_use]
pub fn origin_is_well_formed(raw: &str) -> bool {
    let trimmed = raw.trim();
    let Some((_, authority)) = trimmed.split_once("://") else {
        return false;
    };
    let authority = authority.strip_suffix('/').unwrap_or(authority);
    if authority.is_empty() || authority.contains(['/', '?', '#', '@']) {
        return false;
    }
    let Ok(url) = Url::parse(trimmed) else {
        return false;
    };
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|host| !host.is_empty())
}
