// crates/novyra-preflight/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared snapshots and option builders for preflight tests.
// Purpose: Start every scenario from an environment that passes cleanly.
// Dependencies: novyra-config, novyra-preflight
// ============================================================================

//! ## Overview
//! [`clean_pairs`] describes a deploy that produces no findings on the server
//! target for [`DEPLOYED_DOMAIN`]. Scenarios change a few variables and assert
//! on the resulting codes.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

use novyra_config::EnvSnapshot;
use novyra_config::SMTP_EMAIL_BACKEND;
use novyra_config::keys;
use novyra_preflight::Diagnostic;
use novyra_preflight::PreflightOptions;
use novyra_preflight::Target;

/// Signing key that passes every strength heuristic.
pub const STRONG_SECRET_KEY: &str = "q8#Lm2!vZx9@Rt4$Wp7^Ny1&Ks6*Hd3(Jf5)Gb0-Cu8=Ea2+Yo7";
/// Domain the fixtures deploy to.
pub const DEPLOYED_DOMAIN: &str = "novyra.vercel.app";

/// Returns a deployable environment as pairs.
#[must_use]
pub fn clean_pairs() -> Vec<(&'static str, String)> {
    vec![
        (keys::SECRET_KEY, STRONG_SECRET_KEY.to_string()),
        (keys::DEBUG, "False".to_string()),
        (keys::ALLOWED_HOSTS, "novyra.vercel.app,.novyra.agency".to_string()),
        (keys::DB_ENGINE, "postgresql".to_string()),
        (keys::DB_NAME, "novyra".to_string()),
        (keys::DB_USER, "novyra_app".to_string()),
        (keys::DB_PASSWORD, "pg-password".to_string()),
        (keys::DB_HOST, "db.example.net".to_string()),
        (keys::DB_PORT, "5432".to_string()),
        (keys::DEEPSEEK_API_KEY, "sk-test-key".to_string()),
        (keys::CORS_ALLOWED_ORIGINS, "https://novyra.agency".to_string()),
        (keys::EMAIL_BACKEND, SMTP_EMAIL_BACKEND.to_string()),
        (keys::EMAIL_HOST_USER, "mailer@novyra.agency".to_string()),
        (keys::EMAIL_HOST_PASSWORD, "smtp-password".to_string()),
        (keys::FRONTEND_URL, "https://novyra.agency".to_string()),
        (keys::EMBED_BASE_URL, "https://novyra.agency".to_string()),
    ]
}

/// Returns the clean environment with `overrides` applied.
///
/// An empty override value removes the key.
#[must_use]
pub fn snapshot_with(overrides: &[(&'static str, &str)]) -> EnvSnapshot {
    let mut pairs = clean_pairs();
    for (key, value) in overrides {
        pairs.retain(|(existing, _)| existing != key);
        if !value.is_empty() {
            pairs.push((*key, (*value).to_string()));
        }
    }
    EnvSnapshot::from_pairs(pairs).expect("fixture snapshot")
}

/// Returns options for `target` deploying to [`DEPLOYED_DOMAIN`].
#[must_use]
pub fn options_for(target: Target) -> PreflightOptions {
    PreflightOptions {
        target,
        domain: Some(DEPLOYED_DOMAIN.to_string()),
        ..PreflightOptions::default()
    }
}

/// Returns the codes of `diagnostics` in order.
#[must_use]
pub fn codes_of(diagnostics: &[Diagnostic]) -> Vec<&'static str> {
    diagnostics.iter().map(|diagnostic| diagnostic.code).collect()
}
