// crates/novyra-config/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared snapshot fixtures for config tests.
// Purpose: Provide a valid production environment to mutate per test.
// Dependencies: novyra-config
// ============================================================================

//! ## Overview
//! Fixtures describe a deployable production environment. Tests start from it
//! and change one variable at a time.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

use novyra_config::EnvSnapshot;
use novyra_config::keys;

/// Signing key that passes every strength heuristic.
pub const STRONG_SECRET_KEY: &str = "q8#Lm2!vZx9@Rt4$Wp7^Ny1&Ks6*Hd3(Jf5)Gb0-Cu8=Ea2+Yo7";

/// Returns a complete production environment as pairs.
#[must_use]
pub fn production_pairs() -> Vec<(&'static str, String)> {
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
        (keys::CORS_ALLOWED_ORIGINS, "https://novyra.agency,https://www.novyra.agency".to_string()),
    ]
}

/// Returns the production environment with `overrides` applied.
///
/// An empty override value removes the key.
#[must_use]
pub fn snapshot_with(overrides: &[(&'static str, &str)]) -> EnvSnapshot {
    let mut pairs = production_pairs();
    for (key, value) in overrides {
        pairs.retain(|(existing, _)| existing != key);
        if !value.is_empty() {
            pairs.push((*key, (*value).to_string()));
        }
    }
    EnvSnapshot::from_pairs(pairs).expect("fixture snapshot")
}
