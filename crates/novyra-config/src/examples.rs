// crates/novyra-config/src/examples.rs
// ============================================================================
// Module: Contract Examples
// Description: Canonical `.env.example` template for the contract.
// Purpose: Deterministic starting point for local and platform setup.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Renders a `.env.example` that lists every contract variable with its
//! description. Secrets are always blank; other variables carry their default.
//! Platform-injected variables are commented out because operators never set
//! them by hand.

use std::fmt::Write;

use crate::contract::ENV_CONTRACT;
use crate::contract::Requirement;
use crate::env::quote_dotenv_value;

/// Returns the canonical `.env.example` document.
#[must_use]
pub fn env_example() -> String {
    let mut out = String::new();
    out.push_str("# Novyra environment contract\n");
    out.push_str("# Copy to .env for local runs; set the same keys in the platform dashboard.\n");
    for spec in ENV_CONTRACT {
        out.push('\n');
        let _ = writeln!(out, "# {} ({})", spec.description, spec.requirement.label());
        let value = if spec.secret { "" } else { spec.default.unwrap_or("") };
        let rendered = if value.is_empty() { String::new() } else { quote_dotenv_value(value) };
        if spec.requirement == Requirement::PlatformInjected {
            let _ = writeln!(out, "# {}={rendered}", spec.name);
        } else {
            let _ = writeln!(out, "{}={rendered}", spec.name);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::env_example;
    use crate::contract::keys;

    #[test]
    fn secrets_are_blank_and_defaults_filled() {
        let example = env_example();
        assert!(example.contains("\nSECRET_KEY=\n"));
        assert!(example.contains("\nDEEPSEEK_API_KEY=\n"));
        assert!(example.contains("\nDB_PORT='5432'\n"));
        assert!(example.contains(&format!("\n# {}=", keys::VERCEL_URL)));
    }
}
