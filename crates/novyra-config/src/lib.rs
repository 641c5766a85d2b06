// crates/novyra-config/src/lib.rs
// ============================================================================
// Module: Novyra Config Library
// Description: Environment contract model, parsing, and artifact generation.
// Purpose: Single source of truth for the deployment environment contract.
// Dependencies: dotenvy, serde, subtle, thiserror, url
// ============================================================================

//! ## Overview
//! `novyra-config` defines the environment-variable contract consumed by the
//! Novyra assistant at process start. It captures raw values from layered
//! sources, resolves them into strict typed [`Settings`], and generates the
//! contract docs and `.env.example` template.
//!
//! Security posture: environment inputs are untrusted and secret values must
//! never appear in errors, docs, or rendered output unless explicitly revealed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod contract;
pub mod cors;
pub mod docs;
pub mod env;
pub mod error;
pub mod examples;
pub mod hosts;
pub mod secret;
pub mod settings;
pub mod values;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use contract::*;
pub use cors::CorsPolicy;
pub use cors::normalize_origin;
pub use cors::origin_is_well_formed;
pub use docs::DocsError;
pub use docs::contract_docs_markdown;
pub use docs::verify_contract_docs;
pub use docs::write_contract_docs;
pub use env::*;
pub use error::ConfigError;
pub use examples::env_example;
pub use hosts::HostAllowList;
pub use hosts::HostPattern;
pub use hosts::normalize_domain;
pub use hosts::split_host_port;
pub use secret::*;
pub use settings::*;
pub use values::*;
