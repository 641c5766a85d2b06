// crates/novyra-cli/src/lib.rs
// ============================================================================
// Module: Novyra Deploy CLI Library
// Description: Shared helpers for the `novyra-deploy` binary.
// Purpose: Expose the message catalog to the binary and its tests.
// Dependencies: Standard library
// ============================================================================

//! ## Overview
//! The `novyra-deploy` binary lives in `main.rs`; this library carries the
//! pieces its integration tests exercise directly.

pub mod i18n;
