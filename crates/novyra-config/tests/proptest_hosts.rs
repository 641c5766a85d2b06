//! Host allow-list property-based tests.
//!
//! ## Purpose
//! Exercise the host-header guard with randomized domains and ports so the
//! subdomain rule cannot admit look-alike hosts and never panics on junk input.
// crates/novyra-config/tests/proptest_hosts.rs
// ============================================================================
// Module: Host Allow-List Property-Based Tests
// Description: Randomized checks for wildcard, subdomain, and exact patterns.
// Purpose: Ensure host matching fails closed on look-alikes and junk input.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use novyra_config::HostAllowList;
use novyra_config::split_host_port;
use proptest::prelude::*;

proptest! {
    #[test]
    fn wildcard_admits_any_well_formed_host(host in "[a-z0-9][a-z0-9.-]{0,29}", port in 1u16..) {
        let list = HostAllowList::wildcard();
        prop_assert!(list.is_allowed(&host));
        let with_port = format!("{host}:{port}");
        prop_assert!(list.is_allowed(&with_port));
    }

    #[test]
    fn subdomain_pattern_admits_base_and_children(
        label in "[a-z][a-z0-9-]{0,9}",
        base in "[a-z]{1,10}\\.[a-z]{2,5}",
        port in 1u16..,
    ) {
        let list = HostAllowList::from_entries([format!(".{base}")]);
        prop_assert!(list.is_allowed(&base));
        let child = format!("{label}.{base}");
        prop_assert!(list.is_allowed(&child));
        let upper = format!("{}:{port}", child.to_ascii_uppercase());
        prop_assert!(list.is_allowed(&upper));
        let look_alike = format!("{label}{base}");
        prop_assert!(!list.is_allowed(&look_alike));
    }

    #[test]
    fn exact_pattern_rejects_other_hosts(
        host in "[a-z]{1,10}\\.[a-z]{2,5}",
        other in "[a-z]{1,10}\\.[a-z]{2,5}",
    ) {
        prop_assume!(host != other);
        let list = HostAllowList::from_entries([host.as_str()]);
        prop_assert!(list.is_allowed(&host));
        prop_assert!(!list.is_allowed(&other));
    }

    #[test]
    fn junk_hosts_never_panic(raw in ".{0,64}") {
        let list = HostAllowList::from_entries(["novyra.agency"]);
        let _ = list.is_allowed(&raw);
        let _ = split_host_port(&raw);
    }
}
