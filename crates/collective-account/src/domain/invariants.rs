//! # Domain Invariants
//!
//! Cross-registry properties that must hold for every reachable
//! `CollectiveState`. Used by tests and diagnostics; the service never needs
//! to re-check these at runtime because its operations preserve them by
//! construction.

use crate::domain::entities::CollectiveState;
use crate::domain::value_objects::Address;

/// A detected invariant violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A registered pool's identity is missing from the whitelist.
    PoolNotWhitelisted(Address),
    /// A registered asset's identity is missing from the whitelist.
    AssetNotWhitelisted(Address),
    /// State carries members, pools, or a signer before initialization.
    PopulatedBeforeInit,
    /// The ambient signer slot names an inactive or unknown member.
    SignerNotMember(Address),
}

/// Every registered pool and its asset must be whitelisted call targets.
#[must_use]
pub fn check_pool_whitelisting(state: &CollectiveState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    for (asset, entry) in state.pools() {
        if !state.is_whitelisted(entry.pool) {
            violations.push(InvariantViolation::PoolNotWhitelisted(entry.pool));
        }
        if !state.is_whitelisted(asset) {
            violations.push(InvariantViolation::AssetNotWhitelisted(asset));
        }
    }
    violations
}

/// An uninitialized state must be empty: no members, pools, or signer.
#[must_use]
pub fn check_empty_before_init(state: &CollectiveState) -> Vec<InvariantViolation> {
    if !state.is_initialized()
        && (state.active_member_count() > 0
            || state.pool_count() > 0
            || state.current_signer().is_some())
    {
        vec![InvariantViolation::PopulatedBeforeInit]
    } else {
        Vec::new()
    }
}

/// A set signer slot must reference an active member. Validation only sets
/// the slot for members, and execute clears it unconditionally, so this can
/// only break if membership was revoked while a dispatch was in flight.
#[must_use]
pub fn check_signer_is_member(state: &CollectiveState) -> Vec<InvariantViolation> {
    match state.current_signer() {
        Some(signer) if !state.is_member(signer) => {
            vec![InvariantViolation::SignerNotMember(signer)]
        }
        _ => Vec::new(),
    }
}

/// Runs every invariant check and collects the violations.
#[must_use]
pub fn check_all(state: &CollectiveState) -> Vec<InvariantViolation> {
    let mut violations = check_pool_whitelisting(state);
    violations.extend(check_empty_before_init(state));
    violations.extend(check_signer_is_member(state));
    violations
}

// =============================================================================
// TESTS
// =============================================================================
