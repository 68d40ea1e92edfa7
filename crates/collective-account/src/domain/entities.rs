//! # Domain Entities
//!
//! The collective's state graph and the operation descriptor relayed by the
//! dispatcher. One account instance exclusively owns one `CollectiveState`;
//! nothing here is shared across instances.

use crate::domain::signature::keccak256;
use crate::domain::value_objects::{Address, Bytes, Hash};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// POOL ENTRY
// =============================================================================

/// Registry entry binding an asset to its pool and reward recipient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    /// Identity of the pool contract bound to the asset.
    pub pool: Address,
    /// Identity that reward notifications reference.
    pub reward_recipient: Address,
}

impl PoolEntry {
    /// Creates a new pool entry.
    #[must_use]
    pub const fn new(pool: Address, reward_recipient: Address) -> Self {
        Self {
            pool,
            reward_recipient,
        }
    }
}

// =============================================================================
// COLLECTIVE STATE
// =============================================================================

/// The whole mutable state of one collective account:
/// membership, whitelist, pool registry, roles, and the ambient signer slot.
///
/// ## Invariants
///
/// - `initialized` transitions false -> true exactly once.
/// - `initiator` is set at initialization and never reassigned (it can still
///   lose membership through `revoke_member`).
/// - `operator` is `Some` from initialization until renounced, then `None`
///   forever; there is no recovery path.
/// - Registering a pool whitelists both the pool and its asset.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CollectiveState {
    /// One-time lifecycle guard.
    initialized: bool,
    /// Founding member with exclusive removal authority.
    initiator: Address,
    /// Administrative identity; `None` once renounced.
    operator: Option<Address>,
    /// Member identity -> active flag. Removal deactivates, never deletes.
    members: HashMap<Address, bool>,
    /// Destination identity -> allowed for outbound calls.
    whitelisted: HashMap<Address, bool>,
    /// Asset identity -> pool binding.
    pools: HashMap<Address, PoolEntry>,
    /// Transient signer recovered from the most recent validated signature.
    current_signer: Option<Address>,
}

impl CollectiveState {
    /// Creates an empty, uninitialized state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once `mark_initialized` has run.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Applies the one-time initialization transition. The caller (service)
    /// is responsible for rejecting a second initialization first.
    pub fn mark_initialized(&mut self, initiator: Address, operator: Address) {
        self.initialized = true;
        self.initiator = initiator;
        self.operator = Some(operator);
        self.members.insert(initiator, true);
    }

    /// The founding member.
    #[must_use]
    pub const fn initiator(&self) -> Address {
        self.initiator
    }

    /// The administrative identity, if not renounced.
    #[must_use]
    pub const fn operator(&self) -> Option<Address> {
        self.operator
    }

    /// Clears the operator role irreversibly.
    pub fn clear_operator(&mut self) {
        self.operator = None;
    }

    /// Returns true if `id` is an active member.
    #[must_use]
    pub fn is_member(&self, id: Address) -> bool {
        self.members.get(&id).copied().unwrap_or(false)
    }

    /// Activates membership for `id`. Idempotent.
    pub fn enroll_member(&mut self, id: Address) {
        self.members.insert(id, true);
    }

    /// Deactivates membership for `id`. Idempotent; no floor on remaining
    /// members and no special-casing of the initiator.
    pub fn revoke_member(&mut self, id: Address) {
        self.members.insert(id, false);
    }

    /// Number of currently active members.
    #[must_use]
    pub fn active_member_count(&self) -> usize {
        self.members.values().filter(|active| **active).count()
    }

    /// Returns true if `id` is an allowed outbound call target.
    #[must_use]
    pub fn is_whitelisted(&self, id: Address) -> bool {
        self.whitelisted.get(&id).copied().unwrap_or(false)
    }

    /// Marks `id` as an allowed outbound call target.
    pub fn whitelist(&mut self, id: Address) {
        self.whitelisted.insert(id, true);
    }

    /// Looks up the pool entry for an asset.
    #[must_use]
    pub fn pool_for(&self, asset: Address) -> Option<PoolEntry> {
        self.pools.get(&asset).copied()
    }

    /// Binds `asset` to `entry`, overwriting any prior binding, and
    /// whitelists both the pool and the asset. Duplicate guarding (when
    /// required) happens at the service layer.
    pub fn register_pool(&mut self, asset: Address, entry: PoolEntry) {
        self.pools.insert(asset, entry);
        self.whitelist(entry.pool);
        self.whitelist(asset);
    }

    /// The ambient signer slot.
    #[must_use]
    pub const fn current_signer(&self) -> Option<Address> {
        self.current_signer
    }

    /// Sets the ambient signer slot after a successful validation.
    pub fn set_current_signer(&mut self, signer: Address) {
        self.current_signer = Some(signer);
    }

    /// Clears the ambient signer slot. Runs after every execute path,
    /// success or failure: one-shot-per-dispatch authorization lifetime.
    pub fn clear_current_signer(&mut self) {
        self.current_signer = None;
    }

    /// Iterator over registered (asset, entry) pairs.
    pub fn pools(&self) -> impl Iterator<Item = (Address, PoolEntry)> + '_ {
        self.pools.iter().map(|(asset, entry)| (*asset, *entry))
    }

    /// Number of registered pools.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }
}

// =============================================================================
// OPERATION DESCRIPTOR
// =============================================================================

/// An operation descriptor submitted by the dispatcher alongside a
/// precomputed digest and a member signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Account the operation targets.
    pub sender: Address,
    /// Anti-replay sequence number, maintained by the dispatcher.
    pub nonce: u64,
    /// Encoded call the dispatcher will execute if validation succeeds.
    pub call_data: Bytes,
}

impl Operation {
    /// Creates a new operation descriptor.
    #[must_use]
    pub fn new(sender: Address, nonce: u64, call_data: Bytes) -> Self {
        Self {
            sender,
            nonce,
            call_data,
        }
    }

    /// Computes the canonical digest the dispatcher signs over:
    /// keccak256(sender || nonce_be || keccak256(call_data)).
    #[must_use]
    pub fn digest(&self) -> Hash {
        let inner = keccak256(self.call_data.as_slice());
        let mut preimage = Vec::with_capacity(20 + 8 + 32);
        preimage.extend_from_slice(self.sender.as_bytes());
        preimage.extend_from_slice(&self.nonce.to_be_bytes());
        preimage.extend_from_slice(inner.as_bytes());
        keccak256(&preimage)
    }
}

// =============================================================================
// VALIDATION OUTCOME
// =============================================================================

/// Result of signature validation, consumed by the dispatcher to decide
/// whether to proceed. Deliberately a value, not an error: the dispatcher
/// rejects cheaply without unwinding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationOutcome {
    /// Signature recovered to an active member; the signer slot is set.
    Validated,
    /// Malformed signature or non-member signer; the signer slot is untouched.
    SignatureInvalid,
}

impl ValidationOutcome {
    /// Returns true for `Validated`.
    #[must_use]
    pub const fn is_validated(&self) -> bool {
        matches!(self, Self::Validated)
    }
}

// =============================================================================
// TESTS
// =============================================================================
