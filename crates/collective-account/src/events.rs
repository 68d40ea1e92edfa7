//! # Observable Events
//!
//! Append-only notifications emitted exactly once per corresponding state
//! transition, published through the `EventSink` outbound port.

use crate::domain::value_objects::{Address, U256};
use serde::{Deserialize, Serialize};

// =============================================================================
// ACCOUNT EVENTS
// =============================================================================

/// Externally observable notifications from the collective account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountEvent {
    /// One-time initialization completed.
    CollectiveInitialized {
        /// The founding member.
        initiator: Address,
        /// The administrative identity.
        operator: Address,
    },

    /// A member was enrolled (re-emitted on idempotent re-adds).
    NewMember {
        /// The enrolled identity.
        member: Address,
    },

    /// A member was deactivated.
    MemberRemoved {
        /// The deactivated identity.
        member: Address,
    },

    /// A pool was registered for an asset (either registration path).
    PoolAdded {
        /// The pool's identity.
        pool: Address,
        /// The asset the pool is bound to.
        asset: Address,
        /// The reward recipient on file.
        reward_recipient: Address,
    },

    /// A reward was forwarded to a pool, which was then paused.
    RewardForwarded {
        /// The pool that received the value.
        pool: Address,
        /// The asset the reward was routed for.
        asset: Address,
        /// The forwarded amount.
        amount: U256,
        /// The reward recipient on file at forwarding time.
        reward_recipient: Address,
    },

    /// The operator role was irreversibly renounced.
    OperatorRenounced {
        /// The operator that renounced.
        caller: Address,
    },

    /// A signature validated to an active member; the signer slot was set.
    NewSigner {
        /// The recovered signer.
        signer: Address,
    },
}

// =============================================================================
// EVENT BUS TOPICS
// =============================================================================

/// Topics for publishing account notifications to an event bus.
pub mod topics {
    /// Initialization notifications.
    pub const COLLECTIVE_INITIALIZED: &str = "collective_account.initialized";

    /// Membership change notifications.
    pub const MEMBERSHIP: &str = "collective_account.membership";

    /// Pool registration notifications.
    pub const POOL_ADDED: &str = "collective_account.pool.added";

    /// Reward forwarding notifications.
    pub const REWARD_FORWARDED: &str = "collective_account.pool.reward";

    /// Operator lifecycle notifications.
    pub const OPERATOR: &str = "collective_account.operator";

    /// Signer slot notifications.
    pub const SIGNER: &str = "collective_account.signer";
}

impl AccountEvent {
    /// The bus topic this event publishes on.
    #[must_use]
    pub const fn topic(&self) -> &'static str {
        match self {
            Self::CollectiveInitialized { .. } => topics::COLLECTIVE_INITIALIZED,
            Self::NewMember { .. } | Self::MemberRemoved { .. } => topics::MEMBERSHIP,
            Self::PoolAdded { .. } => topics::POOL_ADDED,
            Self::RewardForwarded { .. } => topics::REWARD_FORWARDED,
            Self::OperatorRenounced { .. } => topics::OPERATOR,
            Self::NewSigner { .. } => topics::SIGNER,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
