//! # Error Types
//!
//! The rejection taxonomy for the collective account. Every variant is a
//! distinct, non-retryable rejection of the current call; there is no retry
//! anywhere in this core. State mutates only after every authorization and
//! input-shape check passes, so no failure path leaves partial mutation.

use crate::domain::value_objects::{Address, Bytes, U256};
use thiserror::Error;

// =============================================================================
// ACCOUNT ERRORS
// =============================================================================

/// Errors raised by the account's entry points.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// Initialization attempted more than once.
    #[error("already initialized")]
    AlreadyInitialized,

    /// execute/execute_batch/validate invoked by a non-dispatcher.
    #[error("caller is not the dispatcher: {0:?}")]
    OnlyDispatcher(Address),

    /// Membership/pool mutation invoked without member, signer, or self
    /// authority.
    #[error("caller is not a member or the account itself: {0:?}")]
    OnlyMemberOrSelf(Address),

    /// Member removal attempted by someone other than the initiator.
    #[error("caller is not the initiator: {0:?}")]
    OnlyInitiator(Address),

    /// Operator-gated action by a non-operator (or after renunciation).
    #[error("caller is not the operator: {0:?}")]
    OnlyOperator(Address),

    /// Outbound call to a destination outside the whitelist.
    #[error("target is not whitelisted: {0:?}")]
    OnlyWhitelistedTarget(Address),

    /// Duplicate pool registration through the guarded path. Carries the
    /// pool already bound to the asset.
    #[error("pool already added: {0:?}")]
    PoolAlreadyAdded(Address),

    /// Reward routed to an asset with no registered pool.
    #[error("pool not added")]
    PoolNotAdded,

    /// Forwarding the reward value to the pool failed.
    #[error("pool reward not sent: pool {pool:?}, asset {asset:?}, amount {amount}")]
    PoolRewardNotSent {
        /// Pool the transfer targeted.
        pool: Address,
        /// Asset the reward was routed for.
        asset: Address,
        /// Amount that failed to transfer.
        amount: U256,
    },

    /// Batch argument arrays disagree in length.
    #[error(
        "invalid array lengths: {destinations} destinations, {values} values, {payloads} payloads"
    )]
    InvalidArrayLengths {
        /// Number of destinations supplied.
        destinations: usize,
        /// Number of values supplied (0 means zero value for every call).
        values: usize,
        /// Number of payloads supplied.
        payloads: usize,
    },

    /// A callee failed; its revert payload is re-raised verbatim, never
    /// wrapped or rewritten.
    #[error("callee reverted: {0:?}")]
    CalleeReverted(Bytes),

    /// The external balance-holding service rejected the request.
    #[error("balance service error: {0}")]
    Balance(#[from] BalanceError),
}

// =============================================================================
// COLLABORATOR FAILURES
// =============================================================================

/// Failure of an outbound call, carrying the callee's exact revert payload.
///
/// This crosses the `OutboundCalls`/`PoolHost` port boundary and converts
/// into [`AccountError::CalleeReverted`] without modification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalleeFailure {
    /// Verbatim revert payload from the callee.
    pub revert_data: Bytes,
}

impl CalleeFailure {
    /// Creates a failure carrying the callee's revert payload.
    #[must_use]
    pub fn new(revert_data: Bytes) -> Self {
        Self { revert_data }
    }

    /// Creates a failure with an empty revert payload.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            revert_data: Bytes::new(),
        }
    }
}

impl From<CalleeFailure> for AccountError {
    fn from(failure: CalleeFailure) -> Self {
        AccountError::CalleeReverted(failure.revert_data)
    }
}

/// Errors from the external balance-holding service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BalanceError {
    /// Withdrawal exceeds the deposit on file.
    #[error("insufficient deposit: requested {requested}, available {available}")]
    InsufficientDeposit {
        /// Amount requested.
        requested: U256,
        /// Deposit currently on file.
        available: U256,
    },

    /// The balance service could not be reached.
    #[error("balance service unavailable")]
    Unavailable,
}

// =============================================================================
// TESTS
// =============================================================================
