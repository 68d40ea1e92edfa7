//! # Driven Ports (Outbound)
//!
//! Interfaces the account core depends on. Adapters implement these traits
//! to provide:
//! - outbound call delivery (the host chain's call primitive)
//! - pool construction and pausing
//! - the external balance-holding service
//! - the notification channel
//!
//! Each collaborator is capability-typed on its own trait so tests can
//! simulate success and failure of each one independently.

use crate::domain::value_objects::{Address, Bytes, U256};
use crate::errors::{BalanceError, CalleeFailure};
use crate::events::AccountEvent;
use async_trait::async_trait;

// =============================================================================
// OUTBOUND CALLS (host-chain call primitive)
// =============================================================================

/// Delivers one outbound call carrying value and payload.
///
/// A failing callee reports a [`CalleeFailure`] whose revert payload the
/// core re-raises verbatim; the adapter must not rewrite or wrap it.
#[async_trait]
pub trait OutboundCalls: Send + Sync {
    /// Performs one call to `destination` carrying `value` and `payload`.
    ///
    /// # Errors
    ///
    /// Returns the callee's failure with its exact revert payload.
    async fn call(
        &self,
        destination: Address,
        value: U256,
        payload: &Bytes,
    ) -> Result<Bytes, CalleeFailure>;
}

// =============================================================================
// POOL HOST (pool collaborator interface)
// =============================================================================

/// The pool collaborator: constructs asset-bound pools and pauses them.
///
/// `pause` is trusted to either succeed or fail the whole reward-forward
/// operation; the core propagates its failure verbatim.
#[async_trait]
pub trait PoolHost: Send + Sync {
    /// Instantiates a new pool bound to `asset`, returning its identity.
    ///
    /// # Errors
    ///
    /// Returns the construction failure with its revert payload.
    async fn construct_pool(&self, asset: Address) -> Result<Address, CalleeFailure>;

    /// Invokes `pause()` on a pool.
    ///
    /// # Errors
    ///
    /// Returns the pool's failure with its revert payload.
    async fn pause(&self, pool: Address) -> Result<(), CalleeFailure>;
}

// =============================================================================
// BALANCE SERVICE (external balance-holding service)
// =============================================================================

/// The external service holding this account's deposit.
#[async_trait]
pub trait BalanceService: Send + Sync {
    /// Credits `amount` to `account`'s deposit.
    ///
    /// # Errors
    ///
    /// Returns [`BalanceError::Unavailable`] if the service cannot be reached.
    async fn deposit_to(&self, account: Address, amount: U256) -> Result<(), BalanceError>;

    /// Transfers `amount` from this account's deposit to `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`BalanceError::InsufficientDeposit`] when the deposit does
    /// not cover `amount`.
    async fn withdraw_to(
        &self,
        account: Address,
        destination: Address,
        amount: U256,
    ) -> Result<(), BalanceError>;

    /// Reads `account`'s deposit on file.
    ///
    /// # Errors
    ///
    /// Returns [`BalanceError::Unavailable`] if the service cannot be reached.
    async fn balance_of(&self, account: Address) -> Result<U256, BalanceError>;
}

// =============================================================================
// EVENT SINK (notification channel)
// =============================================================================

/// Append-only notification channel. Implementations must preserve emission
/// order; the core emits exactly one event per state transition.
pub trait EventSink: Send + Sync {
    /// Publishes one event.
    fn emit(&self, event: AccountEvent);
}

// =============================================================================
// TESTS
// =============================================================================
