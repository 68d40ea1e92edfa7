//! # Driving Ports (Inbound)
//!
//! The surfaces external hosts call into:
//! - `CollectiveAccountApi`: the dispatcher protocol (validate, execute,
//!   execute batch).
//! - `UpgradeGate`: the single authorization hook the upgrade host invokes
//!   before swapping the account's code.
//!
//! Every method takes the direct caller's identity explicitly; the host
//! environment is responsible for authenticating it.

use crate::domain::entities::{Operation, ValidationOutcome};
use crate::domain::value_objects::{Address, Bytes, EcdsaSignature, Hash, U256};
use crate::errors::AccountError;
use async_trait::async_trait;

// =============================================================================
// DISPATCHER PROTOCOL
// =============================================================================

/// The dispatcher-facing execution API.
///
/// The dispatcher identity is fixed at account construction; all three entry
/// points reject other callers with [`AccountError::OnlyDispatcher`].
#[async_trait]
pub trait CollectiveAccountApi: Send + Sync {
    /// Validates a relayed operation's signature.
    ///
    /// Returns a typed outcome, not an error: an invalid signature or a
    /// non-member signer yields [`ValidationOutcome::SignatureInvalid`] so
    /// the dispatcher can reject cheaply without unwinding. On success the
    /// signer slot is set for the upcoming execute.
    ///
    /// # Errors
    ///
    /// Rejects non-dispatcher callers.
    async fn validate_operation(
        &self,
        caller: Address,
        operation: &Operation,
        digest: Hash,
        signature: &EcdsaSignature,
    ) -> Result<ValidationOutcome, AccountError>;

    /// Performs one authorized outbound call.
    ///
    /// # Errors
    ///
    /// Rejects non-dispatcher callers and non-whitelisted destinations;
    /// re-raises callee failures verbatim. The signer slot is cleared after
    /// every invocation regardless of outcome.
    async fn execute(
        &self,
        caller: Address,
        destination: Address,
        value: U256,
        payload: &Bytes,
    ) -> Result<Bytes, AccountError>;

    /// Performs a batch of authorized outbound calls in array order.
    ///
    /// An empty `values` slice means zero value for every call; otherwise
    /// `values.len()` must equal `payloads.len()`, and `destinations.len()`
    /// must always equal `payloads.len()`.
    ///
    /// # Errors
    ///
    /// Rejects non-dispatcher callers; rejects shape mismatches with
    /// [`AccountError::InvalidArrayLengths`] before any call executes; the
    /// first failing call aborts the batch and propagates verbatim. The
    /// signer slot is cleared once at the end, success or failure.
    async fn execute_batch(
        &self,
        caller: Address,
        destinations: &[Address],
        values: &[U256],
        payloads: &[Bytes],
    ) -> Result<Vec<Bytes>, AccountError>;
}

// =============================================================================
// UPGRADE GATE
// =============================================================================

/// Pre-upgrade authorization hook.
///
/// Invoked by the upgrade host before swapping the account's code while
/// preserving its storage. Only the authority check lives here; storage
/// layout rules are the host's concern.
#[async_trait]
pub trait UpgradeGate: Send + Sync {
    /// Authorizes an upgrade to `new_code`.
    ///
    /// # Errors
    ///
    /// Rejects every caller except the operator; permanently rejects
    /// everyone once the operator has renounced.
    async fn authorize_upgrade(&self, caller: Address, new_code: Hash)
        -> Result<(), AccountError>;
}
