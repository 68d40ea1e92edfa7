//! # Authorization Engine
//!
//! The five authority predicates gating every privileged operation. Each is
//! a pure read over `(AuthContext, CollectiveState, account identities)` and
//! fails with its own named error carrying the offending caller.
//!
//! | Predicate | Success condition |
//! |-----------|-------------------|
//! | `ensure_from_dispatcher` | caller == fixed trusted dispatcher |
//! | `ensure_from_member_or_self` | signer is an active member, OR caller is an active member, OR caller is the account itself |
//! | `ensure_from_initiator` | signer == initiator OR caller == initiator |
//! | `ensure_from_operator` | caller == operator (signer deliberately ignored) |
//! | `ensure_to_whitelisted` | destination whitelisted OR destination == the account |
//!
//! The signer credential lets a dispatcher-relayed, signature-authenticated
//! request satisfy member/initiator checks without the relayer itself being
//! a member. Operator checks ignore the signer so administrative actions stay
//! bound to one fixed identity regardless of relay path.

use crate::domain::entities::CollectiveState;
use crate::domain::value_objects::Address;
use crate::errors::AccountError;

// =============================================================================
// AUTH CONTEXT
// =============================================================================

/// Per-call authorization credentials, snapshotted at entry.
///
/// The ambient signer slot is copied into this value under the state lock
/// before any predicate runs; predicates never read the live slot, so a
/// re-entrant callee cannot influence an in-flight authorization decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthContext {
    /// Direct caller of the entry point.
    pub caller: Address,
    /// Signer recovered by the most recent validation, if any.
    pub signer: Option<Address>,
}

impl AuthContext {
    /// Builds a context from a caller and the current signer slot.
    #[must_use]
    pub const fn new(caller: Address, signer: Option<Address>) -> Self {
        Self { caller, signer }
    }

    /// A context with no signer credential (direct, unrelayed call).
    #[must_use]
    pub const fn direct(caller: Address) -> Self {
        Self {
            caller,
            signer: None,
        }
    }
}

// =============================================================================
// AUTHORIZATION ENGINE
// =============================================================================

/// Evaluates authority predicates against one state snapshot.
///
/// Borrowed per call; holds the fixed identities bound at construction of
/// the account (the account's own identity and the trusted dispatcher).
#[derive(Debug)]
pub struct AuthorizationEngine<'a> {
    state: &'a CollectiveState,
    account: Address,
    dispatcher: Address,
}

impl<'a> AuthorizationEngine<'a> {
    /// Creates an engine over a state snapshot.
    #[must_use]
    pub const fn new(state: &'a CollectiveState, account: Address, dispatcher: Address) -> Self {
        Self {
            state,
            account,
            dispatcher,
        }
    }

    /// Caller must be the fixed trusted dispatcher.
    pub fn ensure_from_dispatcher(&self, ctx: AuthContext) -> Result<(), AccountError> {
        if ctx.caller == self.dispatcher {
            Ok(())
        } else {
            Err(AccountError::OnlyDispatcher(ctx.caller))
        }
    }

    /// Signer or caller must be an active member, or the caller must be the
    /// account itself (self-calls routed through `execute`).
    pub fn ensure_from_member_or_self(&self, ctx: AuthContext) -> Result<(), AccountError> {
        let signer_is_member = ctx.signer.is_some_and(|signer| self.state.is_member(signer));
        if signer_is_member || self.state.is_member(ctx.caller) || ctx.caller == self.account {
            Ok(())
        } else {
            Err(AccountError::OnlyMemberOrSelf(ctx.caller))
        }
    }

    /// Signer or caller must be the initiator.
    pub fn ensure_from_initiator(&self, ctx: AuthContext) -> Result<(), AccountError> {
        let initiator = self.state.initiator();
        if ctx.signer == Some(initiator) || ctx.caller == initiator {
            Ok(())
        } else {
            Err(AccountError::OnlyInitiator(ctx.caller))
        }
    }

    /// Caller must be the operator. Signer-blind: a renounced operator
    /// (`None`) matches no caller, permanently closing this gate.
    pub fn ensure_from_operator(&self, ctx: AuthContext) -> Result<(), AccountError> {
        match self.state.operator() {
            Some(operator) if ctx.caller == operator => Ok(()),
            _ => Err(AccountError::OnlyOperator(ctx.caller)),
        }
    }

    /// Destination must be whitelisted or the account itself.
    pub fn ensure_to_whitelisted(&self, destination: Address) -> Result<(), AccountError> {
        if self.state.is_whitelisted(destination) || destination == self.account {
            Ok(())
        } else {
            Err(AccountError::OnlyWhitelistedTarget(destination))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
