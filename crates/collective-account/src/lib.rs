//! # Collective Account - Multi-Party Authorization Core
//!
//! A multi-party controlled account: a group of members jointly controls one
//! on-chain identity through a trusted dispatcher. Members sign operations
//! off-chain; the dispatcher relays them here for signature validation and,
//! once validated, drives whitelist-gated execution against external targets.
//!
//! ## Authority Predicates
//!
//! | Predicate | Grants | Enforcement |
//! |-----------|--------|-------------|
//! | from dispatcher | validate, execute, execute batch | `domain/authorization.rs` - `ensure_from_dispatcher()` |
//! | from member or self | membership/pool mutation | `domain/authorization.rs` - `ensure_from_member_or_self()` |
//! | from initiator | member removal | `domain/authorization.rs` - `ensure_from_initiator()` |
//! | from operator | deposit withdrawal, renounce, upgrade | `domain/authorization.rs` - `ensure_from_operator()` |
//! | to whitelisted | outbound call targets | `domain/authorization.rs` - `ensure_to_whitelisted()` |
//!
//! ## Outbound Collaborators
//!
//! | Collaborator | Trait | Purpose |
//! |--------------|-------|---------|
//! | Host chain | `OutboundCalls` | Value transfer and call delivery |
//! | Pool host | `PoolHost` | Pool construction and pausing |
//! | Balance service | `BalanceService` | External deposit custody |
//! | Event bus | `EventSink` | Notifications under `events::topics` |
//!
//! ## Signer Lifecycle
//!
//! `validate_operation` recovers the ECDSA signer from an operation digest
//! and, if it is an active member, arms the ambient signer slot. The slot is
//! consumed by the next `execute`/`execute_batch` and cleared unconditionally
//! when that call returns, success or failure.
//!
//! ## Usage Example
//!
//! ```ignore
//! use collective_account::prelude::*;
//!
//! let harness = create_test_service(AccountConfig { account, dispatcher });
//! harness.service.initialize(initiator, operator).await?;
//!
//! let outcome = harness
//!     .service
//!     .validate_operation(dispatcher, &operation, digest, &signature)
//!     .await?;
//! if outcome.is_validated() {
//!     let output = harness
//!         .service
//!         .execute(dispatcher, destination, value, &payload)
//!         .await?;
//! }
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{CollectiveState, Operation, PoolEntry, ValidationOutcome};

    // Value objects
    pub use crate::domain::value_objects::{Address, Bytes, EcdsaSignature, Hash, U256};

    // Domain services
    pub use crate::domain::authorization::{AuthContext, AuthorizationEngine};
    pub use crate::domain::signature::{keccak256, recover_signer, signed_operation_digest};

    // Invariants
    pub use crate::domain::invariants::{check_all, InvariantViolation};

    // Ports
    pub use crate::ports::inbound::{CollectiveAccountApi, UpgradeGate};
    pub use crate::ports::outbound::{BalanceService, EventSink, OutboundCalls, PoolHost};

    // Events
    pub use crate::events::{topics, AccountEvent};

    // Errors
    pub use crate::errors::{AccountError, BalanceError, CalleeFailure};

    // Adapters
    pub use crate::adapters::{
        CallRecord, InMemoryBalanceService, InMemoryCallRouter, InMemoryEventLog, InMemoryPoolHost,
    };

    // Service
    pub use crate::service::{
        create_test_service, AccountConfig, AccountStats, CollectiveAccountService, TestHarness,
    };
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
