//! # Collective Account Service
//!
//! The execution core behind the dispatcher protocol. Wires the
//! authorization engine and registries to the outbound collaborator ports
//! and owns the ambient signer slot's lifecycle.
//!
//! ## Authorization flow
//!
//! dispatcher submits operation + signature -> `validate_operation` recovers
//! the signer and checks membership -> signer slot set -> `execute` /
//! `execute_batch` authorize against the whitelist and perform the calls ->
//! signer slot cleared unconditionally.
//!
//! ## Locking discipline
//!
//! All checks and mutations for one entry point happen under a single lock
//! acquisition; the lock is NEVER held across an outbound collaborator call.
//! Authorization reads a per-call [`AuthContext`] snapshot, so a re-entrant
//! callee can at worst observe an already-consistent state.

use crate::domain::authorization::{AuthContext, AuthorizationEngine};
use crate::domain::entities::{CollectiveState, Operation, PoolEntry, ValidationOutcome};
use crate::domain::signature::recover_signer;
use crate::domain::value_objects::{Address, Bytes, EcdsaSignature, Hash, U256};
use crate::errors::AccountError;
use crate::events::AccountEvent;
use crate::ports::inbound::{CollectiveAccountApi, UpgradeGate};
use crate::ports::outbound::{BalanceService, EventSink, OutboundCalls, PoolHost};

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

// =============================================================================
// CONFIGURATION & STATS
// =============================================================================

/// Identities bound at account construction; neither ever changes.
#[derive(Debug, Clone, Copy)]
pub struct AccountConfig {
    /// This account's own identity (self-calls bypass the whitelist).
    pub account: Address,
    /// The single trusted dispatcher.
    pub dispatcher: Address,
}

/// Counters for the account's entry points.
#[derive(Debug, Default, Clone)]
pub struct AccountStats {
    /// Operations whose signature validated to an active member.
    pub operations_validated: u64,
    /// Operations rejected as `SignatureInvalid`.
    pub validation_rejections: u64,
    /// Outbound calls performed through execute/execute_batch.
    pub calls_executed: u64,
    /// Batches completed successfully.
    pub batches_executed: u64,
    /// Entry points rejected by an authority predicate.
    pub authorization_rejections: u64,
    /// Rewards forwarded to pools.
    pub rewards_forwarded: u64,
}

// =============================================================================
// SERVICE
// =============================================================================

/// The collective account core, generic over its collaborator ports.
pub struct CollectiveAccountService<C, P, B, E>
where
    C: OutboundCalls,
    P: PoolHost,
    B: BalanceService,
    E: EventSink,
{
    /// Fixed identities.
    config: AccountConfig,
    /// Host-chain call primitive.
    calls: Arc<C>,
    /// Pool collaborator.
    pools: Arc<P>,
    /// External balance-holding service.
    balances: Arc<B>,
    /// Notification channel.
    events: Arc<E>,
    /// The collective's state graph.
    state: Arc<RwLock<CollectiveState>>,
    /// Entry-point counters.
    stats: Arc<RwLock<AccountStats>>,
}

impl<C, P, B, E> CollectiveAccountService<C, P, B, E>
where
    C: OutboundCalls,
    P: PoolHost,
    B: BalanceService,
    E: EventSink,
{
    /// Creates a new account core over the given collaborators.
    pub fn new(
        config: AccountConfig,
        calls: Arc<C>,
        pools: Arc<P>,
        balances: Arc<B>,
        events: Arc<E>,
    ) -> Self {
        Self {
            config,
            calls,
            pools,
            balances,
            events,
            state: Arc::new(RwLock::new(CollectiveState::new())),
            stats: Arc::new(RwLock::new(AccountStats::default())),
        }
    }

    /// Current entry-point counters.
    pub async fn stats(&self) -> AccountStats {
        self.stats.read().await.clone()
    }

    /// Read-only snapshot of the collective's state.
    pub async fn state_snapshot(&self) -> CollectiveState {
        self.state.read().await.clone()
    }

    /// Returns true if `id` is an active member.
    pub async fn is_member(&self, id: Address) -> bool {
        self.state.read().await.is_member(id)
    }

    /// The pool entry registered for `asset`, if any.
    pub async fn pool_for(&self, asset: Address) -> Option<PoolEntry> {
        self.state.read().await.pool_for(asset)
    }

    async fn note_authorization_rejection(&self) {
        self.stats.write().await.authorization_rejections += 1;
    }

    // =========================================================================
    // MEMBERSHIP
    // =========================================================================

    /// One-time initialization: sets the operator, sets the initiator, and
    /// activates the initiator as the first member.
    #[instrument(skip(self))]
    pub async fn initialize(
        &self,
        initiator: Address,
        operator: Address,
    ) -> Result<(), AccountError> {
        let mut state = self.state.write().await;
        if state.is_initialized() {
            warn!("initialization attempted twice");
            return Err(AccountError::AlreadyInitialized);
        }

        state.mark_initialized(initiator, operator);
        drop(state);

        info!(?initiator, ?operator, "collective initialized");
        self.events.emit(AccountEvent::CollectiveInitialized {
            initiator,
            operator,
        });
        self.events.emit(AccountEvent::NewMember { member: initiator });
        Ok(())
    }

    /// Enrolls a member. Idempotent: re-adding an active member only
    /// re-emits the notification.
    #[instrument(skip(self))]
    pub async fn add_member(&self, caller: Address, member: Address) -> Result<(), AccountError> {
        let mut state = self.state.write().await;
        let ctx = AuthContext::new(caller, state.current_signer());
        if let Err(err) = self.engine(&state).ensure_from_member_or_self(ctx) {
            drop(state);
            warn!(?caller, "add_member rejected");
            self.note_authorization_rejection().await;
            return Err(err);
        }

        state.enroll_member(member);
        drop(state);

        info!(?member, "member enrolled");
        self.events.emit(AccountEvent::NewMember { member });
        Ok(())
    }

    /// Deactivates a member. Initiator-only. Idempotent.
    ///
    /// Deliberately unguarded beyond the initiator predicate: removing the
    /// initiator itself, or the last remaining member, is permitted and can
    /// leave the collective unable to authorize further membership changes.
    #[instrument(skip(self))]
    pub async fn remove_member(
        &self,
        caller: Address,
        member: Address,
    ) -> Result<(), AccountError> {
        let mut state = self.state.write().await;
        let ctx = AuthContext::new(caller, state.current_signer());
        if let Err(err) = self.engine(&state).ensure_from_initiator(ctx) {
            drop(state);
            warn!(?caller, "remove_member rejected");
            self.note_authorization_rejection().await;
            return Err(err);
        }

        state.revoke_member(member);
        drop(state);

        info!(?member, "member removed");
        self.events.emit(AccountEvent::MemberRemoved { member });
        Ok(())
    }

    /// Clears the operator role irreversibly. Operator-only. Every
    /// operator-gated operation is permanently inaccessible afterward.
    #[instrument(skip(self))]
    pub async fn renounce_operator(&self, caller: Address) -> Result<(), AccountError> {
        let mut state = self.state.write().await;
        let ctx = AuthContext::new(caller, state.current_signer());
        if let Err(err) = self.engine(&state).ensure_from_operator(ctx) {
            drop(state);
            warn!(?caller, "renounce_operator rejected");
            self.note_authorization_rejection().await;
            return Err(err);
        }

        state.clear_operator();
        drop(state);

        info!(?caller, "operator renounced");
        self.events.emit(AccountEvent::OperatorRenounced { caller });
        Ok(())
    }

    // =========================================================================
    // POOL REGISTRY
    // =========================================================================

    /// Constructs a new pool for `asset` and registers it, overwriting any
    /// prior entry for that asset (this path carries no duplicate guard;
    /// `add_pool` is the guarded path). Whitelists pool and asset.
    #[instrument(skip(self))]
    pub async fn create_pool(
        &self,
        caller: Address,
        asset: Address,
        reward_recipient: Address,
    ) -> Result<Address, AccountError> {
        {
            let state = self.state.read().await;
            let ctx = AuthContext::new(caller, state.current_signer());
            if let Err(err) = self.engine(&state).ensure_from_member_or_self(ctx) {
                drop(state);
                warn!(?caller, "create_pool rejected");
                self.note_authorization_rejection().await;
                return Err(err);
            }
        }

        // Lock released: pool construction is an outbound collaborator call.
        let pool = self.pools.construct_pool(asset).await?;

        let mut state = self.state.write().await;
        state.register_pool(asset, PoolEntry::new(pool, reward_recipient));
        drop(state);

        info!(?pool, ?asset, "pool created");
        self.events.emit(AccountEvent::PoolAdded {
            pool,
            asset,
            reward_recipient,
        });
        Ok(pool)
    }

    /// Registers an externally constructed pool. Unlike `create_pool`, this
    /// path rejects a duplicate asset with the pool already on file.
    #[instrument(skip(self))]
    pub async fn add_pool(
        &self,
        caller: Address,
        pool: Address,
        asset: Address,
        reward_recipient: Address,
    ) -> Result<(), AccountError> {
        let mut state = self.state.write().await;
        let ctx = AuthContext::new(caller, state.current_signer());
        if let Err(err) = self.engine(&state).ensure_from_member_or_self(ctx) {
            drop(state);
            warn!(?caller, "add_pool rejected");
            self.note_authorization_rejection().await;
            return Err(err);
        }

        if let Some(existing) = state.pool_for(asset) {
            return Err(AccountError::PoolAlreadyAdded(existing.pool));
        }

        state.register_pool(asset, PoolEntry::new(pool, reward_recipient));
        drop(state);

        info!(?pool, ?asset, "pool added");
        self.events.emit(AccountEvent::PoolAdded {
            pool,
            asset,
            reward_recipient,
        });
        Ok(())
    }

    /// Forwards a received reward to the pool registered for `asset`, then
    /// pauses the pool. Callable by anyone carrying value.
    #[instrument(skip(self))]
    pub async fn receive_pool_reward(
        &self,
        caller: Address,
        asset: Address,
        amount: U256,
    ) -> Result<(), AccountError> {
        let entry = self
            .state
            .read()
            .await
            .pool_for(asset)
            .ok_or(AccountError::PoolNotAdded)?;

        // Forward the value. A failed transfer is this core's error, not a
        // verbatim callee propagation.
        if self
            .calls
            .call(entry.pool, amount, &Bytes::new())
            .await
            .is_err()
        {
            warn!(pool = ?entry.pool, ?asset, %amount, "reward transfer failed");
            return Err(AccountError::PoolRewardNotSent {
                pool: entry.pool,
                asset,
                amount,
            });
        }

        // Pause the pool; its failure fails the whole forward, verbatim.
        self.pools.pause(entry.pool).await?;

        self.stats.write().await.rewards_forwarded += 1;
        info!(pool = ?entry.pool, ?asset, %amount, "reward forwarded, pool paused");
        self.events.emit(AccountEvent::RewardForwarded {
            pool: entry.pool,
            asset,
            amount,
            reward_recipient: entry.reward_recipient,
        });
        Ok(())
    }

    // =========================================================================
    // DISPATCHER PROTOCOL
    // =========================================================================

    /// Validates a relayed operation's signature. See
    /// [`CollectiveAccountApi::validate_operation`].
    #[instrument(skip(self, operation, signature), fields(nonce = operation.nonce))]
    pub async fn handle_validate_operation(
        &self,
        caller: Address,
        operation: &Operation,
        digest: Hash,
        signature: &EcdsaSignature,
    ) -> Result<ValidationOutcome, AccountError> {
        let mut state = self.state.write().await;
        let ctx = AuthContext::new(caller, state.current_signer());
        if let Err(err) = self.engine(&state).ensure_from_dispatcher(ctx) {
            drop(state);
            warn!(?caller, "validate_operation rejected");
            self.note_authorization_rejection().await;
            return Err(err);
        }

        match recover_signer(&digest, signature) {
            Some(signer) if state.is_member(signer) => {
                state.set_current_signer(signer);
                drop(state);

                self.stats.write().await.operations_validated += 1;
                debug!(?signer, "operation validated");
                self.events.emit(AccountEvent::NewSigner { signer });
                Ok(ValidationOutcome::Validated)
            }
            recovered => {
                // Non-member or failed recovery: a typed rejection, not an
                // error, and the signer slot stays untouched.
                drop(state);
                self.stats.write().await.validation_rejections += 1;
                debug!(?recovered, "operation signature invalid");
                Ok(ValidationOutcome::SignatureInvalid)
            }
        }
    }

    /// Performs one authorized outbound call. See
    /// [`CollectiveAccountApi::execute`].
    #[instrument(skip(self, payload))]
    pub async fn handle_execute(
        &self,
        caller: Address,
        destination: Address,
        value: U256,
        payload: &Bytes,
    ) -> Result<Bytes, AccountError> {
        let authorized = {
            let state = self.state.read().await;
            let ctx = AuthContext::new(caller, state.current_signer());
            let engine = self.engine(&state);
            engine
                .ensure_from_dispatcher(ctx)
                .and_then(|()| engine.ensure_to_whitelisted(destination))
        };

        let result = match authorized {
            Ok(()) => self
                .calls
                .call(destination, value, payload)
                .await
                .map_err(AccountError::from),
            Err(err) => {
                warn!(?caller, ?destination, "execute rejected");
                self.note_authorization_rejection().await;
                Err(err)
            }
        };

        // One-shot authorization lifetime: the signer credential dies with
        // this dispatch, success or failure.
        self.state.write().await.clear_current_signer();

        if result.is_ok() {
            self.stats.write().await.calls_executed += 1;
            debug!(?destination, %value, "call executed");
        }
        result
    }

    /// Performs a batch of authorized outbound calls. See
    /// [`CollectiveAccountApi::execute_batch`].
    #[instrument(skip(self, destinations, values, payloads), fields(calls = destinations.len()))]
    pub async fn handle_execute_batch(
        &self,
        caller: Address,
        destinations: &[Address],
        values: &[U256],
        payloads: &[Bytes],
    ) -> Result<Vec<Bytes>, AccountError> {
        let result = self
            .execute_batch_inner(caller, destinations, values, payloads)
            .await;

        // Cleared once at the end, success or failure.
        self.state.write().await.clear_current_signer();

        if result.is_ok() {
            let mut stats = self.stats.write().await;
            stats.batches_executed += 1;
            stats.calls_executed += destinations.len() as u64;
        }
        result
    }

    async fn execute_batch_inner(
        &self,
        caller: Address,
        destinations: &[Address],
        values: &[U256],
        payloads: &[Bytes],
    ) -> Result<Vec<Bytes>, AccountError> {
        {
            let state = self.state.read().await;
            let ctx = AuthContext::new(caller, state.current_signer());
            if let Err(err) = self.engine(&state).ensure_from_dispatcher(ctx) {
                drop(state);
                warn!(?caller, "execute_batch rejected");
                self.note_authorization_rejection().await;
                return Err(err);
            }
        }

        // Shape checks precede every call. An empty values slice is the
        // explicit low-cost path: zero value for every call.
        if destinations.len() != payloads.len()
            || (!values.is_empty() && values.len() != payloads.len())
        {
            return Err(AccountError::InvalidArrayLengths {
                destinations: destinations.len(),
                values: values.len(),
                payloads: payloads.len(),
            });
        }

        let mut outputs = Vec::with_capacity(destinations.len());
        for (index, (destination, payload)) in destinations.iter().zip(payloads).enumerate() {
            {
                let state = self.state.read().await;
                self.engine(&state).ensure_to_whitelisted(*destination)?;
            }

            let value = values.get(index).copied().unwrap_or_else(U256::zero);
            // First failure aborts the whole batch, verbatim.
            let output = self.calls.call(*destination, value, payload).await?;
            outputs.push(output);
        }

        Ok(outputs)
    }

    // =========================================================================
    // DEPOSIT MANAGEMENT
    // =========================================================================

    /// Forwards received value to the balance-holding service, crediting
    /// this account's deposit. Callable by anyone.
    #[instrument(skip(self))]
    pub async fn add_deposit(&self, caller: Address, amount: U256) -> Result<(), AccountError> {
        self.balances
            .deposit_to(self.config.account, amount)
            .await?;
        debug!(%amount, "deposit added");
        Ok(())
    }

    /// Instructs the balance-holding service to pay out from this account's
    /// deposit. Operator-only.
    #[instrument(skip(self))]
    pub async fn withdraw_deposit_to(
        &self,
        caller: Address,
        destination: Address,
        amount: U256,
    ) -> Result<(), AccountError> {
        {
            let state = self.state.read().await;
            let ctx = AuthContext::new(caller, state.current_signer());
            if let Err(err) = self.engine(&state).ensure_from_operator(ctx) {
                drop(state);
                warn!(?caller, "withdraw_deposit_to rejected");
                self.note_authorization_rejection().await;
                return Err(err);
            }
        }

        self.balances
            .withdraw_to(self.config.account, destination, amount)
            .await?;
        info!(?destination, %amount, "deposit withdrawn");
        Ok(())
    }

    /// This account's deposit on file with the balance-holding service.
    pub async fn get_deposit(&self) -> Result<U256, AccountError> {
        Ok(self.balances.balance_of(self.config.account).await?)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn engine<'a>(&self, state: &'a CollectiveState) -> AuthorizationEngine<'a> {
        AuthorizationEngine::new(state, self.config.account, self.config.dispatcher)
    }
}

// =============================================================================
// PORT IMPLEMENTATIONS
// =============================================================================

#[async_trait]
impl<C, P, B, E> CollectiveAccountApi for CollectiveAccountService<C, P, B, E>
where
    C: OutboundCalls,
    P: PoolHost,
    B: BalanceService,
    E: EventSink,
{
    async fn validate_operation(
        &self,
        caller: Address,
        operation: &Operation,
        digest: Hash,
        signature: &EcdsaSignature,
    ) -> Result<ValidationOutcome, AccountError> {
        self.handle_validate_operation(caller, operation, digest, signature)
            .await
    }

    async fn execute(
        &self,
        caller: Address,
        destination: Address,
        value: U256,
        payload: &Bytes,
    ) -> Result<Bytes, AccountError> {
        self.handle_execute(caller, destination, value, payload)
            .await
    }

    async fn execute_batch(
        &self,
        caller: Address,
        destinations: &[Address],
        values: &[U256],
        payloads: &[Bytes],
    ) -> Result<Vec<Bytes>, AccountError> {
        self.handle_execute_batch(caller, destinations, values, payloads)
            .await
    }
}

#[async_trait]
impl<C, P, B, E> UpgradeGate for CollectiveAccountService<C, P, B, E>
where
    C: OutboundCalls,
    P: PoolHost,
    B: BalanceService,
    E: EventSink,
{
    async fn authorize_upgrade(
        &self,
        caller: Address,
        new_code: Hash,
    ) -> Result<(), AccountError> {
        let state = self.state.read().await;
        let ctx = AuthContext::new(caller, state.current_signer());
        if let Err(err) = self.engine(&state).ensure_from_operator(ctx) {
            drop(state);
            warn!(?caller, "upgrade rejected");
            self.note_authorization_rejection().await;
            return Err(err);
        }
        drop(state);

        info!(?new_code, "upgrade authorized");
        Ok(())
    }
}

// =============================================================================
// TEST HARNESS
// =============================================================================

/// A service wired to in-memory adapters, with handles to each one.
pub struct TestHarness {
    /// The service under test.
    pub service: CollectiveAccountService<
        crate::adapters::InMemoryCallRouter,
        crate::adapters::InMemoryPoolHost,
        crate::adapters::InMemoryBalanceService,
        crate::adapters::InMemoryEventLog,
    >,
    /// Call collaborator handle.
    pub calls: Arc<crate::adapters::InMemoryCallRouter>,
    /// Pool collaborator handle.
    pub pools: Arc<crate::adapters::InMemoryPoolHost>,
    /// Balance service handle.
    pub balances: Arc<crate::adapters::InMemoryBalanceService>,
    /// Event log handle.
    pub events: Arc<crate::adapters::InMemoryEventLog>,
}

/// Builds a service over fresh in-memory adapters.
#[must_use]
pub fn create_test_service(config: AccountConfig) -> TestHarness {
    let calls = Arc::new(crate::adapters::InMemoryCallRouter::new());
    let pools = Arc::new(crate::adapters::InMemoryPoolHost::new());
    let balances = Arc::new(crate::adapters::InMemoryBalanceService::new());
    let events = Arc::new(crate::adapters::InMemoryEventLog::new());

    let service = CollectiveAccountService::new(
        config,
        Arc::clone(&calls),
        Arc::clone(&pools),
        Arc::clone(&balances),
        Arc::clone(&events),
    );

    TestHarness {
        service,
        calls,
        pools,
        balances,
        events,
    }
}

// =============================================================================
// TESTS
// =============================================================================
