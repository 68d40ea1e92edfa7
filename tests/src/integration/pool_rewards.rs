//! # Pool and Deposit Integration Tests
//!
//! The pool registry and reward-forwarding choreography:
//!
//! 1. **create_pool vs add_pool**: the unguarded-overwrite and
//!    duplicate-guarded registration paths
//! 2. **Reward forwarding**: value moves to the pool, then the pool pauses
//! 3. **Failure modes**: transfer failures vs pause failures
//! 4. **Deposits**: custody delegated to the external balance service

#[cfg(test)]
mod tests {
    use collective_account::prelude::*;

    const ACCOUNT: Address = Address::new([0xAA; 20]);
    const DISPATCHER: Address = Address::new([0xDD; 20]);
    const INITIATOR: Address = Address::new([0x10; 20]);
    const OPERATOR: Address = Address::new([0x20; 20]);

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    async fn initialized_harness() -> TestHarness {
        let harness = create_test_service(AccountConfig {
            account: ACCOUNT,
            dispatcher: DISPATCHER,
        });
        harness
            .service
            .initialize(INITIATOR, OPERATOR)
            .await
            .expect("initialization");
        harness
    }

    // =========================================================================
    // POOL REGISTRATION
    // =========================================================================

    #[tokio::test]
    async fn test_create_pool_constructs_registers_and_whitelists() {
        let harness = initialized_harness().await;
        let asset = addr(0x31);
        let recipient = addr(0x32);

        let pool = harness
            .service
            .create_pool(INITIATOR, asset, recipient)
            .await
            .unwrap();

        assert_eq!(pool, InMemoryPoolHost::derived_pool(asset));
        assert_eq!(harness.pools.constructed(), vec![(asset, pool)]);
        assert_eq!(
            harness.service.pool_for(asset).await,
            Some(PoolEntry::new(pool, recipient))
        );

        let state = harness.service.state_snapshot().await;
        assert!(state.is_whitelisted(pool));
        assert!(state.is_whitelisted(asset));

        assert_eq!(
            harness.events.count_matching(|e| matches!(
                e,
                AccountEvent::PoolAdded { pool: p, asset: a, .. }
                    if *p == pool && *a == asset
            )),
            1
        );
    }

    #[tokio::test]
    async fn test_create_pool_overwrites_prior_binding() {
        let harness = initialized_harness().await;
        let asset = addr(0x31);

        // Register externally first, then create over it. No guard here.
        harness
            .service
            .add_pool(INITIATOR, addr(0x40), asset, addr(0x41))
            .await
            .unwrap();
        let pool = harness
            .service
            .create_pool(INITIATOR, asset, addr(0x42))
            .await
            .unwrap();

        let entry = harness.service.pool_for(asset).await.unwrap();
        assert_eq!(entry.pool, pool);
        assert_eq!(entry.reward_recipient, addr(0x42));
    }

    #[tokio::test]
    async fn test_add_pool_rejects_duplicate_asset() {
        let harness = initialized_harness().await;
        let asset = addr(0x31);
        harness
            .service
            .add_pool(INITIATOR, addr(0x40), asset, addr(0x41))
            .await
            .unwrap();

        // The guarded path names the pool already on file.
        let err = harness
            .service
            .add_pool(INITIATOR, addr(0x50), asset, addr(0x51))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::PoolAlreadyAdded(addr(0x40)));

        // The original binding stands.
        assert_eq!(
            harness.service.pool_for(asset).await.map(|e| e.pool),
            Some(addr(0x40))
        );
    }

    #[tokio::test]
    async fn test_pool_registration_requires_member_or_self() {
        let harness = initialized_harness().await;

        let err = harness
            .service
            .create_pool(addr(0x99), addr(0x31), addr(0x32))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::OnlyMemberOrSelf(addr(0x99)));

        let err = harness
            .service
            .add_pool(addr(0x99), addr(0x40), addr(0x31), addr(0x41))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::OnlyMemberOrSelf(addr(0x99)));

        assert!(harness.pools.constructed().is_empty());
    }

    #[tokio::test]
    async fn test_failed_pool_construction_registers_nothing() {
        let harness = initialized_harness().await;
        let asset = addr(0x31);
        harness
            .pools
            .fail_construction(asset, Bytes::from_slice(b"factory full"));

        let err = harness
            .service
            .create_pool(INITIATOR, asset, addr(0x32))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AccountError::CalleeReverted(Bytes::from_slice(b"factory full"))
        );
        assert_eq!(harness.service.pool_for(asset).await, None);
    }

    // =========================================================================
    // REWARD FORWARDING
    // =========================================================================

    #[tokio::test]
    async fn test_reward_forwarded_then_pool_paused() {
        let harness = initialized_harness().await;
        let asset = addr(0x31);
        let recipient = addr(0x32);
        let pool = harness
            .service
            .create_pool(INITIATOR, asset, recipient)
            .await
            .unwrap();

        // Anyone may route a reward; no authority predicate applies.
        harness
            .service
            .receive_pool_reward(addr(0x99), asset, U256::from(777))
            .await
            .unwrap();

        assert_eq!(harness.calls.received_by(pool), U256::from(777));
        assert!(harness.pools.is_paused(pool));
        assert_eq!(
            harness.events.count_matching(|e| matches!(
                e,
                AccountEvent::RewardForwarded { pool: p, amount, reward_recipient, .. }
                    if *p == pool && *amount == U256::from(777) && *reward_recipient == recipient
            )),
            1
        );
    }

    #[tokio::test]
    async fn test_reward_for_unregistered_asset_rejected() {
        let harness = initialized_harness().await;

        let err = harness
            .service
            .receive_pool_reward(addr(0x99), addr(0x31), U256::from(1))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::PoolNotAdded);
        assert!(harness.calls.records().is_empty());
    }

    #[tokio::test]
    async fn test_failed_transfer_reports_reward_not_sent() {
        let harness = initialized_harness().await;
        let asset = addr(0x31);
        let pool = harness
            .service
            .create_pool(INITIATOR, asset, addr(0x32))
            .await
            .unwrap();
        harness.calls.fail_calls_to(pool, Bytes::from_slice(b"no receive"));

        let err = harness
            .service
            .receive_pool_reward(addr(0x99), asset, U256::from(5))
            .await
            .unwrap_err();

        // A transfer failure is this account's own error, not a verbatim
        // callee propagation, and the pool is never paused.
        assert_eq!(
            err,
            AccountError::PoolRewardNotSent {
                pool,
                asset,
                amount: U256::from(5),
            }
        );
        assert!(!harness.pools.is_paused(pool));
    }

    #[tokio::test]
    async fn test_failed_pause_propagates_verbatim_after_transfer() {
        let harness = initialized_harness().await;
        let asset = addr(0x31);
        let pool = harness
            .service
            .create_pool(INITIATOR, asset, addr(0x32))
            .await
            .unwrap();
        harness
            .pools
            .fail_pause(pool, Bytes::from_slice(b"already paused"));

        let err = harness
            .service
            .receive_pool_reward(addr(0x99), asset, U256::from(5))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AccountError::CalleeReverted(Bytes::from_slice(b"already paused"))
        );
        // The value did move before the pause failed.
        assert_eq!(harness.calls.received_by(pool), U256::from(5));
        // No forwarded event on the failure path.
        assert_eq!(
            harness
                .events
                .count_matching(|e| matches!(e, AccountEvent::RewardForwarded { .. })),
            0
        );
    }

    // =========================================================================
    // DEPOSITS
    // =========================================================================

    #[tokio::test]
    async fn test_deposit_lifecycle() {
        let harness = initialized_harness().await;

        // Anyone may add to the deposit.
        harness
            .service
            .add_deposit(addr(0x99), U256::from(300))
            .await
            .unwrap();
        harness
            .service
            .add_deposit(INITIATOR, U256::from(200))
            .await
            .unwrap();
        assert_eq!(
            harness.service.get_deposit().await.unwrap(),
            U256::from(500)
        );

        // Only the operator may withdraw.
        harness
            .service
            .withdraw_deposit_to(OPERATOR, addr(0x60), U256::from(450))
            .await
            .unwrap();
        assert_eq!(
            harness.service.get_deposit().await.unwrap(),
            U256::from(50)
        );
        assert_eq!(harness.balances.paid_out_to(addr(0x60)), U256::from(450));
    }

    #[tokio::test]
    async fn test_overdraw_surfaces_balance_error() {
        let harness = initialized_harness().await;
        harness
            .service
            .add_deposit(addr(0x99), U256::from(10))
            .await
            .unwrap();

        let err = harness
            .service
            .withdraw_deposit_to(OPERATOR, addr(0x60), U256::from(11))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AccountError::Balance(BalanceError::InsufficientDeposit {
                requested: U256::from(11),
                available: U256::from(10),
            })
        );
    }

    #[tokio::test]
    async fn test_balance_service_outage_surfaces() {
        let harness = initialized_harness().await;
        harness.balances.set_unavailable(true);

        let err = harness.service.get_deposit().await.unwrap_err();
        assert_eq!(err, AccountError::Balance(BalanceError::Unavailable));

        harness.balances.set_unavailable(false);
        assert!(harness.service.get_deposit().await.is_ok());
    }
}
