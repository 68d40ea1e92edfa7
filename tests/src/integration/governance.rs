//! # Governance Integration Tests
//!
//! Membership and role lifecycle driven through the full service:
//!
//! 1. **Initialization**: one-time transition, initiator becomes first member
//! 2. **Member-or-self authority**: direct member calls, self-calls, and the
//!    validated-signer path through the dispatcher
//! 3. **Initiator authority**: survives the initiator's own loss of membership
//! 4. **Operator renunciation**: irreversibly disables every operator gate

#[cfg(test)]
mod tests {
    use collective_account::domain::signature::test_helpers::{generate_keypair, sign_digest};
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
    // INITIALIZATION
    // =========================================================================

    #[tokio::test]
    async fn test_initialization_announces_collective_and_first_member() {
        let harness = initialized_harness().await;

        assert!(harness.service.is_member(INITIATOR).await);
        assert_eq!(
            harness.events.events(),
            vec![
                AccountEvent::CollectiveInitialized {
                    initiator: INITIATOR,
                    operator: OPERATOR,
                },
                AccountEvent::NewMember { member: INITIATOR },
            ]
        );
    }

    #[tokio::test]
    async fn test_second_initialization_rejected_without_state_change() {
        let harness = initialized_harness().await;

        let err = harness
            .service
            .initialize(addr(0x99), addr(0x98))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::AlreadyInitialized);

        // The original roles are untouched.
        let state = harness.service.state_snapshot().await;
        assert_eq!(state.initiator(), INITIATOR);
        assert_eq!(state.operator(), Some(OPERATOR));
        assert!(!harness.service.is_member(addr(0x99)).await);
    }

    #[tokio::test]
    async fn test_operator_has_no_member_authority_by_default() {
        let harness = initialized_harness().await;

        // The operator role alone grants no membership powers.
        let err = harness
            .service
            .add_member(OPERATOR, addr(5))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::OnlyMemberOrSelf(OPERATOR));
    }

    // =========================================================================
    // MEMBER-OR-SELF AUTHORITY
    // =========================================================================

    #[tokio::test]
    async fn test_validated_signer_grants_member_authority_to_dispatcher() {
        let harness = initialized_harness().await;

        // Enroll a keyed member, then have it sign an operation.
        let (key, signer) = generate_keypair();
        harness
            .service
            .add_member(INITIATOR, signer)
            .await
            .unwrap();

        let op = Operation::new(ACCOUNT, 1, Bytes::from_slice(b"add member"));
        let sig = sign_digest(&op.digest(), &key);
        let outcome = harness
            .service
            .handle_validate_operation(DISPATCHER, &op, op.digest(), &sig)
            .await
            .unwrap();
        assert!(outcome.is_validated());

        // The dispatcher itself is no member, but the armed signer slot
        // carries the member's authority.
        harness
            .service
            .add_member(DISPATCHER, addr(7))
            .await
            .unwrap();
        assert!(harness.service.is_member(addr(7)).await);
    }

    #[tokio::test]
    async fn test_dispatcher_without_armed_signer_has_no_member_authority() {
        let harness = initialized_harness().await;

        let err = harness
            .service
            .add_member(DISPATCHER, addr(7))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::OnlyMemberOrSelf(DISPATCHER));
    }

    #[tokio::test]
    async fn test_revoked_member_loses_authority_until_reenrolled() {
        let harness = initialized_harness().await;
        harness.service.add_member(INITIATOR, addr(5)).await.unwrap();
        harness
            .service
            .remove_member(INITIATOR, addr(5))
            .await
            .unwrap();

        let err = harness
            .service
            .add_member(addr(5), addr(6))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::OnlyMemberOrSelf(addr(5)));

        // Re-enrollment restores the authority.
        harness.service.add_member(INITIATOR, addr(5)).await.unwrap();
        harness.service.add_member(addr(5), addr(6)).await.unwrap();
        assert!(harness.service.is_member(addr(6)).await);
    }

    // =========================================================================
    // INITIATOR AUTHORITY
    // =========================================================================

    #[tokio::test]
    async fn test_initiator_authority_survives_losing_membership() {
        let harness = initialized_harness().await;
        harness.service.add_member(INITIATOR, addr(5)).await.unwrap();

        // The initiator removes itself; the role is not membership.
        harness
            .service
            .remove_member(INITIATOR, INITIATOR)
            .await
            .unwrap();
        assert!(!harness.service.is_member(INITIATOR).await);

        // Removal authority persists.
        harness
            .service
            .remove_member(INITIATOR, addr(5))
            .await
            .unwrap();
        assert!(!harness.service.is_member(addr(5)).await);
    }

    #[tokio::test]
    async fn test_removing_last_member_is_permitted() {
        let harness = initialized_harness().await;

        harness
            .service
            .remove_member(INITIATOR, INITIATOR)
            .await
            .unwrap();
        assert_eq!(
            harness.service.state_snapshot().await.active_member_count(),
            0
        );

        // With no members left, member-gated operations are unreachable.
        let err = harness
            .service
            .add_member(INITIATOR, INITIATOR)
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::OnlyMemberOrSelf(INITIATOR));

        // Only a self-call can repopulate the collective.
        harness
            .service
            .add_member(ACCOUNT, INITIATOR)
            .await
            .unwrap();
        assert!(harness.service.is_member(INITIATOR).await);
    }

    // =========================================================================
    // OPERATOR LIFECYCLE
    // =========================================================================

    #[tokio::test]
    async fn test_renounce_is_irreversible() {
        let harness = initialized_harness().await;

        harness.service.renounce_operator(OPERATOR).await.unwrap();
        assert_eq!(harness.service.state_snapshot().await.operator(), None);
        assert_eq!(
            harness.events.count_matching(|e| matches!(
                e,
                AccountEvent::OperatorRenounced { caller } if *caller == OPERATOR
            )),
            1
        );

        // Every operator gate now matches nobody, the old operator included.
        let err = harness
            .service
            .renounce_operator(OPERATOR)
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::OnlyOperator(OPERATOR));

        let err = harness
            .service
            .withdraw_deposit_to(OPERATOR, addr(9), U256::from(1))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::OnlyOperator(OPERATOR));

        let err = harness
            .service
            .authorize_upgrade(OPERATOR, Hash::new([1u8; 32]))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::OnlyOperator(OPERATOR));
    }

    #[tokio::test]
    async fn test_upgrade_gate_accepts_operator_only() {
        let harness = initialized_harness().await;
        let code = Hash::new([7u8; 32]);

        assert_eq!(
            harness
                .service
                .authorize_upgrade(INITIATOR, code)
                .await
                .unwrap_err(),
            AccountError::OnlyOperator(INITIATOR)
        );
        assert!(harness.service.authorize_upgrade(OPERATOR, code).await.is_ok());
    }
}
