//! # Balance Service Adapter
//!
//! In-memory double for the external balance-holding service.

use crate::domain::value_objects::{Address, U256};
use crate::errors::BalanceError;
use crate::ports::outbound::BalanceService;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// In-memory deposit ledger with a switchable outage mode.
#[derive(Debug, Default)]
pub struct InMemoryBalanceService {
    /// Deposit on file per account.
    balances: RwLock<HashMap<Address, U256>>,
    /// Total paid out per destination (withdrawals leave the ledger).
    paid_out: RwLock<HashMap<Address, U256>>,
    /// When set, every request fails with `Unavailable`.
    unavailable: AtomicBool,
}

impl InMemoryBalanceService {
    /// Creates an empty, reachable service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates (or lifts) a service outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Total paid out to `destination` via withdrawals.
    #[must_use]
    pub fn paid_out_to(&self, destination: Address) -> U256 {
        self.paid_out
            .read()
            .unwrap()
            .get(&destination)
            .copied()
            .unwrap_or_else(U256::zero)
    }

    fn check_reachable(&self) -> Result<(), BalanceError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(BalanceError::Unavailable)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BalanceService for InMemoryBalanceService {
    async fn deposit_to(&self, account: Address, amount: U256) -> Result<(), BalanceError> {
        self.check_reachable()?;

        let mut balances = self.balances.write().unwrap();
        let balance = balances.entry(account).or_insert_with(U256::zero);
        *balance = balance.saturating_add(amount);
        Ok(())
    }

    async fn withdraw_to(
        &self,
        account: Address,
        destination: Address,
        amount: U256,
    ) -> Result<(), BalanceError> {
        self.check_reachable()?;

        let mut balances = self.balances.write().unwrap();
        let available = balances.get(&account).copied().unwrap_or_else(U256::zero);
        if available < amount {
            return Err(BalanceError::InsufficientDeposit {
                requested: amount,
                available,
            });
        }
        balances.insert(account, available - amount);
        drop(balances);

        let mut paid_out = self.paid_out.write().unwrap();
        let total = paid_out.entry(destination).or_insert_with(U256::zero);
        *total = total.saturating_add(amount);
        Ok(())
    }

    async fn balance_of(&self, account: Address) -> Result<U256, BalanceError> {
        self.check_reachable()?;

        Ok(self
            .balances
            .read()
            .unwrap()
            .get(&account)
            .copied()
            .unwrap_or_else(U256::zero))
    }
}

// =============================================================================
// TESTS
// =============================================================================
