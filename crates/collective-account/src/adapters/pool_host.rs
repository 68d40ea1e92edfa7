//! # Pool Host Adapter
//!
//! In-memory pool collaborator for testing: constructs deterministic pool
//! identities and tracks which pools have been paused.

use crate::domain::signature::keccak256;
use crate::domain::value_objects::{Address, Bytes};
use crate::errors::CalleeFailure;
use crate::ports::outbound::PoolHost;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

/// Programmable in-memory pool collaborator.
#[derive(Debug, Default)]
pub struct InMemoryPoolHost {
    /// (asset, pool) pairs constructed so far, in order.
    constructed: RwLock<Vec<(Address, Address)>>,
    /// Pools currently paused.
    paused: RwLock<HashSet<Address>>,
    /// Pools programmed to revert on pause, with their revert payloads.
    pause_failures: RwLock<HashMap<Address, Bytes>>,
    /// Assets programmed to fail construction.
    construct_failures: RwLock<HashMap<Address, Bytes>>,
}

impl InMemoryPoolHost {
    /// Creates a host where construction and pausing always succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The deterministic pool identity this host derives for `asset`.
    /// Matches what `construct_pool` will return, so tests can predict it.
    #[must_use]
    pub fn derived_pool(asset: Address) -> Address {
        let mut preimage = Vec::with_capacity(5 + 20);
        preimage.extend_from_slice(b"pool:");
        preimage.extend_from_slice(asset.as_bytes());
        let hash = keccak256(&preimage);

        let mut pool = [0u8; 20];
        pool.copy_from_slice(&hash.as_bytes()[12..]);
        Address::new(pool)
    }

    /// Programs pause of `pool` to revert with `revert_data`.
    pub fn fail_pause(&self, pool: Address, revert_data: Bytes) {
        self.pause_failures
            .write()
            .unwrap()
            .insert(pool, revert_data);
    }

    /// Programs construction for `asset` to revert with `revert_data`.
    pub fn fail_construction(&self, asset: Address, revert_data: Bytes) {
        self.construct_failures
            .write()
            .unwrap()
            .insert(asset, revert_data);
    }

    /// Returns true if `pool` has been paused.
    #[must_use]
    pub fn is_paused(&self, pool: Address) -> bool {
        self.paused.read().unwrap().contains(&pool)
    }

    /// (asset, pool) pairs constructed so far.
    #[must_use]
    pub fn constructed(&self) -> Vec<(Address, Address)> {
        self.constructed.read().unwrap().clone()
    }
}

#[async_trait]
impl PoolHost for InMemoryPoolHost {
    async fn construct_pool(&self, asset: Address) -> Result<Address, CalleeFailure> {
        if let Some(revert_data) = self.construct_failures.read().unwrap().get(&asset) {
            return Err(CalleeFailure::new(revert_data.clone()));
        }

        let pool = Self::derived_pool(asset);
        self.constructed.write().unwrap().push((asset, pool));
        Ok(pool)
    }

    async fn pause(&self, pool: Address) -> Result<(), CalleeFailure> {
        if let Some(revert_data) = self.pause_failures.read().unwrap().get(&pool) {
            return Err(CalleeFailure::new(revert_data.clone()));
        }

        self.paused.write().unwrap().insert(pool);
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
