//! # Call Router Adapter
//!
//! In-memory outbound-call collaborator for testing. Production adapters
//! would hand calls to the host chain's call primitive.

use crate::domain::value_objects::{Address, Bytes, U256};
use crate::errors::CalleeFailure;
use crate::ports::outbound::OutboundCalls;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// One delivered call, as observed by the router.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRecord {
    /// Call destination.
    pub destination: Address,
    /// Value carried.
    pub value: U256,
    /// Payload carried.
    pub payload: Bytes,
}

/// Programmable in-memory call collaborator.
///
/// Every destination succeeds with an empty return by default. Individual
/// destinations can be programmed to revert with arbitrary payloads or to
/// return fixed data. Delivered value is credited per destination.
#[derive(Debug, Default)]
pub struct InMemoryCallRouter {
    /// Every call delivered, in order.
    records: RwLock<Vec<CallRecord>>,
    /// Destinations programmed to revert, with their revert payloads.
    reverts: RwLock<HashMap<Address, Bytes>>,
    /// Destinations programmed to return fixed data.
    returns: RwLock<HashMap<Address, Bytes>>,
    /// Total value credited per destination.
    received: RwLock<HashMap<Address, U256>>,
}

impl InMemoryCallRouter {
    /// Creates a router where every call succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Programs `destination` to revert with `revert_data`.
    pub fn fail_calls_to(&self, destination: Address, revert_data: Bytes) {
        self.reverts
            .write()
            .unwrap()
            .insert(destination, revert_data);
    }

    /// Clears a programmed revert for `destination`.
    pub fn restore_calls_to(&self, destination: Address) {
        self.reverts.write().unwrap().remove(&destination);
    }

    /// Programs `destination` to return `data` on success.
    pub fn set_return_data(&self, destination: Address, data: Bytes) {
        self.returns.write().unwrap().insert(destination, data);
    }

    /// All calls delivered so far, in order.
    #[must_use]
    pub fn records(&self) -> Vec<CallRecord> {
        self.records.read().unwrap().clone()
    }

    /// Number of calls delivered to `destination`.
    #[must_use]
    pub fn calls_to(&self, destination: Address) -> usize {
        self.records
            .read()
            .unwrap()
            .iter()
            .filter(|record| record.destination == destination)
            .count()
    }

    /// Total value credited to `destination`.
    #[must_use]
    pub fn received_by(&self, destination: Address) -> U256 {
        self.received
            .read()
            .unwrap()
            .get(&destination)
            .copied()
            .unwrap_or_else(U256::zero)
    }
}

#[async_trait]
impl OutboundCalls for InMemoryCallRouter {
    async fn call(
        &self,
        destination: Address,
        value: U256,
        payload: &Bytes,
    ) -> Result<Bytes, CalleeFailure> {
        self.records.write().unwrap().push(CallRecord {
            destination,
            value,
            payload: payload.clone(),
        });

        if let Some(revert_data) = self.reverts.read().unwrap().get(&destination) {
            return Err(CalleeFailure::new(revert_data.clone()));
        }

        let mut received = self.received.write().unwrap();
        let credited = received.entry(destination).or_insert_with(U256::zero);
        *credited = credited.saturating_add(value);
        drop(received);

        Ok(self
            .returns
            .read()
            .unwrap()
            .get(&destination)
            .cloned()
            .unwrap_or_default())
    }
}

// =============================================================================
// TESTS
// =============================================================================
