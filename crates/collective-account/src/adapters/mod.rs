//! # Adapters
//!
//! In-memory implementations of the outbound ports, used by the test suites
//! to simulate each external collaborator independently. Production adapters
//! would translate these ports to the host chain and the event bus.

pub mod balance_service;
pub mod call_router;
pub mod event_log;
pub mod pool_host;

pub use balance_service::InMemoryBalanceService;
pub use call_router::{CallRecord, InMemoryCallRouter};
pub use event_log::InMemoryEventLog;
pub use pool_host::InMemoryPoolHost;
