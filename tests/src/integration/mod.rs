//! Cross-module choreography tests, driving the account core end to end
//! through its public ports against the in-memory collaborators.

pub mod governance;
pub mod pool_rewards;
