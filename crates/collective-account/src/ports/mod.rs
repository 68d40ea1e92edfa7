//! # Ports
//!
//! Hexagonal boundaries of the account core:
//! - `inbound`: the dispatcher-facing API and the upgrade hook (driving).
//! - `outbound`: external collaborators the core depends on (driven).

pub mod inbound;
pub mod outbound;
