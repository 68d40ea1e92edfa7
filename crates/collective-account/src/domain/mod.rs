//! # Domain Layer
//!
//! Pure business logic: value objects, the collective's state graph, the
//! authority predicates, signature recovery, and cross-registry invariants.
//! Nothing in this layer performs I/O or talks to a collaborator.

pub mod authorization;
pub mod entities;
pub mod invariants;
pub mod signature;
pub mod value_objects;
