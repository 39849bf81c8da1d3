//! Domain model for the time-entry allocation session.
//!
//! # Responsibility
//! - Define the canonical allocation state mutated by the reconciler.
//! - Keep lifecycle rules (row add/remove, lock coherence) in one place.
//!
//! # Invariants
//! - Every allocation unit is identified by a stable `UnitId`.
//! - A session always holds at least one unit.

pub mod session;
pub mod unit;
