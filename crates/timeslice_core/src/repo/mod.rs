//! Repository layer for the entry journal.
//!
//! # Responsibility
//! - Define the data-access contract for submitted entries.
//! - Keep SQL details behind the repository seam.
//!
//! # Invariants
//! - An entry and its task rows are written in one transaction.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod entry_repo;
