//! Domain model for inventory records.
//!
//! # Responsibility
//! - Define canonical data structures stored by the inventory core.
//!
//! # Invariants
//! - Every record is identified by a caller-visible `ItemId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod item;
