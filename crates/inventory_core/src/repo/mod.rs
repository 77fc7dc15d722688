//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the item data access contract.
//! - Isolate SQLite query details from the async store facade.
//!
//! # Invariants
//! - Field validation is opt-in and applies to writes only.
//! - Update/delete of a missing id reports `false`, never an error.

pub mod item_repo;
