//! Construction-time store configuration.

use crate::repo::item_repo::ConflictPolicy;
use std::path::PathBuf;

/// Where the item table lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Process-lifetime only; discarded on close.
    InMemory,
    /// Persisted SQLite file, survives across sessions.
    File(PathBuf),
}

/// Options fixed when an `ItemStore` is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: StoreLocation,
    /// Run operations inline on the calling task instead of tokio's blocking
    /// pool. Intended for tests; inline calls block the executor thread.
    pub allow_same_thread: bool,
    pub conflict_policy: ConflictPolicy,
    /// Reject blank names, negative or non-finite prices and negative
    /// quantities on insert/update. Off by default.
    pub validate_writes: bool,
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self::at(StoreLocation::InMemory)
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::at(StoreLocation::File(path.into()))
    }

    fn at(location: StoreLocation) -> Self {
        Self {
            location,
            allow_same_thread: false,
            conflict_policy: ConflictPolicy::default(),
            validate_writes: false,
        }
    }

    pub fn with_same_thread(mut self, allow: bool) -> Self {
        self.allow_same_thread = allow;
        self
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    pub fn with_write_validation(mut self, enabled: bool) -> Self {
        self.validate_writes = enabled;
        self
    }

    pub(crate) fn mode(&self) -> &'static str {
        match self.location {
            StoreLocation::InMemory => "memory",
            StoreLocation::File(_) => "file",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreConfig, StoreLocation};
    use crate::repo::item_repo::ConflictPolicy;
    use std::path::PathBuf;

    #[test]
    fn defaults_dispatch_off_thread_and_upsert() {
        let config = StoreConfig::in_memory();
        assert_eq!(config.location, StoreLocation::InMemory);
        assert!(!config.allow_same_thread);
        assert_eq!(config.conflict_policy, ConflictPolicy::Upsert);
        assert!(!config.validate_writes);
    }

    #[test]
    fn setters_chain() {
        let config = StoreConfig::file("/tmp/inventory.db")
            .with_same_thread(true)
            .with_conflict_policy(ConflictPolicy::Reject)
            .with_write_validation(true);
        assert_eq!(
            config.location,
            StoreLocation::File(PathBuf::from("/tmp/inventory.db"))
        );
        assert!(config.allow_same_thread);
        assert_eq!(config.conflict_policy, ConflictPolicy::Reject);
        assert!(config.validate_writes);
        assert_eq!(config.mode(), "file");
    }
}
