//! Live query handles.
//!
//! # Invariants
//! - The first `next()` yields the state at subscription time.
//! - Every later `next()` waits for a write that changed a row, then re-reads.
//! - Once the store is closed, `next()` yields `None`.

use super::{ItemStore, StoreError, StoreResult};
use crate::repo::item_repo::{RepoResult, SqliteItemRepository};
use std::sync::Arc;
use tokio::sync::watch;

pub(crate) type Fetch<T> =
    Arc<dyn Fn(&SqliteItemRepository<'_>) -> RepoResult<T> + Send + Sync + 'static>;

pub(crate) fn fetch<T, F>(f: F) -> Fetch<T>
where
    F: Fn(&SqliteItemRepository<'_>) -> RepoResult<T> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Continuously updating query result.
///
/// Dropping the handle cancels the subscription.
pub struct LiveQuery<T> {
    store: ItemStore,
    changes: Option<watch::Receiver<u64>>,
    fetch: Fetch<T>,
    primed: bool,
}

impl<T: Send + 'static> LiveQuery<T> {
    pub(crate) fn new(store: ItemStore, fetch: Fetch<T>) -> Self {
        let changes = store.subscribe();
        Self {
            store,
            changes,
            fetch,
            primed: false,
        }
    }

    /// Waits for the next snapshot.
    ///
    /// Returns `None` when the store has been closed.
    pub async fn next(&mut self) -> Option<StoreResult<T>> {
        let was_primed = self.primed;
        if was_primed {
            let changes = self.changes.as_mut()?;
            if changes.changed().await.is_err() {
                self.changes = None;
                return None;
            }
        } else {
            self.primed = true;
            if let Some(changes) = self.changes.as_mut() {
                changes.borrow_and_update();
            }
        }

        let fetch = Arc::clone(&self.fetch);
        match self.store.read(move |repo| fetch(repo)).await {
            Err(StoreError::Closed) if was_primed => {
                self.changes = None;
                None
            }
            snapshot => Some(snapshot),
        }
    }

    /// Consumes the query and returns its first snapshot.
    pub async fn first(mut self) -> StoreResult<T> {
        self.next().await.unwrap_or(Err(StoreError::Closed))
    }
}
