//! Async item store with live queries.
//!
//! # Responsibility
//! - Own the single `items` table for one session.
//! - Expose awaitable CRUD operations and live list/get queries.
//! - Notify live queries after every write that changed a row.
//!
//! # Invariants
//! - One connection per store, guarded by a mutex; operations are serialized.
//! - Lifecycle is `open -> closed`, irreversible. Operations on a closed
//!   store return `StoreError::Closed`.
//! - Update/delete of a missing id is a silent no-op.

mod config;
mod live;

pub use config::{StoreConfig, StoreLocation};
pub use live::LiveQuery;

use crate::db::{close_db, open_db, open_db_in_memory, DbError};
use crate::model::item::{Item, ItemId};
use crate::repo::item_repo::{ItemRepository, RepoError, RepoResult, SqliteItemRepository};
use live::fetch;
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error surfaced by `ItemStore` operations.
#[derive(Debug)]
pub enum StoreError {
    Repo(RepoError),
    Db(DbError),
    /// The store was closed before the operation ran.
    Closed,
    /// The blocking task running the operation failed or no runtime was found.
    Background(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Closed => write!(f, "item store is closed"),
            Self::Background(message) => write!(f, "store background task failed: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Closed | Self::Background(_) => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

struct Shared {
    conn: Mutex<Option<Connection>>,
    changes: Mutex<Option<watch::Sender<u64>>>,
    config: StoreConfig,
}

impl Shared {
    fn repo<'conn>(&self, conn: &'conn Connection) -> SqliteItemRepository<'conn> {
        SqliteItemRepository::with_policy(conn, self.config.conflict_policy)
            .validating(self.config.validate_writes)
    }

    fn with_repo<T>(
        &self,
        f: impl FnOnce(&SqliteItemRepository<'_>) -> RepoResult<T>,
    ) -> StoreResult<T> {
        let guard = self.conn.lock();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        let repo = self.repo(conn);
        Ok(f(&repo)?)
    }

    /// Runs a write and bumps the revision before the connection is released,
    /// so a woken observer always reads the new state.
    fn with_repo_write<T>(
        &self,
        f: impl FnOnce(&SqliteItemRepository<'_>) -> RepoResult<(T, bool)>,
    ) -> StoreResult<T> {
        let guard = self.conn.lock();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        let repo = self.repo(conn);
        let (value, changed) = f(&repo)?;
        if changed {
            if let Some(changes) = self.changes.lock().as_ref() {
                changes.send_modify(|revision| *revision = revision.wrapping_add(1));
            }
        }
        Ok(value)
    }
}

/// Session-scoped store for inventory items.
///
/// Cheap to clone; clones share one connection and one change feed.
#[derive(Clone)]
pub struct ItemStore {
    shared: Arc<Shared>,
}

impl ItemStore {
    /// Opens the backing database and applies migrations.
    ///
    /// # Errors
    /// - `StoreError::Db` when the database cannot be opened or migrated.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        let conn = match &config.location {
            StoreLocation::InMemory => open_db_in_memory()?,
            StoreLocation::File(path) => open_db(path)?,
        };
        let (changes, _) = watch::channel(0_u64);

        info!(
            "event=store_open module=store status=ok mode={} same_thread={} conflict_policy={:?} validate_writes={}",
            config.mode(),
            config.allow_same_thread,
            config.conflict_policy,
            config.validate_writes
        );

        Ok(Self {
            shared: Arc::new(Shared {
                conn: Mutex::new(Some(conn)),
                changes: Mutex::new(Some(changes)),
                config,
            }),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.shared.config
    }

    pub fn is_closed(&self) -> bool {
        self.shared.conn.lock().is_none()
    }

    /// Inserts an item with a caller-assigned id.
    ///
    /// A colliding id follows the configured `ConflictPolicy`.
    pub async fn insert(&self, item: &Item) -> StoreResult<()> {
        let item = item.clone();
        let id = item.id;
        self.write(move |repo| repo.insert_item(&item).map(|()| ((), true)))
            .await?;
        debug!("event=item_insert module=store status=ok id={id}");
        Ok(())
    }

    /// Inserts an item and returns the id assigned by storage.
    pub async fn insert_generated(
        &self,
        name: impl Into<String>,
        price: f64,
        quantity: i64,
    ) -> StoreResult<ItemId> {
        let name = name.into();
        let id = self
            .write(move |repo| {
                repo.insert_generated(&name, price, quantity)
                    .map(|id| (id, true))
            })
            .await?;
        debug!("event=item_insert module=store status=ok id={id} generated=true");
        Ok(id)
    }

    /// Replaces the stored record matching `item.id`; no-op when absent.
    pub async fn update(&self, item: &Item) -> StoreResult<()> {
        let item = item.clone();
        let id = item.id;
        let changed = self
            .write(move |repo| repo.update_item(&item).map(|changed| (changed, changed)))
            .await?;
        debug!("event=item_update module=store status=ok id={id} changed={changed}");
        Ok(())
    }

    /// Deletes the stored record with the same id as `item`.
    pub async fn delete(&self, item: &Item) -> StoreResult<()> {
        self.delete_by_id(item.id).await
    }

    /// Deletes by id; no-op when absent.
    pub async fn delete_by_id(&self, id: ItemId) -> StoreResult<()> {
        let changed = self
            .write(move |repo| repo.delete_item(id).map(|changed| (changed, changed)))
            .await?;
        debug!("event=item_delete module=store status=ok id={id} changed={changed}");
        Ok(())
    }

    /// Live view of every item, ordered by id ascending.
    pub fn get_all_items(&self) -> LiveQuery<Vec<Item>> {
        LiveQuery::new(self.clone(), fetch(|repo| repo.list_items()))
    }

    /// Live view of one item; `None` while the id is absent.
    pub fn get_item(&self, id: ItemId) -> LiveQuery<Option<Item>> {
        LiveQuery::new(self.clone(), fetch(move |repo| repo.get_item(id)))
    }

    /// Number of live queries currently subscribed.
    pub fn subscriber_count(&self) -> usize {
        self.shared
            .changes
            .lock()
            .as_ref()
            .map_or(0, watch::Sender::receiver_count)
    }

    /// Releases the backing connection and ends every live query.
    ///
    /// Idempotent: closing an already closed store returns `Ok(())`.
    ///
    /// # Errors
    /// - `StoreError::Db(DbError::Close(_))` when SQLite refuses to close.
    pub fn close(&self) -> StoreResult<()> {
        let conn = self.shared.conn.lock().take();
        self.shared.changes.lock().take();

        match conn {
            Some(conn) => {
                close_db(conn)?;
                info!(
                    "event=store_close module=store status=ok mode={}",
                    self.shared.config.mode()
                );
                Ok(())
            }
            None => Ok(()),
        }
    }

    pub(crate) fn subscribe(&self) -> Option<watch::Receiver<u64>> {
        self.shared
            .changes
            .lock()
            .as_ref()
            .map(watch::Sender::subscribe)
    }

    pub(crate) async fn read<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteItemRepository<'_>) -> RepoResult<T> + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        self.dispatch(move || shared.with_repo(f)).await
    }

    async fn write<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteItemRepository<'_>) -> RepoResult<(T, bool)> + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        self.dispatch(move || shared.with_repo_write(f)).await
    }

    async fn dispatch<T, F>(&self, job: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce() -> StoreResult<T> + Send + 'static,
    {
        if self.shared.config.allow_same_thread {
            return job();
        }

        let handle =
            Handle::try_current().map_err(|err| StoreError::Background(err.to_string()))?;
        handle
            .spawn_blocking(job)
            .await
            .map_err(|err| StoreError::Background(err.to_string()))?
    }
}
