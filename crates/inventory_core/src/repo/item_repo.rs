//! Item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `items` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Field conventions are checked on writes only when validation is enabled.
//! - Reads never fail because of field values in a stored row.
//! - Lists are ordered by `id ASC`.

use crate::db::DbError;
use crate::model::item::{validate_fields, Item, ItemId, ItemValidationError};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ITEM_SELECT_SQL: &str = "SELECT id, name, price, quantity FROM items";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for item persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Write rejected by opt-in field validation.
    Validation(ItemValidationError),
    Db(DbError),
    /// Insert hit an existing primary key under `ConflictPolicy::Reject`.
    Conflict(ItemId),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Conflict(id) => write!(f, "item already exists: {id}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Conflict(_) => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// What `insert_item` does when the id is already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Replace the stored row with the inserted one.
    #[default]
    Upsert,
    /// Leave the stored row untouched and return `RepoError::Conflict`.
    Reject,
}

/// Repository interface for item CRUD operations.
pub trait ItemRepository {
    /// Inserts a record with a caller-assigned id.
    fn insert_item(&self, item: &Item) -> RepoResult<()>;
    /// Inserts a record and lets storage assign the id.
    fn insert_generated(&self, name: &str, price: f64, quantity: i64) -> RepoResult<ItemId>;
    /// Replaces all non-id fields. Returns `false` when `item.id` is absent.
    fn update_item(&self, item: &Item) -> RepoResult<bool>;
    /// Returns `false` when nothing was stored under `id`.
    fn delete_item(&self, id: ItemId) -> RepoResult<bool>;
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    fn list_items(&self) -> RepoResult<Vec<Item>>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
    conflict_policy: ConflictPolicy,
    validate_writes: bool,
}

impl<'conn> SqliteItemRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_policy(conn, ConflictPolicy::default())
    }

    pub fn with_policy(conn: &'conn Connection, conflict_policy: ConflictPolicy) -> Self {
        Self {
            conn,
            conflict_policy,
            validate_writes: false,
        }
    }

    /// Enables `Item::validate()` checks on insert and update.
    pub fn validating(mut self, enabled: bool) -> Self {
        self.validate_writes = enabled;
        self
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn insert_item(&self, item: &Item) -> RepoResult<()> {
        if self.validate_writes {
            item.validate()?;
        }

        let sql = match self.conflict_policy {
            ConflictPolicy::Upsert => {
                "INSERT INTO items (id, name, price, quantity)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    price = excluded.price,
                    quantity = excluded.quantity;"
            }
            ConflictPolicy::Reject => {
                "INSERT INTO items (id, name, price, quantity)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO NOTHING;"
            }
        };

        let changed = self.conn.execute(
            sql,
            params![item.id, item.name.as_str(), item.price, item.quantity],
        )?;

        if changed == 0 {
            return Err(RepoError::Conflict(item.id));
        }

        Ok(())
    }

    fn insert_generated(&self, name: &str, price: f64, quantity: i64) -> RepoResult<ItemId> {
        if self.validate_writes {
            validate_fields(name, price, quantity)?;
        }

        self.conn.execute(
            "INSERT INTO items (name, price, quantity) VALUES (?1, ?2, ?3);",
            params![name, price, quantity],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_item(&self, item: &Item) -> RepoResult<bool> {
        if self.validate_writes {
            item.validate()?;
        }

        let changed = self.conn.execute(
            "UPDATE items
             SET
                name = ?1,
                price = ?2,
                quantity = ?3
             WHERE id = ?4;",
            params![item.name.as_str(), item.price, item.quantity, item.id],
        )?;

        if changed == 0 {
            debug!(
                "event=item_update module=repo status=ok outcome=missing id={}",
                item.id
            );
        }

        Ok(changed > 0)
    }

    fn delete_item(&self, id: ItemId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM items WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;

        Ok(stmt.query_row([id], parse_item_row).optional()?)
    }

    fn list_items(&self) -> RepoResult<Vec<Item>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{ITEM_SELECT_SQL} ORDER BY id ASC;"))?;

        let items = stmt
            .query_map([], parse_item_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }
}

fn parse_item_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item::new(
        row.get("id")?,
        row.get::<_, String>("name")?,
        row.get("price")?,
        row.get("quantity")?,
    ))
}
