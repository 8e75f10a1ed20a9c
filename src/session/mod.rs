//! # Storage Sessions
//!
//! The unit of work the executor reads and writes through. A session is owned
//! by one caller at a time; nothing here is shared between threads except the
//! [`MemoryStore`] behind in-memory sessions.

pub mod memory;

pub use memory::{MemorySession, MemoryStore};

use crate::config::QueryConfig;
use crate::error::{QueryError, Result};
use crate::models::{Entity, Row};
use std::collections::HashMap;

/// Row storage as seen by one unit of work
pub trait StorageSession {
    fn is_open(&self) -> bool;

    /// Stage a new row and return the id assigned to it
    fn persist(&mut self, table: &str, row: Row) -> Result<i64>;

    fn find(&mut self, table: &str, id: i64) -> Result<Option<Row>>;

    /// Rows of every table in `tables`, read from one consistent state
    fn snapshot(&mut self, tables: &[&str]) -> Result<HashMap<String, Vec<Row>>>;

    fn scan(&mut self, table: &str) -> Result<Vec<Row>> {
        let mut snapshot = self.snapshot(&[table])?;
        Ok(snapshot.remove(table).unwrap_or_default())
    }

    /// Apply `update` to every row of `table` in one write. The callback
    /// returns the replacement row, or `None` to leave the row alone; any
    /// error leaves the table untouched. Returns the number of rows replaced.
    fn update_where(
        &mut self,
        table: &str,
        update: &mut dyn FnMut(&Row) -> Result<Option<Row>>,
    ) -> Result<u64>;

    fn flush(&mut self) -> Result<()>;

    /// Discard staged writes
    fn clear(&mut self);

    fn close(&mut self);

    fn query_config(&self) -> QueryConfig {
        QueryConfig::default()
    }
}

/// Entity-level helpers available on every session
pub trait SessionExt {
    /// Persist a new entity and write the assigned id back into it
    fn save<E: Entity>(&mut self, entity: &mut E) -> Result<i64>;

    fn find_entity<E: Entity>(&mut self, id: i64) -> Result<Option<E>>;
}

impl<S: StorageSession + ?Sized> SessionExt for S {
    fn save<E: Entity>(&mut self, entity: &mut E) -> Result<i64> {
        if let Some(id) = entity.id() {
            return Err(QueryError::invalid_argument(format!(
                "{} {id} is already persisted",
                E::TABLE
            )));
        }
        let mut row = entity.to_row()?;
        row.remove("id");
        let id = self.persist(E::TABLE, row)?;
        entity.set_id(id);
        Ok(id)
    }

    fn find_entity<E: Entity>(&mut self, id: i64) -> Result<Option<E>> {
        self.find(E::TABLE, id)?
            .map(|row| E::from_row(&row))
            .transpose()
    }
}
