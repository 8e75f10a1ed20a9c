//! Relation metadata and lazily materialized related entities.

use crate::error::Result;
use crate::query_builder::Column;

/// Whether a join brings the related entity along with its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStrategy {
    /// Related entity is left unloaded; reading it costs another round trip
    #[default]
    Lazy,
    /// Related entity is materialized by the same query (join fetch)
    Eager,
}

/// A to-one foreign key relation: `from_table.foreign_key = to_table.to_key`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationDef {
    pub name: &'static str,
    pub from_table: &'static str,
    pub foreign_key: &'static str,
    pub to_table: &'static str,
    pub to_key: &'static str,
}

impl RelationDef {
    pub fn foreign_key_column(&self) -> Column {
        Column::new(self.from_table, self.foreign_key)
    }

    pub fn target_key_column(&self) -> Column {
        Column::new(self.to_table, self.to_key)
    }
}

/// Holder for a related value that may not have been read yet.
///
/// `Loaded(None)` means the relation was read and is empty; `Unloaded` means
/// nobody has looked.
#[derive(Debug, Clone, PartialEq)]
pub enum Lazy<T> {
    Unloaded,
    Loaded(Option<T>),
}

impl<T> Default for Lazy<T> {
    fn default() -> Self {
        Lazy::Unloaded
    }
}

impl<T> Lazy<T> {
    pub fn loaded(value: Option<T>) -> Self {
        Lazy::Loaded(value)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Lazy::Loaded(_))
    }

    /// The related value if it has been loaded and exists
    pub fn get(&self) -> Option<&T> {
        match self {
            Lazy::Loaded(value) => value.as_ref(),
            Lazy::Unloaded => None,
        }
    }

    pub fn set(&mut self, value: Option<T>) {
        *self = Lazy::Loaded(value);
    }

    /// Return the loaded value, running `load` first if nothing was loaded yet
    pub fn get_or_load<F>(&mut self, load: F) -> Result<Option<&T>>
    where
        F: FnOnce() -> Result<Option<T>>,
    {
        if let Lazy::Unloaded = self {
            *self = Lazy::Loaded(load()?);
        }
        Ok(self.get())
    }
}
