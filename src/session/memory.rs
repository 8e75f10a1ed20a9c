//! In-memory row storage.
//!
//! [`MemoryStore`] holds committed rows behind a `parking_lot::RwLock`; each
//! [`MemorySession`] stages its own inserts until they are flushed.

use super::StorageSession;
use crate::config::QueryConfig;
use crate::error::{QueryError, Result};
use crate::models::Row;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct MemoryTable {
    rows: BTreeMap<i64, Row>,
    next_id: i64,
}

impl MemoryTable {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Committed rows shared by every session opened on the store
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, MemoryTable>>,
    available: AtomicBool,
    config: QueryConfig,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_config(QueryConfig::default())
    }
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_config(config: QueryConfig) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            config,
        }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn open_session(self: &Arc<Self>) -> MemorySession {
        MemorySession {
            store: Arc::clone(self),
            pending: Vec::new(),
            open: true,
            auto_flush: self.config.auto_flush,
        }
    }

    /// Make the store unreachable; every session reports `StorageUnavailable`
    pub fn shutdown(&self) {
        info!("Memory store shut down");
        self.available.store(false, Ordering::SeqCst);
    }

    pub fn restart(&self) {
        info!("Memory store restarted");
        self.available.store(true, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Committed rows in `table`
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.read().get(table).map_or(0, |t| t.rows.len())
    }
}

/// One unit of work against a [`MemoryStore`]
#[derive(Debug)]
pub struct MemorySession {
    store: Arc<MemoryStore>,
    pending: Vec<(String, i64, Row)>,
    open: bool,
    auto_flush: bool,
}

impl MemorySession {
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn set_auto_flush(&mut self, auto_flush: bool) {
        self.auto_flush = auto_flush;
    }

    fn ensure_available(&self) -> Result<()> {
        if !self.open {
            return Err(QueryError::storage_unavailable("session is closed"));
        }
        if !self.store.is_available() {
            return Err(QueryError::storage_unavailable("store is shut down"));
        }
        Ok(())
    }

    fn auto_flush(&mut self) -> Result<()> {
        if self.auto_flush && !self.pending.is_empty() {
            self.flush()?;
        }
        Ok(())
    }
}

impl StorageSession for MemorySession {
    fn is_open(&self) -> bool {
        self.open && self.store.is_available()
    }

    fn persist(&mut self, table: &str, mut row: Row) -> Result<i64> {
        self.ensure_available()?;
        let id = self
            .store
            .tables
            .write()
            .entry(table.to_string())
            .or_default()
            .allocate_id();
        row.insert("id".to_string(), Value::from(id));
        self.pending.push((table.to_string(), id, row));
        Ok(id)
    }

    fn find(&mut self, table: &str, id: i64) -> Result<Option<Row>> {
        self.ensure_available()?;
        if let Some((_, _, row)) = self
            .pending
            .iter()
            .find(|(t, pending_id, _)| t == table && *pending_id == id)
        {
            return Ok(Some(row.clone()));
        }
        Ok(self
            .store
            .tables
            .read()
            .get(table)
            .and_then(|t| t.rows.get(&id))
            .cloned())
    }

    fn snapshot(&mut self, tables: &[&str]) -> Result<HashMap<String, Vec<Row>>> {
        self.ensure_available()?;
        self.auto_flush()?;
        let committed = self.store.tables.read();
        Ok(tables
            .iter()
            .map(|table| {
                let rows = committed
                    .get(*table)
                    .map(|t| t.rows.values().cloned().collect())
                    .unwrap_or_default();
                (table.to_string(), rows)
            })
            .collect())
    }

    fn update_where(
        &mut self,
        table: &str,
        update: &mut dyn FnMut(&Row) -> Result<Option<Row>>,
    ) -> Result<u64> {
        self.ensure_available()?;
        self.auto_flush()?;
        let mut tables = self.store.tables.write();
        let Some(target) = tables.get_mut(table) else {
            return Ok(0);
        };

        let mut changes = Vec::new();
        for (id, row) in &target.rows {
            if let Some(updated) = update(row)? {
                changes.push((*id, updated));
            }
        }

        let affected = changes.len() as u64;
        for (id, updated) in changes {
            target.rows.insert(id, updated);
        }
        debug!(table = %table, affected = affected, "Applied bulk update");
        Ok(affected)
    }

    fn flush(&mut self) -> Result<()> {
        self.ensure_available()?;
        if self.pending.is_empty() {
            return Ok(());
        }
        let staged = std::mem::take(&mut self.pending);
        let count = staged.len();
        let mut tables = self.store.tables.write();
        for (table, id, row) in staged {
            tables.entry(table).or_default().rows.insert(id, row);
        }
        debug!(rows = count, "Flushed staged rows");
        Ok(())
    }

    fn clear(&mut self) {
        self.pending.clear();
    }

    fn close(&mut self) {
        self.pending.clear();
        self.open = false;
    }

    fn query_config(&self) -> QueryConfig {
        self.store.config.clone()
    }
}
