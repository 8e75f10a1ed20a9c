use crate::models::Row;
use crate::query_builder::Column;
use serde_json::Value;

/// One joined result row: the base row followed by one slot per join.
///
/// A `None` slot is the absent side of a left join; its columns read as NULL.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RowSet {
    entries: Vec<(&'static str, Option<Row>)>,
}

impl RowSet {
    pub(crate) fn base(table: &'static str, row: Row) -> Self {
        Self {
            entries: vec![(table, Some(row))],
        }
    }

    pub(crate) fn joined(&self, table: &'static str, row: Option<Row>) -> Self {
        let mut entries = self.entries.clone();
        entries.push((table, row));
        Self { entries }
    }

    pub(crate) fn base_row(&self) -> Option<&Row> {
        self.entries.first().and_then(|(_, row)| row.as_ref())
    }

    pub(crate) fn row(&self, table: &str) -> Option<&Row> {
        self.entries
            .iter()
            .find(|(t, _)| *t == table)
            .and_then(|(_, row)| row.as_ref())
    }

    pub(crate) fn value(&self, column: Column) -> Value {
        self.row(column.table)
            .and_then(|row| row.get(column.name))
            .cloned()
            .unwrap_or(Value::Null)
    }
}
