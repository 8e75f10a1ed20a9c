use super::{Column, Condition};
use crate::error::{QueryError, Result};
use crate::executor::QueryExecutor;
use crate::models::{Entity, Row};
use crate::session::StorageSession;
use serde_json::Value;
use std::fmt;

/// A single column assignment of a bulk update
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Set { column: Column, value: Value },
    /// Numeric increment; NULL columns stay NULL
    Add { column: Column, delta: i64 },
}

impl Assignment {
    pub fn column(&self) -> Column {
        match self {
            Assignment::Set { column, .. } | Assignment::Add { column, .. } => *column,
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assignment::Set { column, value } => {
                write!(f, "{} = {}", column.name, super::conditions::format_value(value))
            }
            Assignment::Add { column, delta } => {
                write!(f, "{} = {} + {}", column.name, column.name, delta)
            }
        }
    }
}

/// Set-based UPDATE over one table.
///
/// Rows are changed in storage without being loaded as entities, so entities
/// already held in memory keep their old values until they are read again.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: &'static str,
    assignments: Vec<Assignment>,
    where_clauses: Vec<Condition>,
    row_check: Option<fn(&Row) -> Result<()>>,
}

impl PartialEq for UpdateBuilder {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table
            && self.assignments == other.assignments
            && self.where_clauses == other.where_clauses
    }
}

impl UpdateBuilder {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
            where_clauses: Vec::new(),
            row_check: None,
        }
    }

    /// Update of `E`'s table; every updated row must still read back as an `E`
    pub fn update<E: Entity>() -> Self {
        Self {
            row_check: Some(check_row::<E>),
            ..Self::new(E::TABLE)
        }
    }

    pub fn set(mut self, column: Column, value: impl Into<Value>) -> Self {
        self.assignments.push(Assignment::Set {
            column,
            value: value.into(),
        });
        self
    }

    pub fn add(mut self, column: Column, delta: i64) -> Self {
        self.assignments.push(Assignment::Add { column, delta });
        self
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.where_clauses.push(condition);
        self
    }

    pub fn filter_all<I>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = Option<Condition>>,
    {
        self.where_clauses.extend(conditions.into_iter().flatten());
        self
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn where_clauses(&self) -> &[Condition] {
        &self.where_clauses
    }

    /// Reject an updated row the target entity could no longer be read from
    pub fn check_row(&self, row: &Row) -> Result<()> {
        match self.row_check {
            Some(check) => check(row),
            None => Ok(()),
        }
    }

    /// Run the update and return the number of affected rows
    pub fn execute(&self, session: &mut dyn StorageSession) -> Result<u64> {
        QueryExecutor::new(session).bulk_update(self)
    }
}

fn check_row<E: Entity>(row: &Row) -> Result<()> {
    E::from_row(row).map(|_| ()).map_err(|e| {
        QueryError::invalid_argument(format!("update leaves an unreadable {} row: {e}", E::TABLE))
    })
}

impl fmt::Display for UpdateBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sets: Vec<String> = self.assignments.iter().map(|a| a.to_string()).collect();
        write!(f, "UPDATE {} SET {}", self.table, sets.join(", "))?;
        if !self.where_clauses.is_empty() {
            let parts: Vec<String> = self.where_clauses.iter().map(|c| c.to_string()).collect();
            write!(f, " WHERE {}", parts.join(" AND "))?;
        }
        Ok(())
    }
}
