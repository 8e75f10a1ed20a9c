use super::RelationDef;
use crate::error::{QueryError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A stored record: column name to scalar value
pub type Row = serde_json::Map<String, Value>;

/// A type stored as rows of one table.
///
/// Conversion to and from [`Row`] goes through serde; fields marked
/// `#[serde(skip)]` (relation holders) are not columns.
pub trait Entity: Serialize + DeserializeOwned {
    const TABLE: &'static str;

    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: i64);

    fn to_row(&self) -> Result<Row> {
        match serde_json::to_value(self)? {
            Value::Object(row) => Ok(row),
            other => Err(QueryError::Serialization(format!(
                "{} must serialize to an object, got {other}",
                Self::TABLE
            ))),
        }
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(row.clone()))?)
    }

    /// Store a join-fetched related row into the matching relation holder
    fn attach(&mut self, relation: &RelationDef, _related: Option<&Row>) -> Result<()> {
        Err(QueryError::invalid_argument(format!(
            "{} has no fetchable relation '{}'",
            Self::TABLE,
            relation.name
        )))
    }

    /// Whether `relation` has been materialized on this instance
    fn is_loaded(&self, _relation: &RelationDef) -> bool {
        false
    }
}
