use super::expressions::Expr;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Where NULL keys land, independent of the sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullOrdering {
    First,
    #[default]
    Last,
}

/// One ORDER BY key
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub expr: Expr,
    pub direction: SortDirection,
    /// `None` defers to the executor's configured default
    pub nulls: Option<NullOrdering>,
}

impl OrderBy {
    pub fn asc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: SortDirection::Asc,
            nulls: None,
        }
    }

    pub fn desc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: SortDirection::Desc,
            nulls: None,
        }
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullOrdering::First);
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullOrdering::Last);
        self
    }

    /// Compare two sort keys. NULL placement ignores the direction.
    pub fn compare(&self, a: &Value, b: &Value, default_nulls: NullOrdering) -> Ordering {
        let nulls = self.nulls.unwrap_or(default_nulls);
        match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => match nulls {
                NullOrdering::First => Ordering::Less,
                NullOrdering::Last => Ordering::Greater,
            },
            (false, true) => match nulls {
                NullOrdering::First => Ordering::Greater,
                NullOrdering::Last => Ordering::Less,
            },
            (false, false) => {
                let ordering = compare_non_null(a, b);
                match self.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            }
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.expr.unaliased(), self.direction.as_str())?;
        match self.nulls {
            Some(NullOrdering::First) => write!(f, " NULLS FIRST"),
            Some(NullOrdering::Last) => write!(f, " NULLS LAST"),
            None => Ok(()),
        }
    }
}

/// Compare two scalar values of the same kind. Numbers compare numerically,
/// strings lexically, booleans false-first. Mixed or NULL operands yield `None`.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Total order used for sorting: same-kind values via [`compare_values`],
/// otherwise by kind so that sorting never panics on mixed columns.
fn compare_non_null(a: &Value, b: &Value) -> Ordering {
    compare_values(a, b).unwrap_or_else(|| kind_rank(a).cmp(&kind_rank(b)))
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
