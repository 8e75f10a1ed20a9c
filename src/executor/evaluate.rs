//! Expression and condition evaluation over joined rows and groups.
//!
//! Conditions use three-valued logic internally: a comparison touching NULL
//! is unknown, `NOT unknown` stays unknown, and unknown is finally treated as
//! false. Only `IS NULL` can match a NULL value.

use super::row_set::RowSet;
use crate::error::{QueryError, Result};
use crate::query_builder::{
    compare_values, AggregateFn, Condition, Expr, LogicalOperator,
};
use serde_json::Value;
use std::cmp::Ordering;

/// What an expression is evaluated against
#[derive(Debug, Clone, Copy)]
pub(crate) enum Scope<'a> {
    Row(&'a RowSet),
    Group(&'a [RowSet]),
}

pub(crate) fn eval_expr(expr: &Expr, scope: Scope<'_>) -> Result<Value> {
    match (expr, scope) {
        (Expr::Aliased { expr, .. }, _) => eval_expr(expr, scope),
        (Expr::Column(column), Scope::Row(row)) => Ok(row.value(*column)),
        // Grouping columns hold one value per group
        (Expr::Column(column), Scope::Group(rows)) => {
            Ok(rows.first().map_or(Value::Null, |row| row.value(*column)))
        }
        (Expr::CountAll, Scope::Group(rows)) => Ok(Value::from(rows.len() as u64)),
        (Expr::Aggregate { func, column }, Scope::Group(rows)) => {
            aggregate(*func, rows.iter().map(|row| row.value(*column)))
        }
        (aggregate_expr, Scope::Row(_)) => Err(QueryError::invalid_argument(format!(
            "aggregate {aggregate_expr} used outside of a grouped query"
        ))),
    }
}

pub(crate) fn matches(condition: &Condition, scope: Scope<'_>) -> Result<bool> {
    Ok(truth(condition, scope)?.unwrap_or(false))
}

pub(crate) fn matches_all(conditions: &[Condition], scope: Scope<'_>) -> Result<bool> {
    for condition in conditions {
        if !matches(condition, scope)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn truth(condition: &Condition, scope: Scope<'_>) -> Result<Option<bool>> {
    let result = match condition {
        Condition::Compare {
            expr,
            operator,
            value,
        } => {
            let left = eval_expr(expr, scope)?;
            compare_values(&left, value).map(|ordering| operator.accepts(ordering))
        }
        Condition::Between { expr, start, end } => {
            let value = eval_expr(expr, scope)?;
            match (compare_values(&value, start), compare_values(&value, end)) {
                (Some(lower), Some(upper)) => {
                    Some(lower != Ordering::Less && upper != Ordering::Greater)
                }
                _ => None,
            }
        }
        Condition::In { expr, values } => in_list(&eval_expr(expr, scope)?, values),
        Condition::NotIn { expr, values } => {
            in_list(&eval_expr(expr, scope)?, values).map(|found| !found)
        }
        Condition::Contains { expr, needle } => match eval_expr(expr, scope)? {
            Value::String(s) => Some(s.contains(needle.as_str())),
            _ => None,
        },
        Condition::StartsWith { expr, prefix } => match eval_expr(expr, scope)? {
            Value::String(s) => Some(s.starts_with(prefix.as_str())),
            _ => None,
        },
        Condition::IsNull { expr } => Some(eval_expr(expr, scope)?.is_null()),
        Condition::IsNotNull { expr } => Some(!eval_expr(expr, scope)?.is_null()),
        Condition::ColumnCompare {
            left,
            operator,
            right,
        } => {
            let left = eval_expr(&Expr::Column(*left), scope)?;
            let right = eval_expr(&Expr::Column(*right), scope)?;
            compare_values(&left, &right).map(|ordering| operator.accepts(ordering))
        }
        Condition::Subquery { query, .. } => {
            return Err(QueryError::invalid_argument(format!(
                "sub-query ({query}) was not resolved before evaluation"
            )))
        }
        Condition::Group(clause) => {
            let mut unknown = false;
            for inner in &clause.conditions {
                match (clause.operator, truth(inner, scope)?) {
                    (LogicalOperator::And, Some(false)) => return Ok(Some(false)),
                    (LogicalOperator::Or, Some(true)) => return Ok(Some(true)),
                    (_, None) => unknown = true,
                    _ => {}
                }
            }
            if unknown {
                None
            } else {
                Some(clause.operator == LogicalOperator::And)
            }
        }
        Condition::Not(inner) => truth(inner, scope)?.map(|b| !b),
    };
    Ok(result)
}

fn in_list(value: &Value, candidates: &[Value]) -> Option<bool> {
    if value.is_null() {
        return None;
    }
    Some(
        candidates
            .iter()
            .any(|candidate| compare_values(value, candidate) == Some(Ordering::Equal)),
    )
}

/// Reduce a column's values; NULLs are skipped, and an empty input yields
/// NULL for everything but `count`.
pub(crate) fn aggregate<I>(func: AggregateFn, values: I) -> Result<Value>
where
    I: IntoIterator<Item = Value>,
{
    let values: Vec<Value> = values.into_iter().filter(|v| !v.is_null()).collect();
    match func {
        AggregateFn::Count => Ok(Value::from(values.len() as u64)),
        AggregateFn::Sum => sum(&values),
        AggregateFn::Avg => {
            if values.is_empty() {
                return Ok(Value::Null);
            }
            let total = numbers(&values)?.iter().sum::<f64>();
            Ok(Value::from(total / values.len() as f64))
        }
        AggregateFn::Max => Ok(extreme(values, Ordering::Greater)),
        AggregateFn::Min => Ok(extreme(values, Ordering::Less)),
    }
}

fn sum(values: &[Value]) -> Result<Value> {
    if values.is_empty() {
        return Ok(Value::Null);
    }
    let integers: Option<Vec<i64>> = values.iter().map(Value::as_i64).collect();
    if let Some(integers) = integers {
        if let Some(total) = integers.iter().try_fold(0i64, |acc, n| acc.checked_add(*n)) {
            return Ok(Value::from(total));
        }
    }
    Ok(Value::from(numbers(values)?.iter().sum::<f64>()))
}

fn numbers(values: &[Value]) -> Result<Vec<f64>> {
    values
        .iter()
        .map(|value| {
            value.as_f64().ok_or_else(|| {
                QueryError::invalid_argument(format!("cannot aggregate non-numeric value {value}"))
            })
        })
        .collect()
}

fn extreme(values: Vec<Value>, wanted: Ordering) -> Value {
    let mut best: Option<Value> = None;
    for value in values {
        best = match best {
            Some(current) if compare_values(&value, &current) != Some(wanted) => Some(current),
            _ => Some(value),
        };
    }
    best.unwrap_or(Value::Null)
}
