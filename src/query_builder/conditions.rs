use super::expressions::{Column, Expr};
use super::QueryBuilder;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Comparison operators supported by [`Condition::Compare`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
        }
    }

    /// Whether `left <op> right` holds given how the two values compare
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Ne => ordering != Ordering::Equal,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Le => ordering != Ordering::Greater,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Ge => ordering != Ordering::Less,
        }
    }
}

/// A single filter condition.
///
/// Any comparison involving a NULL column value evaluates to false; only
/// `IsNull` matches NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        expr: Expr,
        operator: Operator,
        value: Value,
    },
    Between {
        expr: Expr,
        start: Value,
        end: Value,
    },
    In {
        expr: Expr,
        values: Vec<Value>,
    },
    NotIn {
        expr: Expr,
        values: Vec<Value>,
    },
    Contains {
        expr: Expr,
        needle: String,
    },
    StartsWith {
        expr: Expr,
        prefix: String,
    },
    IsNull {
        expr: Expr,
    },
    IsNotNull {
        expr: Expr,
    },
    ColumnCompare {
        left: Column,
        operator: Operator,
        right: Column,
    },
    Subquery {
        expr: Expr,
        operator: Operator,
        query: Box<QueryBuilder>,
    },
    Group(WhereClause),
    Not(Box<Condition>),
}

impl Condition {
    pub fn and(self, other: Condition) -> Condition {
        Condition::Group(WhereClause::and(vec![self, other]))
    }

    pub fn or(self, other: Condition) -> Condition {
        Condition::Group(WhereClause::or(vec![self, other]))
    }

    pub fn not(self) -> Condition {
        Condition::Not(Box::new(self))
    }

    /// Every expression this condition reads, sub-queries excluded
    pub fn expressions(&self) -> Vec<Expr> {
        let mut out = Vec::new();
        self.collect_expressions(&mut out);
        out
    }

    fn collect_expressions(&self, out: &mut Vec<Expr>) {
        match self {
            Condition::Compare { expr, .. }
            | Condition::Between { expr, .. }
            | Condition::In { expr, .. }
            | Condition::NotIn { expr, .. }
            | Condition::Contains { expr, .. }
            | Condition::StartsWith { expr, .. }
            | Condition::IsNull { expr }
            | Condition::IsNotNull { expr }
            | Condition::Subquery { expr, .. } => out.push(expr.clone()),
            Condition::ColumnCompare { left, right, .. } => {
                out.push(Expr::Column(*left));
                out.push(Expr::Column(*right));
            }
            Condition::Group(clause) => {
                for condition in &clause.conditions {
                    condition.collect_expressions(out);
                }
            }
            Condition::Not(inner) => inner.collect_expressions(out),
        }
    }

    pub fn has_aggregate(&self) -> bool {
        self.expressions().iter().any(Expr::is_aggregate)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Compare {
                expr,
                operator,
                value,
            } => write!(f, "{} {} {}", expr, operator.as_str(), format_value(value)),
            Condition::Between { expr, start, end } => write!(
                f,
                "{} BETWEEN {} AND {}",
                expr,
                format_value(start),
                format_value(end)
            ),
            Condition::In { expr, values } => {
                write!(f, "{expr} IN ({})", format_list(values))
            }
            Condition::NotIn { expr, values } => {
                write!(f, "{expr} NOT IN ({})", format_list(values))
            }
            Condition::Contains { expr, needle } => {
                write!(f, "{expr} LIKE '%{}%'", needle.replace('\'', "''"))
            }
            Condition::StartsWith { expr, prefix } => {
                write!(f, "{expr} LIKE '{}%'", prefix.replace('\'', "''"))
            }
            Condition::IsNull { expr } => write!(f, "{expr} IS NULL"),
            Condition::IsNotNull { expr } => write!(f, "{expr} IS NOT NULL"),
            Condition::ColumnCompare {
                left,
                operator,
                right,
            } => write!(f, "{} {} {}", left, operator.as_str(), right),
            Condition::Subquery {
                expr,
                operator,
                query,
            } => write!(f, "{} {} ({})", expr, operator.as_str(), query),
            Condition::Group(clause) => write!(f, "{clause}"),
            Condition::Not(inner) => write!(f, "NOT ({inner})"),
        }
    }
}

/// Represents a group of conditions joined by one logical operator
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub conditions: Vec<Condition>,
    pub operator: LogicalOperator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl WhereClause {
    /// Combine multiple conditions with AND
    pub fn and(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            operator: LogicalOperator::And,
        }
    }

    /// Combine multiple conditions with OR
    pub fn or(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            operator: LogicalOperator::Or,
        }
    }

    /// AND together whichever of `conditions` are present
    pub fn all_present<I>(conditions: I) -> Self
    where
        I: IntoIterator<Item = Option<Condition>>,
    {
        Self::and(conditions.into_iter().flatten().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl fmt::Display for WhereClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conditions.is_empty() {
            // Empty AND is vacuously true, empty OR is false
            return match self.operator {
                LogicalOperator::And => write!(f, "TRUE"),
                LogicalOperator::Or => write!(f, "FALSE"),
            };
        }

        if self.conditions.len() == 1 {
            return write!(f, "{}", self.conditions[0]);
        }

        let operator_str = match self.operator {
            LogicalOperator::And => " AND ",
            LogicalOperator::Or => " OR ",
        };

        let parts: Vec<String> = self.conditions.iter().map(|c| c.to_string()).collect();
        write!(f, "({})", parts.join(operator_str))
    }
}

/// Format a JSON value the way it would read in a WHERE clause
pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        _ => format!("'{}'", value.to_string().replace('\'', "''")),
    }
}

fn format_list(values: &[Value]) -> String {
    values
        .iter()
        .map(format_value)
        .collect::<Vec<_>>()
        .join(", ")
}
