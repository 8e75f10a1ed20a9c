use super::conditions::{Condition, Operator};
use super::ordering::OrderBy;
use super::QueryBuilder;
use serde_json::Value;
use std::fmt;

/// A column of a stored table, qualified by the table it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    pub table: &'static str,
    pub name: &'static str,
}

impl Column {
    pub const fn new(table: &'static str, name: &'static str) -> Self {
        Self { table, name }
    }

    pub fn expr(self) -> Expr {
        Expr::Column(self)
    }

    pub fn eq(self, value: impl Into<Value>) -> Condition {
        self.expr().eq(value)
    }

    pub fn ne(self, value: impl Into<Value>) -> Condition {
        self.expr().ne(value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Condition {
        self.expr().lt(value)
    }

    /// Less than or equal
    pub fn loe(self, value: impl Into<Value>) -> Condition {
        self.expr().loe(value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Condition {
        self.expr().gt(value)
    }

    /// Greater than or equal
    pub fn goe(self, value: impl Into<Value>) -> Condition {
        self.expr().goe(value)
    }

    /// Closed interval `[start, end]`
    pub fn between(self, start: impl Into<Value>, end: impl Into<Value>) -> Condition {
        Condition::Between {
            expr: self.expr(),
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn in_list<I, V>(self, values: I) -> Condition
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Condition::In {
            expr: self.expr(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn not_in<I, V>(self, values: I) -> Condition
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Condition::NotIn {
            expr: self.expr(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(self, needle: &str) -> Condition {
        Condition::Contains {
            expr: self.expr(),
            needle: needle.to_string(),
        }
    }

    pub fn starts_with(self, prefix: &str) -> Condition {
        Condition::StartsWith {
            expr: self.expr(),
            prefix: prefix.to_string(),
        }
    }

    pub fn is_null(self) -> Condition {
        Condition::IsNull { expr: self.expr() }
    }

    pub fn is_not_null(self) -> Condition {
        Condition::IsNotNull { expr: self.expr() }
    }

    /// Compare against another column; the building block of theta joins
    pub fn eq_column(self, other: Column) -> Condition {
        Condition::ColumnCompare {
            left: self,
            operator: Operator::Eq,
            right: other,
        }
    }

    /// Compare against the single value produced by `subquery`
    pub fn compare_subquery(self, operator: Operator, subquery: QueryBuilder) -> Condition {
        Condition::Subquery {
            expr: self.expr(),
            operator,
            query: Box::new(subquery),
        }
    }

    pub fn eq_subquery(self, subquery: QueryBuilder) -> Condition {
        self.compare_subquery(Operator::Eq, subquery)
    }

    pub fn asc(self) -> OrderBy {
        OrderBy::asc(self)
    }

    pub fn desc(self) -> OrderBy {
        OrderBy::desc(self)
    }

    pub fn count(self) -> Expr {
        Expr::aggregate(AggregateFn::Count, self)
    }

    pub fn sum(self) -> Expr {
        Expr::aggregate(AggregateFn::Sum, self)
    }

    pub fn avg(self) -> Expr {
        Expr::aggregate(AggregateFn::Avg, self)
    }

    pub fn max(self) -> Expr {
        Expr::aggregate(AggregateFn::Max, self)
    }

    pub fn min(self) -> Expr {
        Expr::aggregate(AggregateFn::Min, self)
    }

    pub fn alias(self, alias: &str) -> Expr {
        self.expr().alias(alias)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFn {
    Count,
    Sum,
    Avg,
    Max,
    Min,
}

impl AggregateFn {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFn::Count => "count",
            AggregateFn::Sum => "sum",
            AggregateFn::Avg => "avg",
            AggregateFn::Max => "max",
            AggregateFn::Min => "min",
        }
    }
}

/// A selectable expression: a column, an aggregate, or either of them renamed
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(Column),
    CountAll,
    Aggregate { func: AggregateFn, column: Column },
    Aliased { expr: Box<Expr>, alias: String },
}

impl Expr {
    pub fn count_all() -> Self {
        Expr::CountAll
    }

    pub fn aggregate(func: AggregateFn, column: Column) -> Self {
        Expr::Aggregate { func, column }
    }

    pub fn alias(self, alias: &str) -> Self {
        Expr::Aliased {
            expr: Box::new(self.unaliased().clone()),
            alias: alias.to_string(),
        }
    }

    /// The expression with any alias stripped
    pub fn unaliased(&self) -> &Expr {
        match self {
            Expr::Aliased { expr, .. } => expr.unaliased(),
            other => other,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(
            self.unaliased(),
            Expr::CountAll | Expr::Aggregate { .. }
        )
    }

    /// The column this expression reads, if any
    pub fn column(&self) -> Option<Column> {
        match self.unaliased() {
            Expr::Column(column) | Expr::Aggregate { column, .. } => Some(*column),
            _ => None,
        }
    }

    /// Short output label: column name, alias, or the aggregate call
    pub fn label(&self) -> String {
        match self {
            Expr::Column(column) => column.name.to_string(),
            Expr::CountAll => "count(*)".to_string(),
            Expr::Aggregate { func, column } => format!("{}({})", func.as_str(), column.name),
            Expr::Aliased { alias, .. } => alias.clone(),
        }
    }

    fn compare(self, operator: Operator, value: impl Into<Value>) -> Condition {
        Condition::Compare {
            expr: self,
            operator,
            value: value.into(),
        }
    }

    pub fn eq(self, value: impl Into<Value>) -> Condition {
        self.compare(Operator::Eq, value)
    }

    pub fn ne(self, value: impl Into<Value>) -> Condition {
        self.compare(Operator::Ne, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Condition {
        self.compare(Operator::Lt, value)
    }

    pub fn loe(self, value: impl Into<Value>) -> Condition {
        self.compare(Operator::Le, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Condition {
        self.compare(Operator::Gt, value)
    }

    pub fn goe(self, value: impl Into<Value>) -> Condition {
        self.compare(Operator::Ge, value)
    }

    pub fn asc(self) -> OrderBy {
        OrderBy::asc(self)
    }

    pub fn desc(self) -> OrderBy {
        OrderBy::desc(self)
    }
}

impl From<Column> for Expr {
    fn from(column: Column) -> Self {
        Expr::Column(column)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(column) => write!(f, "{column}"),
            Expr::CountAll => write!(f, "count(*)"),
            Expr::Aggregate { func, column } => write!(f, "{}({})", func.as_str(), column),
            Expr::Aliased { expr, alias } => write!(f, "{expr} AS {alias}"),
        }
    }
}
