use super::{Column, Condition, Expr, Join, OrderBy, Page, Pagination, WhereClause};
use crate::error::Result;
use crate::executor::QueryExecutor;
use crate::models::{Entity, RelationDef};
use crate::projection::{Projection, Tuple};
use crate::session::StorageSession;
use serde::de::DeserializeOwned;
use std::fmt;

/// Main query builder: base table, joins, filters, grouping, ordering and window.
///
/// Building is pure; nothing touches storage until one of the `fetch_*`
/// methods hands the query to a [`QueryExecutor`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    base_table: &'static str,
    select_exprs: Vec<Expr>,
    joins: Vec<Join>,
    where_clauses: Vec<Condition>,
    group_by: Vec<Expr>,
    having: Vec<Condition>,
    order_by: Vec<OrderBy>,
    pagination: Option<Pagination>,
}

impl QueryBuilder {
    /// Create a new query builder for the given table
    pub fn new(table: &'static str) -> Self {
        Self {
            base_table: table,
            select_exprs: Vec::new(),
            joins: Vec::new(),
            where_clauses: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            pagination: None,
        }
    }

    /// Query over the table backing `E`
    pub fn select_from<E: Entity>() -> Self {
        Self::new(E::TABLE)
    }

    /// Set specific expressions to select (tuple and projection queries)
    pub fn select<I, X>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = X>,
        X: Into<Expr>,
    {
        self.select_exprs = exprs.into_iter().map(Into::into).collect();
        self
    }

    /// Add a JOIN clause
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Join used only to filter on the related table
    pub fn inner_join(self, relation: RelationDef) -> Self {
        self.join(Join::inner(relation))
    }

    pub fn left_join(self, relation: RelationDef) -> Self {
        self.join(Join::left(relation))
    }

    /// Inner join that also materializes the related entity
    pub fn fetch_join(self, relation: RelationDef) -> Self {
        self.join(Join::inner(relation).fetch())
    }

    pub fn left_fetch_join(self, relation: RelationDef) -> Self {
        self.join(Join::left(relation).fetch())
    }

    /// Theta join against every row of `table`
    pub fn cross_join(self, table: &'static str) -> Self {
        self.join(Join::cross(table))
    }

    /// Add a WHERE condition
    pub fn filter(mut self, condition: Condition) -> Self {
        self.where_clauses.push(condition);
        self
    }

    /// AND every present condition into the WHERE clause
    pub fn filter_all<I>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = Option<Condition>>,
    {
        self.where_clauses.extend(conditions.into_iter().flatten());
        self
    }

    /// Add a grouped WHERE clause (e.g. an OR group)
    pub fn where_clause(self, clause: WhereClause) -> Self {
        self.filter(Condition::Group(clause))
    }

    /// Add GROUP BY expressions
    pub fn group_by<I, X>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = X>,
        X: Into<Expr>,
    {
        self.group_by.extend(exprs.into_iter().map(Into::into));
        self
    }

    /// Add HAVING condition
    pub fn having(mut self, condition: Condition) -> Self {
        self.having.push(condition);
        self
    }

    /// Add ORDER BY key
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn order_asc(self, column: Column) -> Self {
        self.order_by(column.asc())
    }

    pub fn order_desc(self, column: Column) -> Self {
        self.order_by(column.desc())
    }

    /// Add pagination by page number (1-indexed)
    pub fn paginate(mut self, page: i64, per_page: i64) -> Self {
        self.pagination = Some(Pagination::new(page, per_page));
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Add LIMIT clause
    pub fn limit(mut self, limit: i64) -> Self {
        if let Some(ref mut pagination) = self.pagination {
            pagination.limit = Some(limit);
        } else {
            self.pagination = Some(Pagination::limit_only(limit));
        }
        self
    }

    /// Add OFFSET clause
    pub fn offset(mut self, offset: i64) -> Self {
        if let Some(ref mut pagination) = self.pagination {
            pagination.offset = Some(offset);
        } else {
            self.pagination = Some(Pagination::offset_only(offset));
        }
        self
    }

    pub fn base_table(&self) -> &'static str {
        self.base_table
    }

    pub fn select_exprs(&self) -> &[Expr] {
        &self.select_exprs
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn where_clauses(&self) -> &[Condition] {
        &self.where_clauses
    }

    pub fn group_by_exprs(&self) -> &[Expr] {
        &self.group_by
    }

    pub fn having_clauses(&self) -> &[Condition] {
        &self.having
    }

    pub fn order_by_keys(&self) -> &[OrderBy] {
        &self.order_by
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    /// Whether rows collapse into groups (explicit GROUP BY or aggregate select)
    pub fn is_grouped(&self) -> bool {
        !self.group_by.is_empty() || self.select_exprs.iter().any(Expr::is_aggregate)
    }

    /// The same query without ORDER BY and window, used for total counts
    pub fn without_window(&self) -> Self {
        let mut query = self.clone();
        query.order_by.clear();
        query.pagination = None;
        query
    }

    /// Execute the query and return all matching entities
    pub fn fetch_all<E: Entity>(&self, session: &mut dyn StorageSession) -> Result<Vec<E>> {
        QueryExecutor::new(session).fetch_all(self)
    }

    /// Execute the query and return at most one entity
    pub fn fetch_one<E: Entity>(&self, session: &mut dyn StorageSession) -> Result<Option<E>> {
        QueryExecutor::new(session).fetch_one(self)
    }

    pub fn fetch_first<E: Entity>(&self, session: &mut dyn StorageSession) -> Result<Option<E>> {
        QueryExecutor::new(session).fetch_first(self)
    }

    pub fn fetch_page<E: Entity>(&self, session: &mut dyn StorageSession) -> Result<Page<E>> {
        QueryExecutor::new(session).fetch_page(self)
    }

    pub fn fetch_tuples(&self, session: &mut dyn StorageSession) -> Result<Vec<Tuple>> {
        QueryExecutor::new(session).fetch_tuples(self)
    }

    pub fn fetch_projected<T>(
        &self,
        session: &mut dyn StorageSession,
        projection: &Projection<T>,
    ) -> Result<Vec<T>> {
        QueryExecutor::new(session).fetch_projected(self, projection)
    }

    pub fn fetch_column<T: DeserializeOwned>(
        &self,
        session: &mut dyn StorageSession,
        expr: impl Into<Expr>,
    ) -> Result<Vec<T>> {
        QueryExecutor::new(session).fetch_column(self, expr)
    }

    /// Execute count query
    pub fn count(&self, session: &mut dyn StorageSession) -> Result<u64> {
        QueryExecutor::new(session).count(self)
    }

    /// Check if any rows exist
    pub fn exists(&self, session: &mut dyn StorageSession) -> Result<bool> {
        QueryExecutor::new(session).exists(self)
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        if self.select_exprs.is_empty() {
            write!(f, "{}.*", self.base_table)?;
        } else {
            let fields: Vec<String> = self.select_exprs.iter().map(|e| e.to_string()).collect();
            write!(f, "{}", fields.join(", "))?;
        }

        write!(f, " FROM {}", self.base_table)?;

        for join in &self.joins {
            write!(f, " {join}")?;
        }

        if !self.where_clauses.is_empty() {
            let parts: Vec<String> = self.where_clauses.iter().map(|c| c.to_string()).collect();
            write!(f, " WHERE {}", parts.join(" AND "))?;
        }

        if !self.group_by.is_empty() {
            let parts: Vec<String> = self.group_by.iter().map(|e| e.to_string()).collect();
            write!(f, " GROUP BY {}", parts.join(", "))?;
        }

        if !self.having.is_empty() {
            let parts: Vec<String> = self.having.iter().map(|c| c.to_string()).collect();
            write!(f, " HAVING {}", parts.join(" AND "))?;
        }

        if !self.order_by.is_empty() {
            let parts: Vec<String> = self.order_by.iter().map(|o| o.to_string()).collect();
            write!(f, " ORDER BY {}", parts.join(", "))?;
        }

        if let Some(ref pagination) = self.pagination {
            write!(f, "{pagination}")?;
        }

        Ok(())
    }
}
