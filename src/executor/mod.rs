//! # Query Executor
//!
//! Runs [`QueryBuilder`] and [`UpdateBuilder`] descriptions against a
//! [`StorageSession`].
//!
//! Every call is one logical unit of work: the tables a query touches are read
//! from a single session snapshot, joined, filtered, grouped, ordered and only
//! then windowed. Failures surface before any result is produced; partial
//! results are never returned.

mod evaluate;
mod row_set;

use self::evaluate::{eval_expr, matches_all, Scope};
use self::row_set::RowSet;
use crate::config::QueryConfig;
use crate::error::{QueryError, Result};
use crate::logging::log_query_operation;
use crate::models::{Entity, Row};
use crate::projection::{decode_value, Projection, Tuple};
use crate::query_builder::{
    compare_values, Assignment, Condition, Expr, Join, JoinType, NullOrdering, OrderBy, Page,
    QueryBuilder, UpdateBuilder, WhereClause,
};
use crate::session::StorageSession;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, warn};

/// A query after validation, with every sub-query replaced by its value
struct Plan {
    base_table: &'static str,
    joins: Vec<Join>,
    where_clauses: Vec<Condition>,
    having: Vec<Condition>,
}

impl Plan {
    fn tables(&self) -> Vec<&'static str> {
        std::iter::once(self.base_table)
            .chain(self.joins.iter().map(|join| join.table))
            .collect()
    }
}

/// Executes queries and bulk updates through one session
pub struct QueryExecutor<'s> {
    session: &'s mut dyn StorageSession,
    config: QueryConfig,
}

impl<'s> QueryExecutor<'s> {
    /// Executor using the session's own configuration
    pub fn new(session: &'s mut dyn StorageSession) -> Self {
        let config = session.query_config();
        Self { session, config }
    }

    pub fn with_config(session: &'s mut dyn StorageSession, config: QueryConfig) -> Self {
        Self { session, config }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// All matching entities, ordered and windowed
    pub fn fetch_all<E: Entity>(&mut self, query: &QueryBuilder) -> Result<Vec<E>> {
        let rows = self.entity_rows::<E>(query)?;
        let entities = windowed(query, rows)
            .iter()
            .map(|row| materialize::<E>(query.joins(), row))
            .collect::<Result<Vec<E>>>()?;
        debug!(table = E::TABLE, rows = entities.len(), "Fetched entities");
        Ok(entities)
    }

    /// At most one entity; more than one match is an error
    pub fn fetch_one<E: Entity>(&mut self, query: &QueryBuilder) -> Result<Option<E>> {
        let mut entities = self.fetch_all::<E>(query)?;
        match entities.len() {
            0 | 1 => Ok(entities.pop()),
            n => Err(QueryError::NonUniqueResult(n)),
        }
    }

    pub fn fetch_first<E: Entity>(&mut self, query: &QueryBuilder) -> Result<Option<E>> {
        let first = query.clone().limit(1);
        Ok(self.fetch_all::<E>(&first)?.into_iter().next())
    }

    /// One window of entities plus the number of rows matching without the window.
    ///
    /// Both come from the same snapshot. The query must carry a limit.
    pub fn fetch_page<E: Entity>(&mut self, query: &QueryBuilder) -> Result<Page<E>> {
        let rows = self.entity_rows::<E>(query)?;
        page_of(query, rows)?.try_map(|row| materialize::<E>(query.joins(), &row))
    }

    /// Owner entities paired with the related row of `R`'s table, if any
    pub fn fetch_with<E: Entity, R: Entity>(
        &mut self,
        query: &QueryBuilder,
    ) -> Result<Vec<(E, Option<R>)>> {
        if !query.joins().iter().any(|join| join.table == R::TABLE) {
            return Err(QueryError::invalid_argument(format!(
                "{} is not joined by the query",
                R::TABLE
            )));
        }
        let rows = self.entity_rows::<E>(query)?;
        windowed(query, rows)
            .iter()
            .map(|row| {
                let owner = materialize::<E>(query.joins(), row)?;
                let related = row.row(R::TABLE).map(R::from_row).transpose()?;
                Ok((owner, related))
            })
            .collect()
    }

    /// Rows of the selected expressions; aggregates collapse rows into groups
    pub fn fetch_tuples(&mut self, query: &QueryBuilder) -> Result<Vec<Tuple>> {
        let tuples = self.tuples(query, query.select_exprs())?;
        Ok(windowed(query, tuples))
    }

    /// Map each result row through `projection`, which also decides the select list
    pub fn fetch_projected<T>(
        &mut self,
        query: &QueryBuilder,
        projection: &Projection<T>,
    ) -> Result<Vec<T>> {
        let tuples = self.tuples(query, projection.exprs())?;
        let projected = projection.map_tuples(&windowed(query, tuples))?;
        debug!(
            strategy = ?projection.strategy(),
            rows = projected.len(),
            "Projected query results"
        );
        Ok(projected)
    }

    pub fn fetch_projected_page<T>(
        &mut self,
        query: &QueryBuilder,
        projection: &Projection<T>,
    ) -> Result<Page<T>> {
        let tuples = self.tuples(query, projection.exprs())?;
        page_of(query, tuples)?.try_map(|tuple| projection.map(&tuple))
    }

    /// Values of a single selected expression
    pub fn fetch_column<T: DeserializeOwned>(
        &mut self,
        query: &QueryBuilder,
        expr: impl Into<Expr>,
    ) -> Result<Vec<T>> {
        let expr = expr.into();
        let label = expr.label();
        let tuples = self.tuples(query, std::slice::from_ref(&expr))?;
        windowed(query, tuples)
            .into_iter()
            .map(|tuple| {
                let value = tuple.into_values().into_iter().next().unwrap_or(Value::Null);
                decode_value(&label, value)
            })
            .collect()
    }

    /// Number of matching rows (or groups), ignoring ordering and window
    pub fn count(&mut self, query: &QueryBuilder) -> Result<u64> {
        let unwindowed = query.without_window();
        if unwindowed.is_grouped() {
            let select = if unwindowed.select_exprs().is_empty() {
                unwindowed.group_by_exprs().to_vec()
            } else {
                unwindowed.select_exprs().to_vec()
            };
            return Ok(self.tuples(&unwindowed, &select)?.len() as u64);
        }
        let plan = self.prepare(&unwindowed, &[])?;
        Ok(self.filtered_rows(&plan)?.len() as u64)
    }

    pub fn exists(&mut self, query: &QueryBuilder) -> Result<bool> {
        Ok(self.count(query)? > 0)
    }

    /// Apply `update` to every matching row in one write and return the number
    /// of rows changed.
    ///
    /// Entities loaded before the update keep their old values; only a fresh
    /// read sees the change.
    pub fn bulk_update(&mut self, update: &UpdateBuilder) -> Result<u64> {
        let table = update.table();
        if update.assignments().is_empty() {
            return Err(QueryError::invalid_argument("bulk update sets no columns"));
        }
        for assignment in update.assignments() {
            let column = assignment.column();
            if column.table != table {
                return Err(QueryError::invalid_argument(format!(
                    "cannot assign {column} in an update of {table}"
                )));
            }
            if column.name == "id" {
                return Err(QueryError::invalid_argument("the id column cannot be updated"));
            }
        }
        check_conditions(update.where_clauses(), &[table], false)?;
        let conditions = self.resolve_all(update.where_clauses())?;
        debug!(statement = %update, "Executing bulk update");

        let assignments = update.assignments();
        let affected = self.session.update_where(table, &mut |row: &Row| {
            let set = RowSet::base(table, row.clone());
            if !matches_all(&conditions, Scope::Row(&set))? {
                return Ok(None);
            }
            let mut updated = row.clone();
            for assignment in assignments {
                apply(assignment, &mut updated)?;
            }
            update.check_row(&updated)?;
            Ok(Some(updated))
        })?;

        log_query_operation(
            "bulk_update",
            table,
            Some(affected as usize),
            "completed",
            Some(&update.to_string()),
        );
        Ok(affected)
    }

    /// Filtered and ordered rows of an entity query, before the window
    fn entity_rows<E: Entity>(&mut self, query: &QueryBuilder) -> Result<Vec<RowSet>> {
        if query.base_table() != E::TABLE {
            return Err(QueryError::invalid_argument(format!(
                "query selects from {} but {} was requested",
                query.base_table(),
                E::TABLE
            )));
        }
        if query.is_grouped() {
            return Err(QueryError::invalid_argument(
                "grouped queries return tuples, not entities",
            ));
        }
        check_fetch_joins(query.joins(), E::TABLE)?;
        let plan = self.prepare(query, &[])?;
        let rows = self.filtered_rows(&plan)?;
        self.sorted(query.order_by_keys(), rows)
    }

    /// Tuples for `select`, grouped when needed, ordered, before the window
    fn tuples(&mut self, query: &QueryBuilder, select: &[Expr]) -> Result<Vec<Tuple>> {
        if select.is_empty() {
            return Err(QueryError::invalid_argument(
                "tuple queries need at least one selected expression",
            ));
        }
        let plan = self.prepare(query, select)?;
        let rows = self.filtered_rows(&plan)?;

        let grouped = !query.group_by_exprs().is_empty() || select.iter().any(Expr::is_aggregate);
        if grouped {
            return self.grouped_tuples(query, &plan, select, rows);
        }

        self.sorted(query.order_by_keys(), rows)?
            .iter()
            .map(|row| {
                let values = select
                    .iter()
                    .map(|expr| eval_expr(expr, Scope::Row(row)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Tuple::new(select.to_vec(), values))
            })
            .collect()
    }

    fn grouped_tuples(
        &self,
        query: &QueryBuilder,
        plan: &Plan,
        select: &[Expr],
        rows: Vec<RowSet>,
    ) -> Result<Vec<Tuple>> {
        let group_by = query.group_by_exprs();
        for expr in select {
            let is_key = group_by.iter().any(|key| key.unaliased() == expr.unaliased());
            if !expr.is_aggregate() && !is_key {
                return Err(QueryError::invalid_argument(format!(
                    "{expr} must be aggregated or listed in GROUP BY"
                )));
            }
        }

        let mut groups: Vec<(Vec<Value>, Vec<RowSet>)> = Vec::new();
        if group_by.is_empty() {
            groups.push((Vec::new(), rows));
        } else {
            let mut index: HashMap<String, usize> = HashMap::new();
            for row in rows {
                let key = group_by
                    .iter()
                    .map(|expr| eval_expr(expr, Scope::Row(&row)))
                    .collect::<Result<Vec<_>>>()?;
                let fingerprint = serde_json::to_string(&key)?;
                match index.get(&fingerprint) {
                    Some(&position) => groups[position].1.push(row),
                    None => {
                        index.insert(fingerprint, groups.len());
                        groups.push((key, vec![row]));
                    }
                }
            }
        }

        let mut kept = Vec::with_capacity(groups.len());
        for (key, members) in groups {
            if matches_all(&plan.having, Scope::Group(&members))? {
                kept.push((key, members));
            }
        }

        let default_nulls = self.config.default_null_ordering;
        let mut keyed: Vec<(Vec<Value>, Vec<RowSet>)> = if query.order_by_keys().is_empty() {
            kept
        } else {
            kept.into_iter()
                .map(|(_, members)| {
                    let key = query
                        .order_by_keys()
                        .iter()
                        .map(|order| eval_expr(&order.expr, Scope::Group(&members)))
                        .collect::<Result<Vec<_>>>()?;
                    Ok((key, members))
                })
                .collect::<Result<_>>()?
        };
        let order: Vec<OrderBy> = if query.order_by_keys().is_empty() {
            group_by.iter().cloned().map(OrderBy::asc).collect()
        } else {
            query.order_by_keys().to_vec()
        };
        keyed.sort_by(|(a, _), (b, _)| compare_keys(&order, a, b, default_nulls));

        keyed
            .iter()
            .map(|(_, members)| {
                let values = select
                    .iter()
                    .map(|expr| eval_expr(expr, Scope::Group(members)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Tuple::new(select.to_vec(), values))
            })
            .collect()
    }

    /// Validate table references and resolve sub-queries
    fn prepare(&mut self, query: &QueryBuilder, select: &[Expr]) -> Result<Plan> {
        if let Some(pagination) = query.pagination() {
            pagination.validate(self.config.max_page_size)?;
        }

        let mut known = vec![query.base_table()];
        for join in query.joins() {
            if known.contains(&join.table) {
                return Err(QueryError::invalid_argument(format!(
                    "{} is already part of the query; self joins are not supported",
                    join.table
                )));
            }
            if let Some(relation) = &join.relation {
                if !known.contains(&relation.from_table) {
                    return Err(QueryError::invalid_argument(format!(
                        "relation '{}' starts at {}, which is not part of the query",
                        relation.name, relation.from_table
                    )));
                }
            }
            known.push(join.table);
            check_conditions(&join.on_conditions, &known, false)?;
        }

        check_conditions(query.where_clauses(), &known, false)?;
        check_conditions(query.having_clauses(), &known, true)?;
        for expr in select.iter().chain(query.group_by_exprs()) {
            check_expr(expr, &known)?;
        }
        if let Some(expr) = query.group_by_exprs().iter().find(|e| e.is_aggregate()) {
            return Err(QueryError::invalid_argument(format!(
                "cannot GROUP BY aggregate {expr}"
            )));
        }
        let grouped = !query.group_by_exprs().is_empty() || select.iter().any(Expr::is_aggregate);
        for order in query.order_by_keys() {
            check_expr(&order.expr, &known)?;
            if order.expr.is_aggregate() && !grouped {
                return Err(QueryError::invalid_argument(format!(
                    "cannot order ungrouped rows by aggregate {}",
                    order.expr
                )));
            }
        }
        if !query.having_clauses().is_empty() && !grouped {
            return Err(QueryError::invalid_argument("HAVING requires a grouped query"));
        }

        let mut joins = Vec::with_capacity(query.joins().len());
        for join in query.joins() {
            let mut resolved = join.clone();
            resolved.on_conditions = self.resolve_all(&join.on_conditions)?;
            joins.push(resolved);
        }

        Ok(Plan {
            base_table: query.base_table(),
            joins,
            where_clauses: self.resolve_all(query.where_clauses())?,
            having: self.resolve_all(query.having_clauses())?,
        })
    }

    /// Joined rows that pass the WHERE clause, in storage order
    fn filtered_rows(&mut self, plan: &Plan) -> Result<Vec<RowSet>> {
        let tables = plan.tables();
        let mut snapshot = self.session.snapshot(&tables)?;

        let mut rows: Vec<RowSet> = snapshot
            .remove(plan.base_table)
            .unwrap_or_default()
            .into_iter()
            .map(|row| RowSet::base(plan.base_table, row))
            .collect();

        for join in &plan.joins {
            let related = snapshot.remove(join.table).unwrap_or_default();
            if join.join_type == JoinType::Cross && self.config.log_theta_joins {
                warn!(
                    table = join.table,
                    left_rows = rows.len(),
                    right_rows = related.len(),
                    "Executing unoptimized cross join"
                );
            }
            rows = apply_join(join, rows, &related)?;
        }

        let mut kept = Vec::with_capacity(rows.len());
        for row in rows {
            if matches_all(&plan.where_clauses, Scope::Row(&row))? {
                kept.push(row);
            }
        }
        debug!(table = plan.base_table, rows = kept.len(), "Filtered rows");
        Ok(kept)
    }

    fn sorted(&self, order_by: &[OrderBy], rows: Vec<RowSet>) -> Result<Vec<RowSet>> {
        if order_by.is_empty() {
            return Ok(rows);
        }
        let mut keyed = rows
            .into_iter()
            .map(|row| {
                let key = order_by
                    .iter()
                    .map(|order| eval_expr(&order.expr, Scope::Row(&row)))
                    .collect::<Result<Vec<_>>>()?;
                Ok((key, row))
            })
            .collect::<Result<Vec<_>>>()?;
        let default_nulls = self.config.default_null_ordering;
        keyed.sort_by(|(a, _), (b, _)| compare_keys(order_by, a, b, default_nulls));
        Ok(keyed.into_iter().map(|(_, row)| row).collect())
    }

    fn resolve_all(&mut self, conditions: &[Condition]) -> Result<Vec<Condition>> {
        conditions.iter().map(|c| self.resolve(c)).collect()
    }

    fn resolve(&mut self, condition: &Condition) -> Result<Condition> {
        Ok(match condition {
            Condition::Subquery {
                expr,
                operator,
                query,
            } => Condition::Compare {
                expr: expr.clone(),
                operator: *operator,
                value: self.scalar(query)?,
            },
            Condition::Group(clause) => Condition::Group(WhereClause {
                conditions: self.resolve_all(&clause.conditions)?,
                operator: clause.operator,
            }),
            Condition::Not(inner) => Condition::Not(Box::new(self.resolve(inner)?)),
            other => other.clone(),
        })
    }

    /// The single value a sub-query produces; no rows reads as NULL
    fn scalar(&mut self, query: &QueryBuilder) -> Result<Value> {
        if query.select_exprs().len() != 1 {
            return Err(QueryError::invalid_argument(format!(
                "sub-query must select exactly one expression, got {}",
                query.select_exprs().len()
            )));
        }
        let tuples = self.fetch_tuples(query)?;
        match tuples.len() {
            0 => Ok(Value::Null),
            1 => Ok(tuples
                .into_iter()
                .next()
                .and_then(|tuple| tuple.into_values().into_iter().next())
                .unwrap_or(Value::Null)),
            n => Err(QueryError::NonUniqueResult(n)),
        }
    }
}

fn apply_join(join: &Join, rows: Vec<RowSet>, related: &[Row]) -> Result<Vec<RowSet>> {
    let mut joined = Vec::with_capacity(rows.len());
    for row in rows {
        let mut matched = false;
        for candidate in related {
            if let Some(relation) = &join.relation {
                let owner_key = row.value(relation.foreign_key_column());
                let target_key = candidate.get(relation.to_key).unwrap_or(&Value::Null);
                if compare_values(&owner_key, target_key) != Some(Ordering::Equal) {
                    continue;
                }
            }
            let extended = row.joined(join.table, Some(candidate.clone()));
            if matches_all(&join.on_conditions, Scope::Row(&extended))? {
                matched = true;
                joined.push(extended);
            }
        }
        if !matched && join.join_type == JoinType::Left {
            joined.push(row.joined(join.table, None));
        }
    }
    Ok(joined)
}

fn materialize<E: Entity>(joins: &[Join], row: &RowSet) -> Result<E> {
    let base = row
        .base_row()
        .ok_or_else(|| QueryError::invalid_argument("result row has no base entity"))?;
    let mut entity = E::from_row(base)?;
    for join in joins.iter().filter(|join| join.is_fetch()) {
        if let Some(relation) = &join.relation {
            entity.attach(relation, row.row(join.table))?;
        }
    }
    Ok(entity)
}

fn check_fetch_joins(joins: &[Join], table: &str) -> Result<()> {
    for join in joins.iter().filter(|join| join.is_fetch()) {
        match &join.relation {
            Some(relation) if relation.from_table == table => {}
            Some(relation) => {
                return Err(QueryError::invalid_argument(format!(
                    "only relations of {table} can be fetched, not '{}'",
                    relation.name
                )))
            }
            None => {
                return Err(QueryError::invalid_argument(
                    "cross joins cannot be fetch joins",
                ))
            }
        }
    }
    Ok(())
}

fn check_conditions(conditions: &[Condition], known: &[&str], allow_aggregates: bool) -> Result<()> {
    for condition in conditions {
        if !allow_aggregates && condition.has_aggregate() {
            return Err(QueryError::invalid_argument(format!(
                "aggregates are not allowed in {condition}; use HAVING"
            )));
        }
        for expr in condition.expressions() {
            check_expr(&expr, known)?;
        }
    }
    Ok(())
}

fn check_expr(expr: &Expr, known: &[&str]) -> Result<()> {
    match expr.column() {
        Some(column) if !known.contains(&column.table) => Err(QueryError::invalid_argument(
            format!("{column} belongs to {}, which is not part of the query", column.table),
        )),
        _ => Ok(()),
    }
}

fn compare_keys(
    order: &[OrderBy],
    a: &[Value],
    b: &[Value],
    default_nulls: NullOrdering,
) -> Ordering {
    order
        .iter()
        .zip(a.iter().zip(b))
        .map(|(order, (a, b))| order.compare(a, b, default_nulls))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

fn windowed<T>(query: &QueryBuilder, items: Vec<T>) -> Vec<T> {
    match query.pagination() {
        Some(pagination) => {
            let range = pagination.window(items.len());
            items.into_iter().skip(range.start).take(range.len()).collect()
        }
        None => items,
    }
}

fn page_of<T>(query: &QueryBuilder, items: Vec<T>) -> Result<Page<T>> {
    let pagination = query
        .pagination()
        .filter(|p| p.limit.is_some())
        .ok_or_else(|| QueryError::invalid_argument("paged queries need a limit"))?;
    let total = items.len() as u64;
    let limit = pagination.limit.unwrap_or_default().max(0) as u64;
    let offset = pagination.offset_or_zero();
    Ok(Page {
        results: windowed(query, items),
        total,
        limit,
        offset,
    })
}

fn apply(assignment: &Assignment, row: &mut Row) -> Result<()> {
    match assignment {
        Assignment::Set { column, value } => {
            row.insert(column.name.to_string(), value.clone());
        }
        Assignment::Add { column, delta } => {
            let current = row.get(column.name).cloned().unwrap_or(Value::Null);
            let updated = match current {
                Value::Null => Value::Null,
                Value::Number(n) => match n.as_i64() {
                    Some(i) => Value::from(i.checked_add(*delta).ok_or_else(|| {
                        QueryError::invalid_argument(format!("{column} overflows adding {delta}"))
                    })?),
                    None => Value::from(n.as_f64().unwrap_or_default() + *delta as f64),
                },
                other => {
                    return Err(QueryError::invalid_argument(format!(
                        "cannot add to non-numeric {column} value {other}"
                    )))
                }
            };
            row.insert(column.name.to_string(), updated);
        }
    }
    Ok(())
}
