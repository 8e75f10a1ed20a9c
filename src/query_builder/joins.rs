use super::conditions::Condition;
use crate::models::{FetchStrategy, RelationDef};
use std::fmt;

/// Represents the supported JOIN kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    /// Cartesian product; only useful together with a column-to-column filter
    Cross,
}

impl JoinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Cross => "CROSS JOIN",
        }
    }
}

/// Represents one JOIN of a related table onto the rows built so far
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub table: &'static str,
    /// Foreign-key relation the join follows; absent for cross joins
    pub relation: Option<RelationDef>,
    /// Extra ON conditions restricting which related rows join
    pub on_conditions: Vec<Condition>,
    pub fetch: FetchStrategy,
}

impl Join {
    /// Create an INNER JOIN along `relation`
    pub fn inner(relation: RelationDef) -> Self {
        Self::along(JoinType::Inner, relation)
    }

    /// Create a LEFT JOIN along `relation`
    pub fn left(relation: RelationDef) -> Self {
        Self::along(JoinType::Left, relation)
    }

    /// Create a CROSS JOIN (theta join). Every row pairs with every row of
    /// `table`, so cost grows with the product of both table sizes.
    pub fn cross(table: &'static str) -> Self {
        Self {
            join_type: JoinType::Cross,
            table,
            relation: None,
            on_conditions: Vec::new(),
            fetch: FetchStrategy::Lazy,
        }
    }

    fn along(join_type: JoinType, relation: RelationDef) -> Self {
        Self {
            join_type,
            table: relation.to_table,
            relation: Some(relation),
            on_conditions: Vec::new(),
            fetch: FetchStrategy::Lazy,
        }
    }

    /// Add an ON condition
    pub fn on(mut self, condition: Condition) -> Self {
        self.on_conditions.push(condition);
        self
    }

    /// Materialize the related entity into the owner in the same round trip
    pub fn fetch(mut self) -> Self {
        self.fetch = FetchStrategy::Eager;
        self
    }

    pub fn is_fetch(&self) -> bool {
        self.fetch == FetchStrategy::Eager
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.join_type.as_str())?;
        if self.is_fetch() {
            write!(f, " FETCH")?;
        }
        write!(f, " {}", self.table)?;

        let mut on_parts = Vec::new();
        if let Some(relation) = &self.relation {
            on_parts.push(format!(
                "{} = {}",
                relation.foreign_key_column(),
                relation.target_key_column()
            ));
        }
        on_parts.extend(self.on_conditions.iter().map(|c| c.to_string()));

        if !on_parts.is_empty() {
            write!(f, " ON {}", on_parts.join(" AND "))?;
        }
        Ok(())
    }
}
