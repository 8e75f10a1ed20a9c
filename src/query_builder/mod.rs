//! # Query Builder System
//!
//! Null-safe query composition with typed columns.
//!
//! ## Key Components
//!
//! - [`expressions`] - Columns, aggregates and aliases
//! - [`conditions`] - WHERE/HAVING conditions as a tagged enum
//! - [`joins`] - INNER, LEFT and CROSS joins, optionally fetch joins
//! - [`ordering`] - Multi-key ordering with explicit null placement
//! - [`pagination`] - LIMIT/OFFSET windows and counted pages
//! - [`builder`] - The SELECT builder tying the pieces together
//! - [`update`] - Set-based bulk updates
//! - [`scopes`] - Member predicates and the criteria composer
//!
//! ## Example Usage
//!
//! ```rust
//! use relquery_core::models::{Member, Team};
//! use relquery_core::query_builder::QueryBuilder;
//!
//! let query = QueryBuilder::select_from::<Member>()
//!     .inner_join(Member::TEAM)
//!     .filter(Team::NAME.eq("teamA"))
//!     .order_by(Member::AGE.desc())
//!     .order_by(Member::USERNAME.asc().nulls_last())
//!     .limit(10);
//! assert!(query.to_string().contains("ORDER BY member.age DESC"));
//! ```

pub mod builder;
pub mod conditions;
pub mod expressions;
pub mod joins;
pub mod ordering;
pub mod pagination;
pub mod scopes;
pub mod update;

pub use builder::QueryBuilder;
pub use conditions::{Condition, LogicalOperator, Operator, WhereClause};
pub use expressions::{AggregateFn, Column, Expr};
pub use joins::{Join, JoinType};
pub use ordering::{compare_values, NullOrdering, OrderBy, SortDirection};
pub use pagination::{Page, Pagination};
pub use scopes::MemberScopes;
pub use update::{Assignment, UpdateBuilder};
