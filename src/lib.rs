#![allow(clippy::doc_markdown)] // Allow technical terms like OrderBy, QueryBuilder in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # RelQuery Core
//!
//! Dynamic, null-safe query composition over relational entities.
//!
//! ## Overview
//!
//! Callers describe *what* they want (optional search criteria, joins, ordering,
//! a page window, an output shape) and the engine turns that into filtered,
//! joined, ordered and projected results read through a storage session.
//!
//! ## Key Features
//!
//! - **Criteria Composition**: absent criteria contribute no predicate at all
//! - **Joins**: inner, left with `ON` filtering, theta (cross) joins, fetch joins
//! - **Explicit Null Ordering**: `NULLS FIRST`/`NULLS LAST` independent of direction
//! - **Counted Pages**: window and total from one snapshot
//! - **Projections**: field, setter and constructor strategies
//! - **Lazy Relations**: an `is_loaded()` flag instead of hidden proxies
//! - **Bulk Updates**: set-based writes under one storage lock
//!
//! ## Module Organization
//!
//! - [`query_builder`] - Columns, conditions, joins, ordering, pagination, updates
//! - [`executor`] - Runs queries and bulk updates against a session
//! - [`projection`] - Tuples and projection strategies
//! - [`models`] - `Member`/`Team` entities and relation plumbing
//! - [`dto`] - Search criteria and projection targets
//! - [`session`] - Storage session trait and the in-memory store
//! - [`repository`] - Member repository
//! - [`config`] - Layered configuration
//! - [`logging`] - Structured logging setup
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use relquery_core::dto::MemberSearchCondition;
//! use relquery_core::models::{Member, Team};
//! use relquery_core::repository::MemberRepository;
//! use relquery_core::session::{MemoryStore, SessionExt};
//!
//! # fn main() -> relquery_core::Result<()> {
//! let store = MemoryStore::new();
//! let mut session = store.open_session();
//!
//! let mut team = Team::new("teamB");
//! session.save(&mut team)?;
//! session.save(&mut Member::with_team("member4", 40, &team))?;
//!
//! let criteria = MemberSearchCondition::default()
//!     .with_team_name("teamB")
//!     .with_age_goe(35);
//! let found = MemberRepository::new(&mut session).search(&criteria)?;
//! assert_eq!(found[0].username.as_deref(), Some("member4"));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod projection;
pub mod query_builder;
pub mod repository;
pub mod session;

pub use config::QueryConfig;
pub use dto::{MemberDto, MemberSearchCondition, MemberTeamDto};
pub use error::{QueryError, Result};
pub use executor::QueryExecutor;
pub use models::{Entity, FetchStrategy, Lazy, Member, RelationDef, Row, Team};
pub use projection::{Bean, FromTuple, Projection, ProjectionStrategy, Tuple};
pub use query_builder::{
    Column, Condition, Expr, NullOrdering, OrderBy, Page, Pagination, QueryBuilder, UpdateBuilder,
};
pub use session::{MemorySession, MemoryStore, SessionExt, StorageSession};

// Used by `query_projection!` expansions in downstream crates
pub use serde_json::Value;
