//! # Models
//!
//! Stored entities and the relation plumbing the executor uses to join and
//! fetch them.
//!
//! - [`Entity`] - table binding and row conversion
//! - [`Member`] / [`Team`] - the member/team pair with a to-one relation
//! - [`Lazy`] - explicit holder for related values with a loaded flag
//! - [`FetchStrategy`] - lazy vs join-fetched relations

pub mod entity;
pub mod member;
pub mod relation;
pub mod team;

pub use entity::{Entity, Row};
pub use member::Member;
pub use relation::{FetchStrategy, Lazy, RelationDef};
pub use team::Team;
