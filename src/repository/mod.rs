//! # Repositories
//!
//! Entity-specific entry points combining the query builder, the predicate
//! composer and projections behind a small API.

pub mod member_repository;

pub use member_repository::MemberRepository;
