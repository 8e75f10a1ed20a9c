//! # Data Transfer Objects
//!
//! Search criteria accepted from callers and the projection targets returned
//! to them. None of these types have identity or storage backing.

pub mod member_dto;
pub mod member_search_condition;
pub mod member_team_dto;

pub use member_dto::MemberDto;
pub use member_search_condition::MemberSearchCondition;
pub use member_team_dto::MemberTeamDto;
