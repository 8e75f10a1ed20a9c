//! Reusable member predicates and the criteria-driven predicate composer.
//!
//! Every scope takes an optional input and returns `Option<Condition>`; an
//! absent input contributes no condition at all rather than a comparison
//! against a placeholder value.

use super::{Condition, QueryBuilder};
use crate::dto::MemberSearchCondition;
use crate::error::{QueryError, Result};
use crate::models::{Member, Team};

/// Member-specific query scopes
pub struct MemberScopes;

impl MemberScopes {
    pub fn username_eq(username: Option<&str>) -> Option<Condition> {
        username.map(|u| Member::USERNAME.eq(u))
    }

    pub fn team_name_eq(team_name: Option<&str>) -> Option<Condition> {
        team_name.map(|t| Team::NAME.eq(t))
    }

    pub fn age_eq(age: Option<i32>) -> Option<Condition> {
        age.map(|a| Member::AGE.eq(a))
    }

    /// Age greater than or equal to `age`
    pub fn age_goe(age: Option<i32>) -> Option<Condition> {
        age.map(|a| Member::AGE.goe(a))
    }

    /// Age less than or equal to `age`
    pub fn age_loe(age: Option<i32>) -> Option<Condition> {
        age.map(|a| Member::AGE.loe(a))
    }

    /// Each bound is independently optional; both present yields a closed interval
    pub fn age_between(lower: Option<i32>, upper: Option<i32>) -> Result<Option<Condition>> {
        match (lower, upper) {
            (Some(lower), Some(upper)) if lower > upper => Err(QueryError::invalid_argument(
                format!("age lower bound {lower} is greater than upper bound {upper}"),
            )),
            (Some(lower), Some(upper)) => Ok(Some(Member::AGE.between(lower, upper))),
            (lower, upper) => Ok(Self::age_goe(lower).or_else(|| Self::age_loe(upper))),
        }
    }

    /// Fold the present criteria fields into a conjunction of conditions
    pub fn compose(criteria: &MemberSearchCondition) -> Result<Vec<Condition>> {
        let conditions = [
            Self::username_eq(criteria.username.as_deref()),
            Self::team_name_eq(criteria.team_name.as_deref()),
            Self::age_between(criteria.age_goe, criteria.age_loe)?,
        ];
        Ok(conditions.into_iter().flatten().collect())
    }

    /// Members left-joined to their team, filtered by `criteria`
    pub fn search(criteria: &MemberSearchCondition) -> Result<QueryBuilder> {
        let conditions = Self::compose(criteria)?;
        Ok(QueryBuilder::select_from::<Member>()
            .left_join(Member::TEAM)
            .filter_all(conditions.into_iter().map(Some)))
    }
}
