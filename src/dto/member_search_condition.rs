use serde::{Deserialize, Serialize};

/// Optional member search filters; every absent field means "no filter"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberSearchCondition {
    pub username: Option<String>,
    pub team_name: Option<String>,
    /// Lower age bound, inclusive
    pub age_goe: Option<i32>,
    /// Upper age bound, inclusive
    pub age_loe: Option<i32>,
}

impl MemberSearchCondition {
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_team_name(mut self, team_name: impl Into<String>) -> Self {
        self.team_name = Some(team_name.into());
        self
    }

    pub fn with_age_goe(mut self, age: i32) -> Self {
        self.age_goe = Some(age);
        self
    }

    pub fn with_age_loe(mut self, age: i32) -> Self {
        self.age_loe = Some(age);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
