use crate::query_projection;
use serde::{Deserialize, Serialize};

/// A member flattened together with its team, as returned by criteria searches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberTeamDto {
    pub member_id: i64,
    pub username: Option<String>,
    pub age: i32,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
}

impl MemberTeamDto {
    pub fn new(
        member_id: i64,
        username: Option<String>,
        age: i32,
        team_id: Option<i64>,
        team_name: Option<String>,
    ) -> Self {
        Self {
            member_id,
            username,
            age,
            team_id,
            team_name,
        }
    }
}

query_projection!(MemberTeamDto::new(
    member_id: i64,
    username: Option<String>,
    age: i32,
    team_id: Option<i64>,
    team_name: Option<String>,
));
