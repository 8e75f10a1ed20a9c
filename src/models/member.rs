use super::{Entity, Lazy, RelationDef, Row, Team};
use crate::error::{QueryError, Result};
use crate::query_builder::Column;
use crate::session::{SessionExt, StorageSession};
use serde::{Deserialize, Serialize};

/// A member, optionally belonging to one [`Team`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub age: i32,
    pub team_id: Option<i64>,
    #[serde(skip)]
    team: Lazy<Team>,
}

impl Member {
    pub const ID: Column = Column::new("member", "id");
    pub const USERNAME: Column = Column::new("member", "username");
    pub const AGE: Column = Column::new("member", "age");
    pub const TEAM_ID: Column = Column::new("member", "team_id");

    pub const TEAM: RelationDef = RelationDef {
        name: "team",
        from_table: "member",
        foreign_key: "team_id",
        to_table: "team",
        to_key: "id",
    };

    pub fn new(username: &str, age: i32) -> Self {
        Self {
            id: None,
            username: Some(username.to_string()),
            age,
            team_id: None,
            team: Lazy::loaded(None),
        }
    }

    /// A member without a username
    pub fn unnamed(age: i32) -> Self {
        Self {
            username: None,
            ..Self::new("", age)
        }
    }

    pub fn with_team(username: &str, age: i32, team: &Team) -> Self {
        let mut member = Self::new(username, age);
        member.change_team(team);
        member
    }

    pub fn change_team(&mut self, team: &Team) {
        self.team_id = team.id;
        self.team.set(Some(team.clone()));
    }

    /// The team, if it has been loaded and the member has one
    pub fn team(&self) -> Option<&Team> {
        self.team.get()
    }

    pub fn is_team_loaded(&self) -> bool {
        self.team.is_loaded()
    }

    /// Read the team through `session` unless it is already loaded
    pub fn load_team(&mut self, session: &mut dyn StorageSession) -> Result<Option<&Team>> {
        let team_id = self.team_id;
        self.team.get_or_load(|| match team_id {
            Some(id) => session.find_entity::<Team>(id),
            None => Ok(None),
        })
    }
}

impl Entity for Member {
    const TABLE: &'static str = "member";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn attach(&mut self, relation: &RelationDef, related: Option<&Row>) -> Result<()> {
        if *relation != Self::TEAM {
            return Err(QueryError::invalid_argument(format!(
                "member has no fetchable relation '{}'",
                relation.name
            )));
        }
        let team = related.map(Team::from_row).transpose()?;
        self.team.set(team);
        Ok(())
    }

    fn is_loaded(&self, relation: &RelationDef) -> bool {
        *relation == Self::TEAM && self.team.is_loaded()
    }
}
