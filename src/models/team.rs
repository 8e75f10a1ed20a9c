use super::{Entity, Lazy, Member, RelationDef};
use crate::error::Result;
use crate::query_builder::{Column, QueryBuilder};
use crate::session::StorageSession;
use serde::{Deserialize, Serialize};

/// A team; owns the inverse side of [`Member::TEAM`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: Option<i64>,
    pub name: String,
    #[serde(skip)]
    members: Lazy<Vec<Member>>,
}

impl Team {
    pub const ID: Column = Column::new("team", "id");
    pub const NAME: Column = Column::new("team", "name");

    /// Inverse of [`Member::TEAM`]; joining along it yields one row per member
    pub const MEMBERS: RelationDef = RelationDef {
        name: "members",
        from_table: "team",
        foreign_key: "id",
        to_table: "member",
        to_key: "team_id",
    };

    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            members: Lazy::default(),
        }
    }

    pub fn members(&self) -> Option<&[Member]> {
        self.members.get().map(Vec::as_slice)
    }

    pub fn is_members_loaded(&self) -> bool {
        self.members.is_loaded()
    }

    /// Read the members through `session` unless they are already loaded
    pub fn load_members(&mut self, session: &mut dyn StorageSession) -> Result<&[Member]> {
        let team_id = self.id;
        let members = self.members.get_or_load(|| match team_id {
            Some(id) => QueryBuilder::select_from::<Member>()
                .filter(Member::TEAM_ID.eq(id))
                .order_asc(Member::ID)
                .fetch_all(session)
                .map(Some),
            None => Ok(Some(Vec::new())),
        })?;
        Ok(members.map(Vec::as_slice).unwrap_or(&[]))
    }
}

impl Entity for Team {
    const TABLE: &'static str = "team";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn is_loaded(&self, relation: &RelationDef) -> bool {
        *relation == Self::MEMBERS && self.members.is_loaded()
    }
}
