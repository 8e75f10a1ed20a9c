use relquery_core::models::{Member, Team};
use relquery_core::session::{MemorySession, MemoryStore, SessionExt, StorageSession};
use relquery_core::QueryConfig;
use std::sync::Arc;

/// Store seeded with teamA (member1 10, member2 20) and teamB (member3 30, member4 40)
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub team_a: Team,
    pub team_b: Team,
    pub members: Vec<Member>,
}

impl Fixture {
    pub fn session(&self) -> MemorySession {
        self.store.open_session()
    }
}

pub fn seeded() -> Fixture {
    seeded_with(QueryConfig::default())
}

pub fn seeded_with(config: QueryConfig) -> Fixture {
    let store = Arc::new(MemoryStore::with_config(config));
    let mut session = store.open_session();

    let mut team_a = Team::new("teamA");
    let mut team_b = Team::new("teamB");
    session.save(&mut team_a).unwrap();
    session.save(&mut team_b).unwrap();

    let mut members = vec![
        Member::with_team("member1", 10, &team_a),
        Member::with_team("member2", 20, &team_a),
        Member::with_team("member3", 30, &team_b),
        Member::with_team("member4", 40, &team_b),
    ];
    for member in &mut members {
        session.save(member).unwrap();
    }
    session.flush().unwrap();

    Fixture {
        store,
        team_a,
        team_b,
        members,
    }
}

/// Save extra members without a team
pub fn add_members(fixture: &Fixture, members: Vec<Member>) -> Vec<Member> {
    let mut session = fixture.session();
    let mut saved = Vec::with_capacity(members.len());
    for mut member in members {
        session.save(&mut member).unwrap();
        saved.push(member);
    }
    session.flush().unwrap();
    saved
}

pub fn usernames(members: &[Member]) -> Vec<Option<&str>> {
    members.iter().map(|m| m.username.as_deref()).collect()
}
