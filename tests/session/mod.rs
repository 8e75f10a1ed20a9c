use relquery_core::models::{Entity, Member, Team};
use relquery_core::query_builder::QueryBuilder;
use relquery_core::session::{MemoryStore, SessionExt, StorageSession};
use relquery_core::QueryConfig;

#[test]
fn test_saved_rows_visible_to_other_sessions_after_flush() {
    let store = MemoryStore::new();
    let mut writer = store.open_session();
    let mut team = Team::new("teamA");
    writer.save(&mut team).unwrap();

    let mut reader = store.open_session();
    assert!(reader.find_entity::<Team>(team.id.unwrap()).unwrap().is_none());

    writer.flush().unwrap();
    let found = reader.find_entity::<Team>(team.id.unwrap()).unwrap().unwrap();
    assert_eq!(found.name, "teamA");
}

#[test]
fn test_query_auto_flushes_staged_rows() {
    let store = MemoryStore::new();
    let mut session = store.open_session();
    session.save(&mut Member::new("member1", 10)).unwrap();

    let count = QueryBuilder::select_from::<Member>()
        .count(&mut session)
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(store.row_count(Member::TABLE), 1);
}

#[test]
fn test_auto_flush_disabled_by_config() {
    let store = std::sync::Arc::new(MemoryStore::with_config(QueryConfig {
        auto_flush: false,
        ..QueryConfig::default()
    }));
    let mut session = store.open_session();
    let mut member = Member::new("member1", 10);
    session.save(&mut member).unwrap();

    let count = QueryBuilder::select_from::<Member>()
        .count(&mut session)
        .unwrap();
    assert_eq!(count, 0);

    // Lookup by id still sees the staged row
    let staged = session.find_entity::<Member>(member.id.unwrap()).unwrap();
    assert!(staged.is_some());
}

#[test]
fn test_clear_drops_unflushed_entities() {
    let store = MemoryStore::new();
    let mut session = store.open_session();
    session.save(&mut Member::new("member1", 10)).unwrap();
    session.clear();
    session.flush().unwrap();
    assert_eq!(store.row_count(Member::TABLE), 0);
}
