use crate::common::{seeded, usernames};
use relquery_core::dto::{MemberSearchCondition, MemberTeamDto};
use relquery_core::models::Member;
use relquery_core::query_builder::Pagination;
use relquery_core::repository::MemberRepository;
use relquery_core::session::{MemoryStore, StorageSession};
use relquery_core::QueryError;

#[test]
fn test_save_and_find() {
    let store = MemoryStore::new();
    let mut session = store.open_session();
    let mut repository = MemberRepository::new(&mut session);

    let mut member = Member::new("member1", 10);
    let id = repository.save(&mut member).unwrap();
    assert_eq!(member.id, Some(id));

    let found = repository.find_by_id(id).unwrap().unwrap();
    assert_eq!(found.username.as_deref(), Some("member1"));

    let all = repository.find_all().unwrap();
    assert_eq!(all.len(), 1);

    let by_name = repository.find_by_username("member1").unwrap();
    assert_eq!(by_name[0].id, Some(id));
}

#[test]
fn test_save_twice_rejected() {
    let store = MemoryStore::new();
    let mut session = store.open_session();
    let mut repository = MemberRepository::new(&mut session);

    let mut member = Member::new("member1", 10);
    repository.save(&mut member).unwrap();
    let err = repository.save(&mut member).unwrap_err();
    assert!(matches!(err, QueryError::InvalidArgument(_)));
}

#[test]
fn test_search_by_criteria() {
    let fixture = seeded();
    let mut session = fixture.session();
    let mut repository = MemberRepository::new(&mut session);

    let criteria = MemberSearchCondition::default()
        .with_age_goe(35)
        .with_age_loe(40)
        .with_team_name("teamB");
    let found = repository.search(&criteria).unwrap();

    assert_eq!(
        found,
        vec![MemberTeamDto::new(
            fixture.members[3].id.unwrap(),
            Some("member4".to_string()),
            40,
            fixture.team_b.id,
            Some("teamB".to_string()),
        )]
    );
}

#[test]
fn test_search_without_criteria_includes_teamless_members() {
    let fixture = seeded();
    crate::common::add_members(&fixture, vec![Member::new("loner", 50)]);
    let mut session = fixture.session();

    let found = MemberRepository::new(&mut session)
        .search(&MemberSearchCondition::default())
        .unwrap();
    assert_eq!(found.len(), 5);
    assert_eq!(found[4].team_name, None);
}

#[test]
fn test_search_with_inverted_bounds() {
    let fixture = seeded();
    let mut session = fixture.session();

    let criteria = MemberSearchCondition::default()
        .with_age_goe(40)
        .with_age_loe(10);
    let err = MemberRepository::new(&mut session)
        .search(&criteria)
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidArgument(_)));
}

#[test]
fn test_search_page() {
    let fixture = seeded();
    let mut session = fixture.session();

    let page = MemberRepository::new(&mut session)
        .search_page(&MemberSearchCondition::default(), Pagination::limit_offset(3, 0))
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.results.len(), 3);
    assert_eq!(page.results[0].username.as_deref(), Some("member1"));
}

#[test]
fn test_search_on_closed_session() {
    let fixture = seeded();
    let mut session = fixture.session();
    session.close();

    let err = MemberRepository::new(&mut session)
        .search(&MemberSearchCondition::default())
        .unwrap_err();
    assert!(matches!(err, QueryError::StorageUnavailable(_)));
}

#[test]
fn test_find_all_in_id_order() {
    let fixture = seeded();
    let mut session = fixture.session();

    let members = MemberRepository::new(&mut session).find_all().unwrap();
    assert_eq!(
        usernames(&members),
        vec![Some("member1"), Some("member2"), Some("member3"), Some("member4")]
    );
}
