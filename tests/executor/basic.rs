use crate::common::{add_members, seeded, seeded_with, usernames};
use relquery_core::models::{Member, Team};
use relquery_core::query_builder::{MemberScopes, NullOrdering, QueryBuilder, WhereClause};
use relquery_core::session::StorageSession;
use relquery_core::{MemberSearchCondition, QueryConfig, QueryError, QueryExecutor};

#[test]
fn test_search_by_username_and_age() {
    let fixture = seeded();
    let mut session = fixture.session();

    let found = QueryBuilder::select_from::<Member>()
        .filter(Member::USERNAME.eq("member1"))
        .filter(Member::AGE.between(10, 30))
        .fetch_one::<Member>(&mut session)
        .unwrap()
        .unwrap();
    assert_eq!(found.username.as_deref(), Some("member1"));
    assert_eq!(found.id, fixture.members[0].id);
}

#[test]
fn test_empty_criteria_returns_every_row() {
    let fixture = seeded();
    let mut session = fixture.session();

    let query = MemberScopes::search(&MemberSearchCondition::default()).unwrap();
    let members = query.fetch_all::<Member>(&mut session).unwrap();
    assert_eq!(members.len(), 4);
}

#[test]
fn test_null_parameters_are_ignored() {
    let fixture = seeded();
    let mut session = fixture.session();

    let members = QueryBuilder::select_from::<Member>()
        .filter_all([
            MemberScopes::username_eq(Some("member1")),
            MemberScopes::age_eq(None),
        ])
        .fetch_all::<Member>(&mut session)
        .unwrap();
    assert_eq!(usernames(&members), vec![Some("member1")]);
}

#[test]
fn test_exact_age_scope() {
    let fixture = seeded();
    let mut session = fixture.session();

    let members = QueryBuilder::select_from::<Member>()
        .filter_all([MemberScopes::username_eq(None), MemberScopes::age_eq(Some(30))])
        .fetch_all::<Member>(&mut session)
        .unwrap();
    assert_eq!(usernames(&members), vec![Some("member3")]);
}

#[test]
fn test_not_in_excludes_listed_values() {
    let fixture = seeded();
    let mut session = fixture.session();
    add_members(&fixture, vec![Member::unnamed(50)]);

    let members = QueryBuilder::select_from::<Member>()
        .filter(Member::USERNAME.not_in(["member1", "member4"]))
        .order_asc(Member::ID)
        .fetch_all::<Member>(&mut session)
        .unwrap();
    assert_eq!(usernames(&members), vec![Some("member2"), Some("member3")]);
}

#[test]
fn test_predicate_order_does_not_change_results() {
    let fixture = seeded();
    let mut session = fixture.session();

    let forward = QueryBuilder::select_from::<Member>()
        .filter(Member::AGE.goe(15))
        .filter(Member::AGE.loe(35))
        .fetch_all::<Member>(&mut session)
        .unwrap();
    let reverse = QueryBuilder::select_from::<Member>()
        .filter(Member::AGE.loe(35))
        .filter(Member::AGE.goe(15))
        .fetch_all::<Member>(&mut session)
        .unwrap();
    assert_eq!(forward, reverse);
    assert_eq!(usernames(&forward), vec![Some("member2"), Some("member3")]);
}

#[test]
fn test_or_group() {
    let fixture = seeded();
    let mut session = fixture.session();

    let members = QueryBuilder::select_from::<Member>()
        .where_clause(WhereClause::or(vec![
            Member::AGE.lt(15),
            Member::USERNAME.eq("member4"),
        ]))
        .fetch_all::<Member>(&mut session)
        .unwrap();
    assert_eq!(usernames(&members), vec![Some("member1"), Some("member4")]);
}

#[test]
fn test_sort_desc_then_username_nulls_last() {
    let fixture = seeded();
    add_members(
        &fixture,
        vec![
            Member::unnamed(100),
            Member::new("member5", 100),
            Member::new("member6", 100),
        ],
    );
    let mut session = fixture.session();

    let members = QueryBuilder::select_from::<Member>()
        .filter(Member::AGE.eq(100))
        .order_by(Member::AGE.desc())
        .order_by(Member::USERNAME.asc().nulls_last())
        .fetch_all::<Member>(&mut session)
        .unwrap();
    assert_eq!(
        usernames(&members),
        vec![Some("member5"), Some("member6"), None]
    );
}

#[test]
fn test_nulls_first_ignores_direction() {
    let fixture = seeded();
    add_members(
        &fixture,
        vec![
            Member::new("b", 100),
            Member::unnamed(100),
            Member::new("a", 100),
        ],
    );
    let mut session = fixture.session();

    let members = QueryBuilder::select_from::<Member>()
        .filter(Member::AGE.eq(100))
        .order_by(Member::USERNAME.desc().nulls_first())
        .fetch_all::<Member>(&mut session)
        .unwrap();
    assert_eq!(usernames(&members), vec![None, Some("b"), Some("a")]);
}

#[test]
fn test_default_null_ordering_comes_from_config() {
    let config = QueryConfig {
        default_null_ordering: NullOrdering::First,
        ..QueryConfig::default()
    };
    let fixture = seeded_with(config);
    add_members(&fixture, vec![Member::unnamed(100), Member::new("a", 100)]);
    let mut session = fixture.session();

    let members = QueryBuilder::select_from::<Member>()
        .filter(Member::AGE.eq(100))
        .order_asc(Member::USERNAME)
        .fetch_all::<Member>(&mut session)
        .unwrap();
    assert_eq!(usernames(&members), vec![None, Some("a")]);
}

#[test]
fn test_null_username_never_matches_comparison() {
    let fixture = seeded();
    add_members(&fixture, vec![Member::unnamed(100)]);
    let mut session = fixture.session();

    let not_member1 = QueryBuilder::select_from::<Member>()
        .filter(Member::USERNAME.ne("member1"))
        .count(&mut session)
        .unwrap();
    assert_eq!(not_member1, 3);

    let unnamed = QueryBuilder::select_from::<Member>()
        .filter(Member::USERNAME.is_null())
        .count(&mut session)
        .unwrap();
    assert_eq!(unnamed, 1);
}

#[test]
fn test_fetch_one_rejects_multiple_rows() {
    let fixture = seeded();
    let mut session = fixture.session();

    let err = QueryBuilder::select_from::<Member>()
        .fetch_one::<Member>(&mut session)
        .unwrap_err();
    assert_eq!(err, QueryError::NonUniqueResult(4));

    let none = QueryBuilder::select_from::<Member>()
        .filter(Member::USERNAME.eq("nobody"))
        .fetch_one::<Member>(&mut session)
        .unwrap();
    assert!(none.is_none());
}

#[test]
fn test_fetch_first_and_exists() {
    let fixture = seeded();
    let mut session = fixture.session();

    let oldest = QueryBuilder::select_from::<Member>()
        .order_desc(Member::AGE)
        .fetch_first::<Member>(&mut session)
        .unwrap()
        .unwrap();
    assert_eq!(oldest.age, 40);

    let query = QueryBuilder::select_from::<Member>().filter(Member::AGE.gt(100));
    assert!(!query.exists(&mut session).unwrap());
}

#[test]
fn test_unjoined_table_reference_rejected() {
    let fixture = seeded();
    let mut session = fixture.session();

    let err = QueryBuilder::select_from::<Member>()
        .filter(Team::NAME.eq("teamA"))
        .fetch_all::<Member>(&mut session)
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidArgument(_)));
}

#[test]
fn test_aggregate_in_where_rejected() {
    let fixture = seeded();
    let mut session = fixture.session();

    let err = QueryBuilder::select_from::<Member>()
        .filter(Member::AGE.avg().gt(10))
        .fetch_all::<Member>(&mut session)
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidArgument(_)));
}

#[test]
fn test_wrong_entity_type_rejected() {
    let fixture = seeded();
    let mut session = fixture.session();

    let err = QueryBuilder::select_from::<Member>()
        .fetch_all::<Team>(&mut session)
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidArgument(_)));
}

#[test]
fn test_closed_session_is_storage_unavailable() {
    let fixture = seeded();
    let mut session = fixture.session();
    session.close();

    let err = QueryBuilder::select_from::<Member>()
        .fetch_all::<Member>(&mut session)
        .unwrap_err();
    assert!(matches!(err, QueryError::StorageUnavailable(_)));
}

#[test]
fn test_shutdown_store_is_storage_unavailable() {
    let fixture = seeded();
    let mut session = fixture.session();
    fixture.store.shutdown();

    let err = QueryExecutor::new(&mut session)
        .count(&QueryBuilder::select_from::<Member>())
        .unwrap_err();
    assert!(matches!(err, QueryError::StorageUnavailable(_)));
}
