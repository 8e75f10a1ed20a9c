use crate::common::seeded;
use relquery_core::models::Member;
use relquery_core::query_builder::{QueryBuilder, UpdateBuilder};
use relquery_core::QueryError;

#[test]
fn test_bulk_update_changes_matching_rows() {
    let fixture = seeded();
    let mut session = fixture.session();

    let loaded = QueryBuilder::select_from::<Member>()
        .order_asc(Member::ID)
        .fetch_all::<Member>(&mut session)
        .unwrap();

    let affected = UpdateBuilder::update::<Member>()
        .set(Member::USERNAME, "guest")
        .filter(Member::AGE.lt(26))
        .execute(&mut session)
        .unwrap();
    assert_eq!(affected, 2);

    // Entities read before the update are not refreshed
    assert_eq!(loaded[0].username.as_deref(), Some("member1"));

    let mut fresh = fixture.session();
    let guests = QueryBuilder::select_from::<Member>()
        .filter(Member::USERNAME.eq("guest"))
        .fetch_column::<i32>(&mut fresh, Member::AGE)
        .unwrap();
    assert_eq!(guests, vec![10, 20]);
}

#[test]
fn test_bulk_add() {
    let fixture = seeded();
    let mut session = fixture.session();

    let affected = UpdateBuilder::update::<Member>()
        .add(Member::AGE, 1)
        .execute(&mut session)
        .unwrap();
    assert_eq!(affected, 4);

    let ages: Vec<i32> = QueryBuilder::select_from::<Member>()
        .order_asc(Member::AGE)
        .fetch_column(&mut session, Member::AGE)
        .unwrap();
    assert_eq!(ages, vec![11, 21, 31, 41]);
}

#[test]
fn test_bulk_update_without_match_changes_nothing() {
    let fixture = seeded();
    let mut session = fixture.session();

    let affected = UpdateBuilder::update::<Member>()
        .set(Member::USERNAME, "guest")
        .filter(Member::AGE.gt(100))
        .execute(&mut session)
        .unwrap();
    assert_eq!(affected, 0);
}

#[test]
fn test_updating_id_rejected() {
    let fixture = seeded();
    let mut session = fixture.session();

    let err = UpdateBuilder::update::<Member>()
        .set(Member::ID, 99)
        .execute(&mut session)
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidArgument(_)));
}

#[test]
fn test_update_condition_on_other_table_rejected() {
    let fixture = seeded();
    let mut session = fixture.session();

    let err = UpdateBuilder::update::<Member>()
        .set(Member::USERNAME, "guest")
        .filter(relquery_core::models::Team::NAME.eq("teamA"))
        .execute(&mut session)
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidArgument(_)));
}

#[test]
fn test_mistyped_assignment_rejected_and_table_untouched() {
    let fixture = seeded();
    let mut session = fixture.session();

    let err = UpdateBuilder::update::<Member>()
        .set(Member::AGE, "old")
        .filter(Member::AGE.gt(25))
        .execute(&mut session)
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidArgument(_)));

    let ages = QueryBuilder::select_from::<Member>()
        .order_asc(Member::ID)
        .fetch_column::<i32>(&mut session, Member::AGE)
        .unwrap();
    assert_eq!(ages, vec![10, 20, 30, 40]);
    assert_eq!(
        QueryBuilder::select_from::<Member>()
            .fetch_all::<Member>(&mut session)
            .unwrap()
            .len(),
        4
    );
}
