use crate::common::{seeded, usernames};
use relquery_core::models::Member;
use relquery_core::query_builder::QueryBuilder;
use relquery_core::{QueryConfig, QueryError};

#[test]
fn test_page_with_offset_and_limit() {
    let fixture = seeded();
    let mut session = fixture.session();

    let page = QueryBuilder::select_from::<Member>()
        .order_desc(Member::USERNAME)
        .offset(1)
        .limit(2)
        .fetch_page::<Member>(&mut session)
        .unwrap();

    assert_eq!(page.results.len(), 2);
    assert_eq!(page.total, 4);
    assert_eq!(page.limit, 2);
    assert_eq!(page.offset, 1);
    assert_eq!(usernames(&page.results), vec![Some("member3"), Some("member2")]);
    assert!(page.has_next_page());
    assert_eq!(page.total_pages(), 2);
}

#[test]
fn test_page_past_the_end_is_empty() {
    let fixture = seeded();
    let mut session = fixture.session();

    let page = QueryBuilder::select_from::<Member>()
        .paginate(3, 2)
        .fetch_page::<Member>(&mut session)
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total, 4);
    assert_eq!(page.offset, 4);
}

#[test]
fn test_huge_page_number_reads_nothing() {
    let fixture = seeded();
    let mut session = fixture.session();

    let page = QueryBuilder::select_from::<Member>()
        .paginate(i64::MAX, 10)
        .fetch_page::<Member>(&mut session)
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total, 4);
    assert_eq!(page.offset, i64::MAX as u64);
    assert!(!page.has_next_page());
}

#[test]
fn test_window_without_page() {
    let fixture = seeded();
    let mut session = fixture.session();

    let members = QueryBuilder::select_from::<Member>()
        .order_asc(Member::AGE)
        .offset(1)
        .limit(2)
        .fetch_all::<Member>(&mut session)
        .unwrap();
    assert_eq!(usernames(&members), vec![Some("member2"), Some("member3")]);
}

#[test]
fn test_page_requires_limit() {
    let fixture = seeded();
    let mut session = fixture.session();

    let err = QueryBuilder::select_from::<Member>()
        .offset(1)
        .fetch_page::<Member>(&mut session)
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidArgument(_)));
}

#[test]
fn test_negative_offset_rejected() {
    let fixture = seeded();
    let mut session = fixture.session();

    let err = QueryBuilder::select_from::<Member>()
        .offset(-1)
        .limit(2)
        .fetch_page::<Member>(&mut session)
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidArgument(_)));
}

#[test]
fn test_limit_above_max_page_size_rejected() {
    let fixture = crate::common::seeded_with(QueryConfig {
        max_page_size: 3,
        ..QueryConfig::default()
    });
    let mut session = fixture.session();

    let err = QueryBuilder::select_from::<Member>()
        .limit(4)
        .fetch_all::<Member>(&mut session)
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidArgument(_)));
}

#[test]
fn test_count_ignores_window() {
    let fixture = seeded();
    let mut session = fixture.session();

    let count = QueryBuilder::select_from::<Member>()
        .limit(1)
        .count(&mut session)
        .unwrap();
    assert_eq!(count, 4);
}
