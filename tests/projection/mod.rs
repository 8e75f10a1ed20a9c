use crate::common::seeded;
use relquery_core::dto::MemberDto;
use relquery_core::models::{Member, Team};
use relquery_core::projection::{Bean, Projection, ProjectionStrategy};
use relquery_core::query_builder::QueryBuilder;
use relquery_core::{QueryError, QueryExecutor, Value};
use serde::Deserialize;

#[derive(Debug, Default, PartialEq, Deserialize)]
struct UserDto {
    name: Option<String>,
    age: i32,
}

fn all_members() -> QueryBuilder {
    QueryBuilder::select_from::<Member>().order_asc(Member::ID)
}

#[test]
fn test_simple_projection() {
    let fixture = seeded();
    let mut session = fixture.session();

    let names: Vec<String> = all_members()
        .fetch_column(&mut session, Member::USERNAME)
        .unwrap();
    assert_eq!(names, vec!["member1", "member2", "member3", "member4"]);
}

#[test]
fn test_tuple_projection() {
    let fixture = seeded();
    let mut session = fixture.session();

    let tuples = all_members()
        .select([Member::USERNAME, Member::AGE])
        .fetch_tuples(&mut session)
        .unwrap();
    assert_eq!(tuples.len(), 4);
    assert_eq!(tuples[3].get_as::<String>(0).unwrap(), "member4");
    assert_eq!(tuples[3].get_expr(&Member::AGE.expr()), Some(&Value::from(40)));
}

#[test]
fn test_field_projection() {
    let fixture = seeded();
    let mut session = fixture.session();

    let projection = Projection::<MemberDto>::fields([Member::USERNAME, Member::AGE]);
    let dtos = all_members().fetch_projected(&mut session, &projection).unwrap();
    assert_eq!(dtos[0], MemberDto::new(Some("member1".to_string()), 10));
    assert_eq!(projection.strategy(), ProjectionStrategy::Fields);
}

#[test]
fn test_field_projection_with_alias() {
    let fixture = seeded();
    let mut session = fixture.session();

    let projection = Projection::<UserDto>::fields([Member::USERNAME.alias("name"), Member::AGE.expr()]);
    let users = all_members().fetch_projected(&mut session, &projection).unwrap();
    assert_eq!(
        users[1],
        UserDto {
            name: Some("member2".to_string()),
            age: 20
        }
    );
}

#[test]
fn test_field_projection_with_colliding_labels() {
    let fixture = seeded();
    let mut session = fixture.session();

    let projection = Projection::<MemberDto>::fields([Member::ID, Team::ID]);
    let err = all_members()
        .inner_join(Member::TEAM)
        .fetch_projected(&mut session, &projection)
        .unwrap_err();
    assert!(matches!(err, QueryError::ProjectionError(_)));
}

#[test]
fn test_setter_projection() {
    let fixture = seeded();
    let mut session = fixture.session();

    let projection = Projection::<MemberDto>::bean([Member::USERNAME, Member::AGE]);
    let dtos = all_members().fetch_projected(&mut session, &projection).unwrap();
    assert_eq!(dtos.len(), 4);
    assert_eq!(dtos[2], MemberDto::new(Some("member3".to_string()), 30));

    let mut dto = MemberDto::default();
    assert!(dto.set("team", Value::from("teamA")).is_err());
}

#[test]
fn test_setter_projection_rejects_shared_label() {
    let fixture = seeded();
    let mut session = fixture.session();

    let projection = Projection::<MemberDto>::bean([
        Member::USERNAME.expr(),
        Team::NAME.alias("username"),
        Member::AGE.expr(),
    ]);
    let err = all_members()
        .inner_join(Member::TEAM)
        .fetch_projected(&mut session, &projection)
        .unwrap_err();
    assert!(matches!(err, QueryError::ProjectionError(_)));
}

#[test]
fn test_constructor_projection() {
    let fixture = seeded();
    let mut session = fixture.session();

    let dtos = all_members()
        .fetch_projected(&mut session, &MemberDto::projection(Member::USERNAME, Member::AGE))
        .unwrap();
    let expected: Vec<MemberDto> = fixture
        .members
        .iter()
        .map(|m| MemberDto::new(m.username.clone(), m.age))
        .collect();
    assert_eq!(dtos, expected);
}

#[test]
fn test_constructor_arity_mismatch() {
    let fixture = seeded();
    let mut session = fixture.session();

    let projection = Projection::<MemberDto>::constructor([Member::USERNAME]);
    let err = all_members()
        .fetch_projected(&mut session, &projection)
        .unwrap_err();
    assert!(matches!(err, QueryError::ProjectionError(_)));
}

#[test]
fn test_projection_of_grouped_query() {
    let fixture = seeded();
    let mut session = fixture.session();

    let query = QueryBuilder::select_from::<Member>()
        .inner_join(Member::TEAM)
        .group_by([Team::NAME]);
    let projection = Projection::<(String, f64)>::constructor([Team::NAME.expr(), Member::AGE.avg()]);
    let averages = QueryExecutor::new(&mut session)
        .fetch_projected(&query, &projection)
        .unwrap();
    assert_eq!(
        averages,
        vec![("teamA".to_string(), 15.0), ("teamB".to_string(), 35.0)]
    );
}

#[test]
fn test_projected_page() {
    let fixture = seeded();
    let mut session = fixture.session();

    let page = QueryExecutor::new(&mut session)
        .fetch_projected_page(
            &all_members().offset(2).limit(5),
            &MemberDto::projection(Member::USERNAME, Member::AGE),
        )
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.results.len(), 2);
    assert_eq!(page.results[0].age, 30);
}
