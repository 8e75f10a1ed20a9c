use crate::dto::{MemberSearchCondition, MemberTeamDto};
use crate::error::Result;
use crate::executor::QueryExecutor;
use crate::logging::log_error;
use crate::models::{Member, Team};
use crate::projection::Projection;
use crate::query_builder::{MemberScopes, Page, Pagination, QueryBuilder};
use crate::session::{SessionExt, StorageSession};

/// Member persistence and criteria search over one session
pub struct MemberRepository<'s> {
    session: &'s mut dyn StorageSession,
}

impl<'s> MemberRepository<'s> {
    pub fn new(session: &'s mut dyn StorageSession) -> Self {
        Self { session }
    }

    /// Persist a new member; the assigned id is written back into `member`
    pub fn save(&mut self, member: &mut Member) -> Result<i64> {
        self.session.save(member)
    }

    pub fn find_by_id(&mut self, id: i64) -> Result<Option<Member>> {
        self.session.find_entity::<Member>(id)
    }

    pub fn find_all(&mut self) -> Result<Vec<Member>> {
        QueryBuilder::select_from::<Member>()
            .order_asc(Member::ID)
            .fetch_all(self.session)
    }

    pub fn find_by_username(&mut self, username: &str) -> Result<Vec<Member>> {
        QueryBuilder::select_from::<Member>()
            .filter(Member::USERNAME.eq(username))
            .order_asc(Member::ID)
            .fetch_all(self.session)
    }

    /// Members with their team matching every present criteria field
    pub fn search(&mut self, criteria: &MemberSearchCondition) -> Result<Vec<MemberTeamDto>> {
        let query = MemberScopes::search(criteria)?.order_asc(Member::ID);
        QueryExecutor::new(self.session)
            .fetch_projected(&query, &Self::member_team())
            .map_err(|e| {
                log_error("member_repository", "search", &e.to_string(), None);
                e
            })
    }

    /// One page of [`search`](Self::search) results with the total match count
    pub fn search_page(
        &mut self,
        criteria: &MemberSearchCondition,
        pagination: Pagination,
    ) -> Result<Page<MemberTeamDto>> {
        let query = MemberScopes::search(criteria)?
            .order_asc(Member::ID)
            .with_pagination(pagination);
        QueryExecutor::new(self.session)
            .fetch_projected_page(&query, &Self::member_team())
            .map_err(|e| {
                log_error(
                    "member_repository",
                    "search_page",
                    &e.to_string(),
                    Some(&pagination.to_string()),
                );
                e
            })
    }

    fn member_team() -> Projection<MemberTeamDto> {
        MemberTeamDto::projection(
            Member::ID,
            Member::USERNAME,
            Member::AGE,
            Team::ID.alias("team_id"),
            Team::NAME.alias("team_name"),
        )
    }
}
