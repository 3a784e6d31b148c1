use async_trait::async_trait;

use crate::{
    error::Result,
    types::{ChangeRequest, GithubContext, GithubState, Issue, Repository, ReviewDecisions},
};

/// Read access to a code-hosting service.
///
/// Implementations translate the service's responses into pullbug's domain
/// records; nothing outside the implementation sees raw response shapes.
/// Empty listings are `Ok(vec![])`, never errors.
#[async_trait]
pub trait Forge {
    /// Lists every repository of `owner`, who is a user or an organisation
    /// depending on `context`.
    async fn list_repositories(
        &self,
        owner: &str,
        context: GithubContext,
    ) -> Result<Vec<Repository>>;

    async fn list_change_requests(
        &self,
        repository: &Repository,
        state: GithubState,
    ) -> Result<Vec<ChangeRequest>>;

    /// Lists issues, excluding anything the service also considers a
    /// change request.
    async fn list_issues(&self, repository: &Repository, state: GithubState) -> Result<Vec<Issue>>;

    async fn list_review_decisions(&self, change_request: &ChangeRequest)
    -> Result<ReviewDecisions>;
}
