//! Flattening per-repository results into the lists that get formatted.
//!
//! Every function walks its input in order and awaits one request at a
//! time, so output order is repository order, then the order GitHub
//! returned items in.

use tracing::{debug, info};

use crate::{
    error::Result,
    forge::Forge,
    types::{ChangeRequest, GithubContext, GithubState, Issue, Repository},
};

/// Which change requests count as not ready for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DraftPolicy {
    pub include_drafts: bool,
    /// Also treat titles containing "WIP" as drafts.
    pub wip_titles: bool,
}

impl DraftPolicy {
    pub fn new(include_drafts: bool) -> Self {
        Self {
            include_drafts,
            wip_titles: false,
        }
    }

    pub fn with_wip_titles(mut self, wip_titles: bool) -> Self {
        self.wip_titles = wip_titles;
        self
    }

    pub fn keeps(&self, change_request: &ChangeRequest) -> bool {
        if self.include_drafts {
            return true;
        }
        !(change_request.draft || (self.wip_titles && change_request.has_wip_title()))
    }
}

/// Lists the owner's repositories, keeping only names in `allow_list` when
/// it is non-empty. Names in `allow_list` are expected lower-cased.
pub async fn fetch_repositories<F>(
    forge: &F,
    owner: &str,
    context: GithubContext,
    allow_list: &[String],
) -> Result<Vec<Repository>>
where
    F: Forge + Sync + ?Sized,
{
    info!("Bugging GitHub for repos...");
    let repos = forge.list_repositories(owner, context).await?;
    let repos = filter_repositories(repos, allow_list);
    info!("GitHub repos retrieved!");

    Ok(repos)
}

pub fn filter_repositories(repos: Vec<Repository>, allow_list: &[String]) -> Vec<Repository> {
    if allow_list.is_empty() {
        return repos;
    }

    repos
        .into_iter()
        .filter(|repo| allow_list.contains(&repo.name.to_lowercase()))
        .collect()
}

/// Fetches change requests of every repository in order, then drops those
/// `policy` rejects.
pub async fn aggregate_change_requests<F>(
    forge: &F,
    repositories: &[Repository],
    state: GithubState,
    policy: DraftPolicy,
) -> Result<Vec<ChangeRequest>>
where
    F: Forge + Sync + ?Sized,
{
    let change_requests = fetch_change_requests(forge, repositories, state).await?;
    Ok(filter_drafts(change_requests, policy))
}

/// Concatenates the change requests of every repository, unfiltered.
pub async fn fetch_change_requests<F>(
    forge: &F,
    repositories: &[Repository],
    state: GithubState,
) -> Result<Vec<ChangeRequest>>
where
    F: Forge + Sync + ?Sized,
{
    info!("Bugging GitHub for pull requests...");
    let mut change_requests = Vec::new();

    for repo in repositories {
        let pulls = forge.list_change_requests(repo, state).await?;
        debug!(repo = %repo.full_name(), fetched = pulls.len(), "Pull requests fetched");
        change_requests.extend(pulls);
    }

    info!("Pull requests retrieved!");
    Ok(change_requests)
}

pub fn filter_drafts(
    change_requests: Vec<ChangeRequest>,
    policy: DraftPolicy,
) -> Vec<ChangeRequest> {
    let fetched = change_requests.len();
    let kept: Vec<ChangeRequest> = change_requests
        .into_iter()
        .filter(|pr| policy.keeps(pr))
        .collect();
    debug!(fetched, kept = kept.len(), "Drafts filtered");

    kept
}

pub async fn aggregate_issues<F>(
    forge: &F,
    repositories: &[Repository],
    state: GithubState,
) -> Result<Vec<Issue>>
where
    F: Forge + Sync + ?Sized,
{
    info!("Bugging GitHub for issues...");
    let mut issues = Vec::new();

    for repo in repositories {
        let repo_issues = forge.list_issues(repo, state).await?;
        debug!(repo = %repo.full_name(), fetched = repo_issues.len(), "Issues fetched");
        issues.extend(repo_issues);
    }

    info!("Issues retrieved!");
    Ok(issues)
}

/// Fetches the review history of each change request, returning new values
/// that carry their decisions.
pub async fn attach_review_decisions<F>(
    forge: &F,
    change_requests: Vec<ChangeRequest>,
) -> Result<Vec<ChangeRequest>>
where
    F: Forge + Sync + ?Sized,
{
    let mut reviewed = Vec::with_capacity(change_requests.len());

    for pr in change_requests {
        debug!("Bugging GitHub for pull request reviews of {}...", pr.title);
        let decisions = forge.list_review_decisions(&pr).await?;
        reviewed.push(pr.with_reviews(decisions));
    }

    Ok(reviewed)
}
