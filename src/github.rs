use async_trait::async_trait;
use http::{StatusCode, Uri};
use octocrab::{Octocrab, Page};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    config::Config,
    error::{PullbugError, Result},
    forge::Forge,
    types::{
        ChangeRequest, GithubContext, GithubState, Issue, Repository, ReviewDecisions, Reviewer,
        Team, User,
    },
};

const PER_PAGE: &str = "100";

/// Picks the token from the command line, then `GITHUB_TOKEN`, then
/// `GH_TOKEN`. `None` means unauthenticated requests.
pub fn get_github_token(explicit: Option<&str>) -> Option<String> {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var("GITHUB_TOKEN").ok())
        .or_else(|| std::env::var("GH_TOKEN").ok())
        .filter(|token| !token.trim().is_empty())
}

/// Creates a GitHub client for `base_url`, authenticated when a token is
/// given.
pub fn setup_github_client(token: Option<&str>, base_url: &str) -> Result<Octocrab> {
    let base_uri: Uri = base_url.parse().map_err(|e| PullbugError::Configuration {
        message: format!("Invalid base_url '{base_url}': {e}"),
    })?;

    let mut builder = Octocrab::builder()
        .base_uri(base_uri)
        .map_err(|e| map_octocrab_error("build client", &e))?;
    if let Some(token) = token {
        builder = builder.personal_token(token.to_string());
    }

    builder
        .build()
        .map_err(|e| map_octocrab_error("build client", &e))
}

/// [`Forge`] backed by the GitHub REST API.
pub struct GitHub {
    client: Octocrab,
}

impl GitHub {
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let token = get_github_token(config.github_token.as_deref());
        if token.is_none() {
            debug!("No GitHub token found, using unauthenticated requests");
        }
        setup_github_client(token.as_deref(), &config.base_url).map(Self::new)
    }

    /// Fetches the first page of `route` and follows `Link` headers to the
    /// end.
    async fn get_all<T>(
        &self,
        operation: &str,
        route: &str,
        state: Option<GithubState>,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut params = vec![("per_page", PER_PAGE)];
        if let Some(state) = state {
            params.push(("state", state.as_str()));
        }

        debug!(route, "GET");
        let page = self
            .client
            .get::<Page<T>, _, _>(route, Some(&params))
            .await
            .map_err(|e| map_octocrab_error(operation, &e))?;

        self.client
            .all_pages(page)
            .await
            .map_err(|e| map_octocrab_error(operation, &e))
    }
}

#[async_trait]
impl Forge for GitHub {
    async fn list_repositories(
        &self,
        owner: &str,
        context: GithubContext,
    ) -> Result<Vec<Repository>> {
        let route = format!("/{context}/{owner}/repos");
        let operation = format!("list repositories of {owner} ({context})");

        let repos: Vec<ApiRepository> = self
            .get_all(&operation, &route, None)
            .await
            .map_err(|err| match err {
                PullbugError::NotFound { .. } => PullbugError::NotFound {
                    message: format!(
                        "Could not retrieve GitHub repos due to bad parameter: {owner} | {context}."
                    ),
                },
                other => other,
            })?;

        Ok(repos.into_iter().map(Into::into).collect())
    }

    async fn list_change_requests(
        &self,
        repository: &Repository,
        state: GithubState,
    ) -> Result<Vec<ChangeRequest>> {
        let route = format!("/repos/{}/{}/pulls", repository.owner, repository.name);
        let operation = format!("list pull requests of {}", repository.full_name());

        let pulls: Vec<ApiPullRequest> = self.get_all(&operation, &route, Some(state)).await?;
        debug!(
            repo = %repository.full_name(),
            count = pulls.len(),
            "Pull requests page(s) retrieved"
        );

        Ok(pulls.into_iter().map(Into::into).collect())
    }

    async fn list_issues(&self, repository: &Repository, state: GithubState) -> Result<Vec<Issue>> {
        let route = format!("/repos/{}/{}/issues", repository.owner, repository.name);
        let operation = format!("list issues of {}", repository.full_name());

        let issues: Vec<ApiIssue> = self.get_all(&operation, &route, Some(state)).await?;

        // The issues endpoint also returns pull requests.
        Ok(issues
            .into_iter()
            .filter(|issue| issue.pull_request.is_none())
            .map(|issue| issue.into_issue(repository))
            .collect())
    }

    async fn list_review_decisions(
        &self,
        change_request: &ChangeRequest,
    ) -> Result<ReviewDecisions> {
        let repository = &change_request.repository;
        let route = format!(
            "/repos/{}/{}/pulls/{}/reviews",
            repository.owner, repository.name, change_request.number
        );
        let operation = format!(
            "list reviews of {}#{}",
            repository.full_name(),
            change_request.number
        );

        let reviews: Vec<ApiReview> = self.get_all(&operation, &route, None).await?;
        Ok(categorise_reviews(reviews))
    }
}

fn categorise_reviews(reviews: Vec<ApiReview>) -> ReviewDecisions {
    let mut decisions = ReviewDecisions::default();

    for review in reviews {
        let Some(user) = review.user else {
            continue;
        };
        match review.state.as_str() {
            "APPROVED" => decisions.record_approved(user.into()),
            "CHANGES_REQUESTED" => decisions.record_changes_requested(user.into()),
            "DISMISSED" => decisions.record_dismissed(user.into()),
            _ => {}
        }
    }

    decisions
}

/// Maps an octocrab failure onto the two remote error kinds: "not found"
/// for a 404, transport for every other status or client failure.
pub(crate) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> PullbugError {
    match error {
        octocrab::Error::GitHub { source, .. }
            if source.status_code == StatusCode::NOT_FOUND
                || source.message.contains("Not Found") =>
        {
            PullbugError::NotFound {
                message: format!("{operation}: {}", source.message),
            }
        }
        octocrab::Error::GitHub { source, .. } => PullbugError::Transport {
            message: format!(
                "{operation} failed with status {}: {}",
                source.status_code, source.message
            ),
        },
        other => PullbugError::Transport {
            message: format!("{operation} failed: {other}"),
        },
    }
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    login: String,
    #[serde(default)]
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiTeam {
    name: String,
    #[serde(default)]
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiRepository {
    name: String,
    owner: ApiUser,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiBase {
    repo: ApiRepository,
}

#[derive(Debug, Deserialize)]
struct ApiPullRequest {
    number: u64,
    title: String,
    body: Option<String>,
    html_url: String,
    user: Option<ApiUser>,
    #[serde(default)]
    draft: Option<bool>,
    base: ApiBase,
    #[serde(default)]
    assignees: Option<Vec<ApiUser>>,
    #[serde(default)]
    requested_reviewers: Option<Vec<ApiUser>>,
    #[serde(default)]
    requested_teams: Option<Vec<ApiTeam>>,
}

#[derive(Debug, Deserialize)]
struct ApiIssue {
    title: String,
    body: Option<String>,
    html_url: String,
    #[serde(default)]
    assignees: Option<Vec<ApiUser>>,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ApiReview {
    user: Option<ApiUser>,
    state: String,
}

impl From<ApiUser> for User {
    fn from(user: ApiUser) -> Self {
        User::new(user.login, user.html_url)
    }
}

impl From<ApiTeam> for Team {
    fn from(team: ApiTeam) -> Self {
        Team::new(team.name, team.html_url)
    }
}

impl From<ApiRepository> for Repository {
    fn from(repo: ApiRepository) -> Self {
        Repository::new(repo.owner.login, repo.name, repo.html_url)
    }
}

impl From<ApiPullRequest> for ChangeRequest {
    fn from(pr: ApiPullRequest) -> Self {
        let author = pr
            .user
            .map(User::from)
            .unwrap_or_else(|| User::new("ghost", "https://github.com/ghost"));

        let requested_reviewers = pr
            .requested_reviewers
            .unwrap_or_default()
            .into_iter()
            .map(|user| Reviewer::User(user.into()))
            .chain(
                pr.requested_teams
                    .unwrap_or_default()
                    .into_iter()
                    .map(|team| Reviewer::Team(team.into())),
            )
            .collect();

        ChangeRequest {
            number: pr.number,
            title: pr.title,
            body: pr.body,
            url: pr.html_url,
            author,
            draft: pr.draft.unwrap_or(false),
            repository: pr.base.repo.into(),
            assignees: pr
                .assignees
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
            requested_reviewers,
            reviews: ReviewDecisions::default(),
        }
    }
}

impl ApiIssue {
    fn into_issue(self, repository: &Repository) -> Issue {
        Issue {
            title: self.title,
            body: self.body,
            url: self.html_url,
            assignees: self
                .assignees
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
            repository: repository.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn review(login: &str, state: &str) -> ApiReview {
        serde_json::from_value(json!({
            "user": { "login": login, "html_url": format!("https://github.com/{login}") },
            "state": state,
        }))
        .unwrap()
    }

    #[test]
    fn test_categorise_reviews() {
        let decisions = categorise_reviews(vec![
            review("alice", "CHANGES_REQUESTED"),
            review("alice", "APPROVED"),
            review("bob", "COMMENTED"),
            review("carol", "DISMISSED"),
            review("alice", "APPROVED"),
        ]);

        assert_eq!(decisions.approved, vec![User::new("alice", "https://github.com/alice")]);
        assert_eq!(decisions.changes_requested.len(), 1);
        assert_eq!(decisions.dismissed[0].login, "carol");
    }

    #[test]
    fn test_reviews_without_user_are_skipped() {
        let ghost: ApiReview =
            serde_json::from_value(json!({ "user": null, "state": "APPROVED" })).unwrap();
        assert!(categorise_reviews(vec![ghost]).is_empty());
    }

    #[test]
    fn test_pull_request_conversion() {
        let api: ApiPullRequest = serde_json::from_value(json!({
            "number": 7,
            "title": "Add widgets",
            "body": null,
            "html_url": "https://github.com/acme/widgets/pull/7",
            "user": { "login": "alice", "html_url": "https://github.com/alice" },
            "draft": true,
            "base": { "repo": {
                "name": "widgets",
                "owner": { "login": "acme", "html_url": "https://github.com/acme" },
                "html_url": "https://github.com/acme/widgets"
            }},
            "assignees": [],
            "requested_reviewers": [{ "login": "bob", "html_url": "https://github.com/bob" }],
            "requested_teams": [
                { "name": "core", "html_url": "https://github.com/orgs/acme/teams/core" }
            ]
        }))
        .unwrap();

        let pr = ChangeRequest::from(api);
        assert_eq!(pr.number, 7);
        assert!(pr.draft);
        assert_eq!(pr.body, None);
        assert_eq!(pr.repository.full_name(), "acme/widgets");
        assert_eq!(pr.requested_reviewers.len(), 2);
        assert_eq!(pr.requested_reviewers[0].name(), "bob");
        assert!(matches!(pr.requested_reviewers[1], Reviewer::Team(_)));
    }

    #[test]
    fn test_missing_author_falls_back_to_ghost() {
        let api: ApiPullRequest = serde_json::from_value(json!({
            "number": 1,
            "title": "t",
            "body": "b",
            "html_url": "https://github.com/acme/widgets/pull/1",
            "user": null,
            "base": { "repo": {
                "name": "widgets",
                "owner": { "login": "acme" },
                "html_url": "https://github.com/acme/widgets"
            }}
        }))
        .unwrap();

        let pr = ChangeRequest::from(api);
        assert_eq!(pr.author.login, "ghost");
        assert!(!pr.draft);
        assert!(pr.requested_reviewers.is_empty());
    }

    #[test]
    fn test_token_prefers_explicit_value() {
        assert_eq!(get_github_token(Some("abc")), Some("abc".to_string()));
    }
}
