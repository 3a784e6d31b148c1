use std::fmt;

use clap::ValueEnum;

/// Which pull requests or issues to ask GitHub for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum GithubState {
    #[default]
    Open,
    Closed,
    All,
}

/// Whether the owner is a user or an organisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum GithubContext {
    #[default]
    Users,
    Orgs,
}

/// Chat platforms pullbug can post to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Slack,
    Discord,
    RocketChat,
}

impl GithubState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GithubState::Open => "open",
            GithubState::Closed => "closed",
            GithubState::All => "all",
        }
    }
}

impl GithubContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            GithubContext::Users => "users",
            GithubContext::Orgs => "orgs",
        }
    }
}

impl fmt::Display for GithubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for GithubContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Slack => write!(f, "Slack"),
            Platform::Discord => write!(f, "Discord"),
            Platform::RocketChat => write!(f, "Rocket.Chat"),
        }
    }
}

/// A repository owned by the configured GitHub user or organisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub name: String,
    pub owner: String,
    pub url: String,
}

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            url: url.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub login: String,
    pub url: String,
}

impl User {
    pub fn new(login: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub name: String,
    pub url: String,
}

impl Team {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Someone asked to review a change request: a person or a whole team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reviewer {
    User(User),
    Team(Team),
}

impl Reviewer {
    pub fn name(&self) -> &str {
        match self {
            Reviewer::User(user) => &user.login,
            Reviewer::Team(team) => &team.name,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Reviewer::User(user) => &user.url,
            Reviewer::Team(team) => &team.url,
        }
    }
}

/// Review verdicts recorded on a change request, grouped by state.
///
/// Each group holds a user at most once, in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewDecisions {
    pub approved: Vec<User>,
    pub changes_requested: Vec<User>,
    pub dismissed: Vec<User>,
}

impl ReviewDecisions {
    pub fn record_approved(&mut self, user: User) {
        insert_unique(&mut self.approved, user);
    }

    pub fn record_changes_requested(&mut self, user: User) {
        insert_unique(&mut self.changes_requested, user);
    }

    pub fn record_dismissed(&mut self, user: User) {
        insert_unique(&mut self.dismissed, user);
    }

    pub fn has_approved(&self, login: &str) -> bool {
        self.approved.iter().any(|user| user.login == login)
    }

    pub fn is_empty(&self) -> bool {
        self.approved.is_empty() && self.changes_requested.is_empty() && self.dismissed.is_empty()
    }
}

fn insert_unique(users: &mut Vec<User>, user: User) {
    if !users.iter().any(|existing| existing.login == user.login) {
        users.push(user);
    }
}

/// A pull request, as far as pullbug cares about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRequest {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub url: String,
    pub author: User,
    pub draft: bool,
    pub repository: Repository,
    pub assignees: Vec<User>,
    pub requested_reviewers: Vec<Reviewer>,
    pub reviews: ReviewDecisions,
}

impl ChangeRequest {
    /// Returns a copy carrying the given review decisions.
    pub fn with_reviews(self, reviews: ReviewDecisions) -> Self {
        Self { reviews, ..self }
    }

    /// Legacy marker: titles containing "WIP" in any case.
    pub fn has_wip_title(&self) -> bool {
        use std::sync::LazyLock;

        use regex::Regex;

        static WIP_MARKER: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"(?i)wip").expect("WIP pattern is valid"));

        WIP_MARKER.is_match(&self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub title: String,
    pub body: Option<String>,
    pub url: String,
    pub assignees: Vec<User>,
    pub repository: Repository,
}

/// One formatted entry in both markup dialects.
///
/// `slack` uses `<url|label>` links and is also what Rocket.Chat receives;
/// `discord` uses `[label](url)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedMessage {
    pub slack: String,
    pub discord: String,
}

impl FormattedMessage {
    pub fn new(slack: impl Into<String>, discord: impl Into<String>) -> Self {
        Self {
            slack: slack.into(),
            discord: discord.into(),
        }
    }

    /// The same text for both platforms (preambles, canned notices).
    pub fn plain(text: &str) -> Self {
        Self::new(text, text)
    }
}
