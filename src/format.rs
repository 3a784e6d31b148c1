//! Rendering change requests and issues as chat messages.
//!
//! Everything here is pure: the same input always renders the same pair of
//! strings, and inputs are only borrowed.

use crate::types::{ChangeRequest, FormattedMessage, Issue, Reviewer, User};

/// Descriptions longer than this many characters are cut and get `...`.
pub const DESCRIPTION_LIMIT: usize = 120;

pub const PULLS_PREAMBLE: &str =
    "\n:bug: *The following GitHub pull requests still need your help!*\n";
pub const ISSUES_PREAMBLE: &str = "\n:bug: *The following GitHub issues still need your help!*\n";
pub const NO_PULLS: &str = "\n:bug: *Pullbug found no ready pull requests!*\n";
pub const NO_ISSUES: &str = "\n:bug: *Pullbug found no open issues!*\n";

const NOT_AVAILABLE: &str = "NA";

const APPROVED: &str = "✅";
const CHANGES_REQUESTED: &str = "🚫";
const DISMISSED: &str = "👀";
const PENDING: &str = "⏳";

/// Link dialects of the supported chat platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Markup {
    /// `<url|label>`, used by Slack and Rocket.Chat.
    Slack,
    /// `[label](url)`.
    Discord,
}

impl Markup {
    fn link(&self, url: &str, label: &str) -> String {
        match self {
            Markup::Slack => format!("<{url}|{label}>"),
            Markup::Discord => format!("[{label}]({url})"),
        }
    }
}

pub fn format_change_request(
    change_request: &ChangeRequest,
    disable_description: bool,
) -> FormattedMessage {
    FormattedMessage::new(
        render_change_request(change_request, disable_description, Markup::Slack),
        render_change_request(change_request, disable_description, Markup::Discord),
    )
}

pub fn format_issue(issue: &Issue, disable_description: bool) -> FormattedMessage {
    FormattedMessage::new(
        render_issue(issue, disable_description, Markup::Slack),
        render_issue(issue, disable_description, Markup::Discord),
    )
}

/// Cuts `body` to [`DESCRIPTION_LIMIT`] characters, marking the cut.
pub fn truncate_description(body: &str) -> String {
    match body.char_indices().nth(DESCRIPTION_LIMIT) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

fn render_change_request(pr: &ChangeRequest, disable_description: bool, markup: Markup) -> String {
    let repo = &pr.repository;
    let mut message = format!(
        "\n:arrow_heading_up: *Pull Request:* {}\n*Repo:* {}\n*Author:* {}\n",
        markup.link(&pr.url, &pr.title),
        markup.link(&repo.url, &repo.name),
        markup.link(&pr.author.url, &pr.author.login),
    );
    push_description(&mut message, pr.body.as_deref(), disable_description);
    message.push_str(&format!("*Reviewers:* {}\n", render_reviewers(pr, markup)));

    message
}

fn render_issue(issue: &Issue, disable_description: bool, markup: Markup) -> String {
    let repo = &issue.repository;
    let mut message = format!(
        "\n:exclamation: *Issue:* {}\n*Repo:* {}\n",
        markup.link(&issue.url, &issue.title),
        markup.link(&repo.url, &repo.name),
    );
    push_description(&mut message, issue.body.as_deref(), disable_description);

    let assignees = if issue.assignees.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        user_links(issue.assignees.iter(), markup)
    };
    message.push_str(&format!("*Assigned to:* {assignees}\n"));

    message
}

fn push_description(message: &mut String, body: Option<&str>, disable_description: bool) {
    if disable_description {
        return;
    }
    let description = truncate_description(body.unwrap_or_default());
    message.push_str(&format!("*Description:* {description}\n"));
}

fn user_links<'a>(users: impl Iterator<Item = &'a User>, markup: Markup) -> String {
    users
        .map(|user| markup.link(&user.url, &user.login))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders the reviewers line: approvals, then change requests and
/// dismissals from anyone who has not approved, then outstanding requests.
fn render_reviewers(pr: &ChangeRequest, markup: Markup) -> String {
    let reviews = &pr.reviews;

    let changes_requested: Vec<&User> = reviews
        .changes_requested
        .iter()
        .filter(|user| !reviews.has_approved(&user.login))
        .collect();
    let dismissed: Vec<&User> = reviews
        .dismissed
        .iter()
        .filter(|user| !reviews.has_approved(&user.login))
        .collect();

    let mut pending: Vec<&Reviewer> = Vec::new();
    for reviewer in &pr.requested_reviewers {
        if !pending.contains(&reviewer) {
            pending.push(reviewer);
        }
    }

    let groups = [
        (APPROVED, user_links(reviews.approved.iter(), markup)),
        (CHANGES_REQUESTED, user_links(changes_requested.into_iter(), markup)),
        (DISMISSED, user_links(dismissed.into_iter(), markup)),
        (
            PENDING,
            pending
                .iter()
                .map(|reviewer| markup.link(reviewer.url(), reviewer.name()))
                .collect::<Vec<_>>()
                .join(", "),
        ),
    ];

    let rendered: Vec<String> = groups
        .into_iter()
        .filter(|(_, links)| !links.is_empty())
        .map(|(marker, links)| format!("{marker} {links}"))
        .collect();

    if rendered.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        rendered.join(" ")
    }
}
