//! Pullbug: reminds teams about GitHub pull requests and issues that still
//! need attention.
//!
//! Repositories of a user or organisation are polled through the [`Forge`]
//! trait, their pull requests and issues are filtered and formatted, and the
//! resulting messages are posted to Slack, Discord and Rocket.Chat within
//! each platform's size limits.

pub mod aggregate;
pub mod bug;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod forge;
pub mod format;
pub mod github;
pub mod logging;
pub mod notifiers;
pub mod types;

pub use bug::{Outcome, Pullbug, RunSummary, Stage};
pub use cli::parse_args;
pub use config::{Config, LogLevel};
pub use dispatch::Notifier;
pub use error::{PullbugError, Result};
pub use forge::Forge;
pub use github::GitHub;
pub use notifiers::{Notifiers, SlackNotifier, WebhookNotifier};
pub use types::{
    ChangeRequest, FormattedMessage, GithubContext, GithubState, Issue, Platform, Repository,
    ReviewDecisions, Reviewer, Team, User,
};
