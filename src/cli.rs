use anyhow::Result;
use clap::Parser;

use crate::{
    config::{Config, DEFAULT_BASE_URL, DEFAULT_LOCATION, LogLevel, expand_home, parse_repo_list},
    types::{GithubContext, GithubState},
};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

#[derive(Parser, Debug)]
#[command(
    name = "pullbug",
    about = "Bug your team about GitHub pull requests and issues that still need attention on Slack, Discord and Rocket.Chat"
)]
#[command(long_version = BUILD_INFO_HUMAN)]
struct CliArgs {
    /// Bug about open pull requests
    #[arg(short = 'p', long, help_heading = "What to bug about")]
    pulls: bool,

    /// Bug about open issues
    #[arg(short = 'i', long, help_heading = "What to bug about")]
    issues: bool,

    /// GitHub token (falls back to GITHUB_TOKEN, then GH_TOKEN)
    #[arg(long, alias = "github_token", value_name = "TOKEN")]
    github_token: Option<String>,

    /// User or organisation owning the repositories
    #[arg(long, alias = "github_owner", value_name = "OWNER")]
    github_owner: Option<String>,

    /// State of pull requests and issues to fetch
    #[arg(long, alias = "github_state", value_enum, default_value_t = GithubState::Open)]
    github_state: GithubState,

    /// Whether the owner is a user or an organisation
    #[arg(long, alias = "github_context", value_enum, default_value_t = GithubContext::Users)]
    github_context: GithubContext,

    /// Send the messages to Discord
    #[arg(short = 'd', long, help_heading = "Platforms")]
    discord: bool,

    /// Discord webhook URL
    #[arg(long, alias = "discord_url", value_name = "URL", help_heading = "Platforms")]
    discord_url: Option<String>,

    /// Send the messages to Slack
    #[arg(short = 's', long, help_heading = "Platforms")]
    slack: bool,

    /// Slack bot token
    #[arg(long, alias = "slack_token", value_name = "TOKEN", help_heading = "Platforms")]
    slack_token: Option<String>,

    /// Slack channel to post to
    #[arg(long, alias = "slack_channel", value_name = "CHANNEL", help_heading = "Platforms")]
    slack_channel: Option<String>,

    /// Send the messages to Rocket.Chat
    #[arg(long, help_heading = "Platforms")]
    rocketchat: bool,

    /// Rocket.Chat webhook URL
    #[arg(long, alias = "rocketchat_url", value_name = "URL", help_heading = "Platforms")]
    rocketchat_url: Option<String>,

    /// Only bug about these repositories (comma-separated)
    #[arg(short = 'r', long, value_name = "REPO,...", help_heading = "Filters")]
    repos: Option<String>,

    /// Include draft pull requests
    #[arg(long, help_heading = "Filters")]
    drafts: bool,

    /// Also treat pull requests with "WIP" in the title as drafts
    #[arg(long, alias = "wip_titles", help_heading = "Filters")]
    wip_titles: bool,

    /// Directory holding the logs folder
    #[arg(short = 'l', long, default_value = DEFAULT_LOCATION, value_name = "DIR")]
    location: String,

    /// GitHub API base URL
    #[arg(long, alias = "base_url", default_value = DEFAULT_BASE_URL, value_name = "URL")]
    base_url: String,

    /// Logging verbosity (RUST_LOG overrides it)
    #[arg(long, alias = "log_level", value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Leave descriptions out of the messages
    #[arg(long, alias = "disable_descriptions")]
    disable_descriptions: bool,

    /// Send nothing when there is nothing to bug about
    #[arg(long)]
    quiet: bool,
}

impl CliArgs {
    fn into_config(self) -> Config {
        Config {
            github_owner: self.github_owner.unwrap_or_default(),
            github_token: self.github_token,
            github_state: self.github_state,
            github_context: self.github_context,
            pulls: self.pulls,
            issues: self.issues,
            discord: self.discord,
            discord_url: self.discord_url.unwrap_or_default(),
            slack: self.slack,
            slack_token: self.slack_token.unwrap_or_default(),
            slack_channel: self.slack_channel.unwrap_or_default(),
            rocketchat: self.rocketchat,
            rocketchat_url: self.rocketchat_url.unwrap_or_default(),
            repos: self.repos.as_deref().map(parse_repo_list).unwrap_or_default(),
            drafts: self.drafts,
            wip_titles: self.wip_titles,
            location: expand_home(&self.location),
            base_url: self.base_url,
            log_level: self.log_level,
            disable_descriptions: self.disable_descriptions,
            quiet: self.quiet,
        }
    }
}

/// Parses command-line arguments into a [`Config`].
///
/// Only the argument syntax is checked here; [`Config::validate`] decides
/// whether the combination is usable.
pub fn parse_args<I, T>(args: I) -> Result<Config>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = CliArgs::try_parse_from(args)?;
    Ok(cli.into_config())
}
