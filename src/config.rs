//! Run configuration.
//!
//! A [`Config`] is built once (normally by [`crate::cli::parse_args`]) and
//! passed by reference to every stage. [`Config::validate`] is the only place
//! that decides whether a run may touch the network.

use std::path::PathBuf;

use clap::ValueEnum;
use tracing::error;

use crate::{
    error::{PullbugError, Result},
    types::{GithubContext, GithubState},
};

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_LOCATION: &str = "~/pullbug";

/// Log levels accepted on the command line.
///
/// `critical` has no tracing equivalent and maps onto `error`, as does the
/// handling of configuration failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Notset,
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Notset => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub github_owner: String,
    pub github_token: Option<String>,
    pub github_state: GithubState,
    pub github_context: GithubContext,
    pub pulls: bool,
    pub issues: bool,
    pub discord: bool,
    pub discord_url: String,
    pub slack: bool,
    pub slack_token: String,
    pub slack_channel: String,
    pub rocketchat: bool,
    pub rocketchat_url: String,
    /// Lower-cased repository names; empty means every repository.
    pub repos: Vec<String>,
    pub drafts: bool,
    pub wip_titles: bool,
    pub location: PathBuf,
    pub base_url: String,
    pub log_level: LogLevel,
    pub disable_descriptions: bool,
    pub quiet: bool,
}

impl Config {
    /// A configuration for `owner` with every toggle off.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            github_owner: owner.into(),
            github_token: None,
            github_state: GithubState::default(),
            github_context: GithubContext::default(),
            pulls: false,
            issues: false,
            discord: false,
            discord_url: String::new(),
            slack: false,
            slack_token: String::new(),
            slack_channel: String::new(),
            rocketchat: false,
            rocketchat_url: String::new(),
            repos: Vec::new(),
            drafts: false,
            wip_titles: false,
            location: expand_home(DEFAULT_LOCATION),
            base_url: DEFAULT_BASE_URL.to_string(),
            log_level: LogLevel::default(),
            disable_descriptions: false,
            quiet: false,
        }
    }

    /// Checks that every enabled feature has what it needs.
    ///
    /// Failures are logged at error level before being returned.
    pub fn validate(&self) -> Result<()> {
        self.check().inspect_err(|err| error!("{err}"))
    }

    fn check(&self) -> Result<()> {
        if !self.pulls && !self.issues {
            return Err(PullbugError::missing("pulls/issues"));
        }
        if self.github_owner.trim().is_empty() {
            return Err(PullbugError::missing("github_owner"));
        }
        if self.discord {
            require_url("discord_url", &self.discord_url)?;
        }
        if self.slack && self.slack_token.is_empty() {
            return Err(PullbugError::missing("slack_token"));
        }
        if self.slack && self.slack_channel.is_empty() {
            return Err(PullbugError::missing("slack_channel"));
        }
        if self.rocketchat {
            require_url("rocketchat_url", &self.rocketchat_url)?;
        }
        require_url("base_url", &self.base_url)?;

        Ok(())
    }
}

fn require_url(flag: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(PullbugError::missing(flag));
    }
    url::Url::parse(value).map_err(|e| PullbugError::Configuration {
        message: format!("Invalid {flag} '{value}': {e}"),
    })?;
    Ok(())
}

/// Splits a comma-separated allow-list into trimmed, lower-cased names.
pub fn parse_repo_list(repos: &str) -> Vec<String> {
    repos
        .split(',')
        .map(|repo| repo.trim().to_lowercase())
        .filter(|repo| !repo.is_empty())
        .collect()
}

/// Expands a leading `~` using `HOME`.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix('~'), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => {
            let mut expanded = PathBuf::from(home);
            let rest = rest.trim_start_matches(['/', '\\']);
            if !rest.is_empty() {
                expanded.push(rest);
            }
            expanded
        }
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulls_config() -> Config {
        let mut config = Config::new("acme");
        config.pulls = true;
        config
    }

    #[test]
    fn test_requires_pulls_or_issues() {
        let err = Config::new("acme").validate().unwrap_err();
        assert_eq!(err, PullbugError::missing("pulls/issues"));
    }

    #[test]
    fn test_requires_owner() {
        let mut config = pulls_config();
        config.github_owner = " ".to_string();
        assert_eq!(
            config.validate().unwrap_err(),
            PullbugError::missing("github_owner")
        );
    }

    #[test]
    fn test_discord_needs_url() {
        let mut config = pulls_config();
        config.discord = true;
        assert_eq!(
            config.validate().unwrap_err(),
            PullbugError::missing("discord_url")
        );

        config.discord_url = "not a url".to_string();
        assert!(config.validate().unwrap_err().is_configuration());

        config.discord_url = "https://discord.com/api/webhooks/1/abc".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_slack_needs_token_and_channel() {
        let mut config = pulls_config();
        config.slack = true;
        assert_eq!(
            config.validate().unwrap_err(),
            PullbugError::missing("slack_token")
        );

        config.slack_token = "xoxb-123".to_string();
        assert_eq!(
            config.validate().unwrap_err(),
            PullbugError::missing("slack_channel")
        );

        config.slack_channel = "#reviews".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rocketchat_needs_url() {
        let mut config = pulls_config();
        config.issues = true;
        config.rocketchat = true;
        assert_eq!(
            config.validate().unwrap_err(),
            PullbugError::missing("rocketchat_url")
        );
    }

    #[test]
    fn test_disabled_platforms_need_nothing() {
        let config = pulls_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_repo_list() {
        assert_eq!(
            parse_repo_list(" Widgets, gadgets ,,"),
            vec!["widgets".to_string(), "gadgets".to_string()]
        );
        assert!(parse_repo_list("").is_empty());
    }

    #[test]
    fn test_log_level_directives() {
        assert_eq!(LogLevel::Critical.as_directive(), "error");
        assert_eq!(LogLevel::Warning.as_directive(), "warn");
        assert_eq!(LogLevel::Notset.as_directive(), "trace");
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/var/log"), PathBuf::from("/var/log"));
    }
}
