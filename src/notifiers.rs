//! HTTP clients for the chat platforms.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::{
    config::Config,
    dispatch::Notifier,
    error::{PullbugError, Result},
    types::Platform,
};

pub const SLACK_API_URL: &str = "https://slack.com/api";

/// Posts through a Slack bot with `chat.postMessage`.
pub struct SlackNotifier {
    client: Client,
    api_url: String,
    token: String,
    channel: String,
}

impl SlackNotifier {
    pub fn new(token: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: SLACK_API_URL.to_string(),
            token: token.into(),
            channel: channel.into(),
        }
    }

    /// Points the client at another Slack API root.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
impl Notifier for SlackNotifier {
    fn platform(&self) -> Platform {
        Platform::Slack
    }

    async fn send(&self, text: &str) -> Result<()> {
        let url = format!("{}/chat.postMessage", self.api_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&json!({ "channel": self.channel, "text": text }))
            .send()
            .await
            .map_err(|e| transport_error(Platform::Slack, &e))?;

        let status = response.status();
        let body: SlackResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                return Err(rejected(
                    Platform::Slack,
                    format!("unreadable response with status {status}: {e}"),
                ));
            }
        };

        if !body.ok {
            return Err(rejected(
                Platform::Slack,
                body.error.unwrap_or_else(|| format!("status {status}")),
            ));
        }

        Ok(())
    }
}

/// Posts to an incoming webhook whose JSON body carries the text under
/// `field`.
pub struct WebhookNotifier {
    client: Client,
    platform: Platform,
    url: String,
    field: &'static str,
}

impl WebhookNotifier {
    pub fn discord(url: impl Into<String>) -> Self {
        Self::new(Platform::Discord, url, "content")
    }

    pub fn rocketchat(url: impl Into<String>) -> Self {
        Self::new(Platform::RocketChat, url, "text")
    }

    fn new(platform: Platform, url: impl Into<String>, field: &'static str) -> Self {
        Self {
            client: Client::new(),
            platform,
            url: url.into(),
            field,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn send(&self, text: &str) -> Result<()> {
        let mut payload = serde_json::Map::new();
        payload.insert(self.field.to_string(), text.into());

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error(self.platform, &e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(rejected(self.platform, format!("status {status}: {detail}")));
        }

        Ok(())
    }
}

fn transport_error(platform: Platform, e: &reqwest::Error) -> PullbugError {
    error!("Could not send {platform} message: {e}");
    PullbugError::Transport {
        message: format!("{platform}: {e}"),
    }
}

fn rejected(platform: Platform, message: String) -> PullbugError {
    error!("Could not send {platform} message: {message}");
    PullbugError::PlatformApi { platform, message }
}

/// The notifiers enabled for a run.
#[derive(Default)]
pub struct Notifiers {
    pub discord: Option<Box<dyn Notifier + Send + Sync>>,
    pub slack: Option<Box<dyn Notifier + Send + Sync>>,
    pub rocketchat: Option<Box<dyn Notifier + Send + Sync>>,
}

impl Notifiers {
    /// Builds a notifier for every platform the configuration enables.
    pub fn from_config(config: &Config) -> Self {
        Self {
            discord: config.discord.then(|| {
                Box::new(WebhookNotifier::discord(&config.discord_url))
                    as Box<dyn Notifier + Send + Sync>
            }),
            slack: config.slack.then(|| {
                Box::new(SlackNotifier::new(&config.slack_token, &config.slack_channel))
                    as Box<dyn Notifier + Send + Sync>
            }),
            rocketchat: config.rocketchat.then(|| {
                Box::new(WebhookNotifier::rocketchat(&config.rocketchat_url))
                    as Box<dyn Notifier + Send + Sync>
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.discord.is_none() && self.slack.is_none() && self.rocketchat.is_none()
    }
}
