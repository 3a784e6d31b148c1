use std::fmt;

use tracing::{debug, error, info};

use crate::{
    aggregate::{
        DraftPolicy, aggregate_issues, attach_review_decisions, fetch_change_requests,
        fetch_repositories, filter_drafts,
    },
    config::Config,
    dispatch::{
        DISCORD_MAX_CHARS, DISCORD_MAX_ITEMS, SLACK_MAX_CHARS, send_batched, send_truncated,
    },
    error::Result,
    forge::Forge,
    format::{
        ISSUES_PREAMBLE, NO_ISSUES, NO_PULLS, PULLS_PREAMBLE, format_change_request, format_issue,
    },
    notifiers::Notifiers,
    types::FormattedMessage,
};

/// Steps of a run, in order. `Failed` can follow any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    ValidatingConfig,
    FetchingRepos,
    FetchingRequests,
    FetchingIssues,
    Filtering,
    Formatting,
    Dispatching,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::ValidatingConfig => "validating config",
            Stage::FetchingRepos => "fetching repos",
            Stage::FetchingRequests => "fetching pull requests",
            Stage::FetchingIssues => "fetching issues",
            Stage::Filtering => "filtering",
            Stage::Formatting => "formatting",
            Stage::Dispatching => "dispatching",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What happened to one category (pull requests or issues) in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// How many pull requests or issues survived filtering.
    pub found: usize,
    /// The messages built for the category, preamble or canned notice
    /// included.
    pub messages: Vec<FormattedMessage>,
    pub dispatched: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pulls: Option<Outcome>,
    pub issues: Option<Outcome>,
}

/// Fixed texts of one category.
struct Category {
    preamble: &'static str,
    nothing_found: &'static str,
}

const PULLS: Category = Category {
    preamble: PULLS_PREAMBLE,
    nothing_found: NO_PULLS,
};

const ISSUES: Category = Category {
    preamble: ISSUES_PREAMBLE,
    nothing_found: NO_ISSUES,
};

/// One pullbug invocation: validate, fetch, filter, format, dispatch.
pub struct Pullbug<'a, F: ?Sized> {
    config: Config,
    forge: &'a F,
    notifiers: Notifiers,
}

impl<'a, F> Pullbug<'a, F>
where
    F: Forge + Sync + ?Sized,
{
    /// Uses the notifiers `config` enables.
    pub fn new(config: Config, forge: &'a F) -> Self {
        let notifiers = Notifiers::from_config(&config);
        Self::with_notifiers(config, forge, notifiers)
    }

    pub fn with_notifiers(config: Config, forge: &'a F, notifiers: Notifiers) -> Self {
        Self {
            config,
            forge,
            notifiers,
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        info!("Running Pullbug...");
        let mut stage = Stage::Idle;

        let result = self.run_stages(&mut stage).await;
        if let Err(err) = &result {
            error!("Pullbug failed while {stage}: {err}");
            enter(&mut stage, Stage::Failed);
        }

        result
    }

    async fn run_stages(&self, stage: &mut Stage) -> Result<RunSummary> {
        enter(stage, Stage::ValidatingConfig);
        self.config.validate()?;

        enter(stage, Stage::FetchingRepos);
        let repos = fetch_repositories(
            self.forge,
            &self.config.github_owner,
            self.config.github_context,
            &self.config.repos,
        )
        .await?;

        let mut summary = RunSummary::default();

        if self.config.pulls {
            enter(stage, Stage::FetchingRequests);
            let pulls = fetch_change_requests(self.forge, &repos, self.config.github_state).await?;

            enter(stage, Stage::Filtering);
            let policy =
                DraftPolicy::new(self.config.drafts).with_wip_titles(self.config.wip_titles);
            let pulls = attach_review_decisions(self.forge, filter_drafts(pulls, policy)).await?;
            let outcome = self.bug_about(stage, &PULLS, &pulls, format_change_request).await?;
            summary.pulls = Some(outcome);
        }

        if self.config.issues {
            enter(stage, Stage::FetchingIssues);
            let issues = aggregate_issues(self.forge, &repos, self.config.github_state).await?;

            enter(stage, Stage::Filtering);
            summary.issues = Some(self.bug_about(stage, &ISSUES, &issues, format_issue).await?);
        }

        enter(stage, Stage::Done);
        for outcome in [&summary.pulls, &summary.issues].into_iter().flatten() {
            let texts: Vec<&str> = outcome.messages.iter().map(|m| m.slack.as_str()).collect();
            info!("{texts:?}");
        }
        info!("Pullbug finished bugging!");

        Ok(summary)
    }

    /// Renders and sends `items` under the category's preamble, or the
    /// canned notice when there are none and the run is not quiet.
    async fn bug_about<T>(
        &self,
        stage: &mut Stage,
        category: &Category,
        items: &[T],
        render: fn(&T, bool) -> FormattedMessage,
    ) -> Result<Outcome> {
        let found = items.len();

        if found == 0 {
            info!("{}", category.nothing_found);
            if self.config.quiet {
                debug!("Quiet run, not sending the nothing found notice");
                return Ok(Outcome {
                    found,
                    messages: vec![FormattedMessage::plain(category.nothing_found)],
                    dispatched: false,
                });
            }
        }

        enter(stage, Stage::Formatting);
        let messages = if found == 0 {
            vec![FormattedMessage::plain(category.nothing_found)]
        } else {
            std::iter::once(FormattedMessage::plain(category.preamble))
                .chain(items.iter().map(|item| render(item, self.config.disable_descriptions)))
                .collect()
        };

        enter(stage, Stage::Dispatching);
        self.send_messages(&messages).await?;

        Ok(Outcome {
            found,
            messages,
            dispatched: !self.notifiers.is_empty(),
        })
    }

    /// Sends to every enabled platform: Discord in batches, the others as
    /// one truncated message.
    async fn send_messages(&self, messages: &[FormattedMessage]) -> Result<()> {
        let slack_texts: Vec<String> = messages.iter().map(|m| m.slack.clone()).collect();

        if let Some(discord) = &self.notifiers.discord {
            let discord_texts: Vec<String> = messages.iter().map(|m| m.discord.clone()).collect();
            send_batched(
                discord.as_ref(),
                &discord_texts,
                DISCORD_MAX_CHARS,
                DISCORD_MAX_ITEMS,
            )
            .await?;
        }
        if let Some(slack) = &self.notifiers.slack {
            send_truncated(slack.as_ref(), &slack_texts, SLACK_MAX_CHARS).await?;
        }
        if let Some(rocketchat) = &self.notifiers.rocketchat {
            send_truncated(rocketchat.as_ref(), &slack_texts, SLACK_MAX_CHARS).await?;
        }

        Ok(())
    }
}

fn enter(stage: &mut Stage, next: Stage) {
    debug!(from = %stage, to = %next, "Stage transition");
    *stage = next;
}
