//! Fitting messages into chat platform size limits and sending them.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::{error::Result, types::Platform};

/// Discord rejects messages over this many characters.
pub const DISCORD_MAX_CHARS: usize = 2000;
/// Entries per Discord message; six formatted entries stay under the cap.
pub const DISCORD_MAX_ITEMS: usize = 6;
/// Cap for Slack and Rocket.Chat messages.
pub const SLACK_MAX_CHARS: usize = 40_000;

/// Something that can post a text message to a chat platform.
#[async_trait]
pub trait Notifier {
    fn platform(&self) -> Platform;

    async fn send(&self, text: &str) -> Result<()>;
}

/// Sends `messages` in chunks of `max_items_per_batch`, one call per chunk.
///
/// Each chunk is concatenated and capped at `max_chars` characters. The
/// first failure is returned; chunks already sent stay sent.
pub async fn send_batched<N>(
    notifier: &N,
    messages: &[String],
    max_chars: usize,
    max_items_per_batch: usize,
) -> Result<()>
where
    N: Notifier + Sync + ?Sized,
{
    let batch_size = max_items_per_batch.max(1);

    for (index, batch) in messages.chunks(batch_size).enumerate() {
        let text = truncate_chars(&batch.concat(), max_chars);
        debug!(
            platform = %notifier.platform(),
            batch = index + 1,
            items = batch.len(),
            chars = text.chars().count(),
            "Sending batch"
        );
        notifier.send(&text).await?;
    }

    info!("{} message sent!", notifier.platform());
    Ok(())
}

/// Concatenates every message, keeps the first `max_chars` characters and
/// sends them in one call.
pub async fn send_truncated<N>(notifier: &N, messages: &[String], max_chars: usize) -> Result<()>
where
    N: Notifier + Sync + ?Sized,
{
    let text = truncate_chars(&messages.concat(), max_chars);
    debug!(
        platform = %notifier.platform(),
        chars = text.chars().count(),
        "Sending message"
    );
    notifier.send(&text).await?;

    info!("{} message sent!", notifier.platform());
    Ok(())
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::PullbugError;

    /// Records every text it is asked to send, failing on call `fail_on`.
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        fail_on: Option<usize>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_on: None,
            }
        }

        fn failing_on(call: usize) -> Self {
            Self {
                fail_on: Some(call),
                ..Self::new()
            }
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn platform(&self) -> Platform {
            Platform::Discord
        }

        async fn send(&self, text: &str) -> Result<()> {
            let mut sent = self.sent.lock().unwrap();
            if self.fail_on == Some(sent.len()) {
                return Err(PullbugError::Transport {
                    message: "connection reset".to_string(),
                });
            }
            sent.push(text.to_string());
            Ok(())
        }
    }

    fn numbered(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("[{i}]")).collect()
    }

    #[tokio::test]
    async fn test_batches_of_six() {
        let notifier = RecordingNotifier::new();

        send_batched(&notifier, &numbered(13), DISCORD_MAX_CHARS, 6)
            .await
            .unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0], "[0][1][2][3][4][5]");
        assert_eq!(sent[1], "[6][7][8][9][10][11]");
        assert_eq!(sent[2], "[12]");
    }

    #[tokio::test]
    async fn test_batches_are_capped() {
        let notifier = RecordingNotifier::new();
        let messages = vec!["x".repeat(1500), "y".repeat(1500)];

        send_batched(&notifier, &messages, DISCORD_MAX_CHARS, DISCORD_MAX_ITEMS)
            .await
            .unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chars().count(), DISCORD_MAX_CHARS);
        assert!(sent[0].starts_with(&"x".repeat(1500)));
    }

    #[tokio::test]
    async fn test_failed_batch_keeps_earlier_ones() {
        let notifier = RecordingNotifier::failing_on(1);

        let err = send_batched(&notifier, &numbered(13), DISCORD_MAX_CHARS, 6)
            .await
            .unwrap_err();

        assert!(matches!(err, PullbugError::Transport { .. }));
        assert_eq!(notifier.sent(), vec!["[0][1][2][3][4][5]".to_string()]);
    }

    #[tokio::test]
    async fn test_truncated_keeps_the_start() {
        let notifier = RecordingNotifier::new();
        let messages = vec!["a".repeat(20_000), "b".repeat(20_000), "c".repeat(5_000)];

        send_truncated(&notifier, &messages, SLACK_MAX_CHARS)
            .await
            .unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chars().count(), SLACK_MAX_CHARS);
        assert!(sent[0].starts_with(&"a".repeat(20_000)));
        assert!(sent[0].ends_with(&"b".repeat(20_000)));
    }

    #[tokio::test]
    async fn test_truncated_short_message_untouched() {
        let notifier = RecordingNotifier::new();

        send_truncated(&notifier, &numbered(3), SLACK_MAX_CHARS)
            .await
            .unwrap();

        assert_eq!(notifier.sent(), vec!["[0][1][2]".to_string()]);
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
