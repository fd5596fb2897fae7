pub mod models;

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::config::NotifierConfig;

use self::models::{SendMessageRequest, SendMessageResponse, TelegramResponse};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notifier is not configured: TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID is unset")]
    NotConfigured,

    #[error("Telegram request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Telegram returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Telegram API error: code={code}, description={description}")]
    Api { code: i32, description: String },

    #[error("failed to decode Telegram response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Best-effort delivery of alert text to a Telegram chat.
///
/// Cheap to clone; all clones share one HTTP client. A failed message is
/// logged and dropped: there is no retry and no queue.
#[derive(Debug, Clone)]
pub struct Notifier {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: Client,
    config: NotifierConfig,
}

impl Notifier {
    pub fn new(config: NotifierConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build notifier HTTP client")?;

        if config.credentials().is_none() {
            warn!("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID is unset; alerts will not be delivered");
        }

        Ok(Self {
            inner: Arc::new(Inner { http, config }),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.config.credentials().is_some()
    }

    /// Send `text` and wait for the outcome.
    ///
    /// Every failure is logged here, so callers may drop the error.
    pub async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        let result = self.send(text).await;
        match &result {
            Ok(()) => {}
            Err(NotifyError::NotConfigured) => {
                warn!("Notification skipped: Telegram credentials are not configured");
            }
            Err(e) => error!(error = %e, "Failed to send Telegram notification"),
        }
        result
    }

    /// Send `text` on a detached task.
    ///
    /// The returned handle may be dropped; the task keeps running and its
    /// outcome is only logged.
    pub fn dispatch(&self, text: String) -> JoinHandle<Result<(), NotifyError>> {
        let notifier = self.clone();
        tokio::spawn(async move { notifier.notify(&text).await })
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let (token, chat_id) = self
            .inner
            .config
            .credentials()
            .ok_or(NotifyError::NotConfigured)?;

        // The token is part of the path, so the URL itself is never logged.
        let url = format!("{}/bot{}/sendMessage", self.inner.config.api_url, token);
        debug!(chat_id = %chat_id, chars = text.chars().count(), "Sending Telegram notification");

        let response = self
            .inner
            .http
            .post(&url)
            .json(&SendMessageRequest { chat_id, text })
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url()))?;

        if !status.is_success() {
            // Telegram reports most failures as 4xx with a JSON envelope.
            if let Ok(envelope) = serde_json::from_slice::<TelegramResponse<serde_json::Value>>(&bytes) {
                if !envelope.ok {
                    return envelope.into_result().map(|_| ());
                }
            }
            return Err(NotifyError::Status {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let sent = serde_json::from_slice::<SendMessageResponse>(&bytes)?.into_result()?;
        debug!(message_id = sent.message_id, "Telegram notification delivered");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::MockTelegram;

    fn unconfigured() -> NotifierConfig {
        NotifierConfig {
            bot_token: None,
            chat_id: None,
            api_url: "http://127.0.0.1:9".to_owned(),
            timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn notify_posts_chat_id_and_text() {
        let mock = MockTelegram::start(StatusCode::OK).await;
        let notifier = Notifier::new(mock.notifier_config()).unwrap();

        notifier.notify("Fridge A is warm").await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, format!("bot{}", MockTelegram::TOKEN));
        assert_eq!(calls[0].body["chat_id"], MockTelegram::CHAT_ID);
        assert_eq!(calls[0].body["text"], "Fridge A is warm");
    }

    #[tokio::test]
    async fn api_failure_is_reported_with_description() {
        let mock = MockTelegram::start(StatusCode::BAD_REQUEST).await;
        let notifier = Notifier::new(mock.notifier_config()).unwrap();

        let err = notifier.notify("hello").await.unwrap_err();
        match err {
            NotifyError::Api { code, description } => {
                assert_eq!(code, 400);
                assert_eq!(description, MockTelegram::FAILURE_DESCRIPTION);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(mock.calls().len(), 1, "failed sends are not retried");
    }

    #[tokio::test]
    async fn transport_failure_is_reported() {
        let mut config = MockTelegram::unreachable_config();
        config.timeout = Duration::from_secs(2);
        let notifier = Notifier::new(config).unwrap();

        let err = notifier.notify("hello").await.unwrap_err();
        assert!(matches!(err, NotifyError::Transport(_)), "got {err:?}");
        assert!(
            !err.to_string().contains(MockTelegram::TOKEN),
            "bot token must never appear in error text"
        );
    }

    #[tokio::test]
    async fn stalled_endpoint_is_cut_off_by_the_timeout() {
        let mock = MockTelegram::start_with_delay(StatusCode::OK, Duration::from_secs(30)).await;
        let mut config = mock.notifier_config();
        config.timeout = Duration::from_secs(1);
        let notifier = Notifier::new(config).unwrap();

        let started = std::time::Instant::now();
        let err = notifier.notify("hello").await.unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(err, NotifyError::Transport(_)), "got {err:?}");
        assert!(elapsed >= Duration::from_millis(900), "returned after {elapsed:?}");
        assert!(elapsed < Duration::from_secs(5), "returned after {elapsed:?}");
        assert_eq!(mock.calls().len(), 1, "timed-out sends are not retried");
    }

    #[tokio::test]
    async fn unconfigured_notifier_is_a_noop() {
        let notifier = Notifier::new(unconfigured()).unwrap();
        assert!(!notifier.is_enabled());

        let err = notifier.notify("hello").await.unwrap_err();
        assert!(matches!(err, NotifyError::NotConfigured));
    }

    #[tokio::test]
    async fn dispatch_runs_on_a_detached_task() {
        let mock = MockTelegram::start(StatusCode::OK).await;
        let notifier = Notifier::new(mock.notifier_config()).unwrap();

        let handle = notifier.dispatch("detached".to_owned());
        handle.await.unwrap().unwrap();

        assert_eq!(mock.calls()[0].body["text"], "detached");
    }
}
