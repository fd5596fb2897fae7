//! In-process stand-in for the Telegram Bot API, used by unit and HTTP tests.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::config::NotifierConfig;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// First path segment, i.e. `bot<token>`.
    pub path: String,
    pub body: Value,
}

type Calls = Arc<Mutex<Vec<RecordedCall>>>;

#[derive(Clone)]
struct MockState {
    calls: Calls,
    reply: StatusCode,
    delay: Duration,
}

/// Records every `sendMessage` call and answers with a fixed status.
pub struct MockTelegram {
    base_url: String,
    calls: Calls,
}

impl MockTelegram {
    pub const TOKEN: &'static str = "123456:TEST-TOKEN";
    pub const CHAT_ID: &'static str = "-1000000000001";
    pub const FAILURE_DESCRIPTION: &'static str = "Bad Request: chat not found";

    /// Bind to an ephemeral port and serve until the test runtime shuts down.
    pub async fn start(reply: StatusCode) -> Self {
        Self::start_with_delay(reply, Duration::ZERO).await
    }

    /// Like `start`, but every call is recorded and then held for `delay`
    /// before the reply is sent.
    pub async fn start_with_delay(reply: StatusCode, delay: Duration) -> Self {
        let calls = Calls::default();
        let app = Router::new()
            .route("/{bot}/sendMessage", post(send_message))
            .with_state(MockState {
                calls: calls.clone(),
                reply,
                delay,
            });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            calls,
        }
    }

    pub fn notifier_config(&self) -> NotifierConfig {
        NotifierConfig {
            bot_token: Some(Self::TOKEN.to_owned()),
            chat_id: Some(Self::CHAT_ID.to_owned()),
            api_url: self.base_url.clone(),
            timeout: Duration::from_secs(2),
        }
    }

    /// Credentials set, but nothing listens on the target port.
    pub fn unreachable_config() -> NotifierConfig {
        NotifierConfig {
            bot_token: Some(Self::TOKEN.to_owned()),
            chat_id: Some(Self::CHAT_ID.to_owned()),
            api_url: "http://127.0.0.1:9".to_owned(),
            timeout: Duration::from_secs(2),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Poll until `n` calls were recorded or `timeout` elapses.
    pub async fn wait_for_calls(&self, n: usize, timeout: Duration) -> Vec<RecordedCall> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let calls = self.calls();
            if calls.len() >= n || tokio::time::Instant::now() >= deadline {
                return calls;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

async fn send_message(
    State(MockState {
        calls,
        reply,
        delay,
    }): State<MockState>,
    Path(bot): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    calls.lock().unwrap().push(RecordedCall { path: bot, body });
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let envelope = if reply.is_success() {
        json!({ "ok": true, "result": { "message_id": 1, "chat": { "id": -1 } } })
    } else {
        json!({
            "ok": false,
            "error_code": reply.as_u16(),
            "description": MockTelegram::FAILURE_DESCRIPTION,
        })
    };
    (reply, Json(envelope))
}
