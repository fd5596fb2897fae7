use serde::{Deserialize, Serialize};

use super::NotifyError;

// ---------------------------------------------------------------------------
// Generic response envelope
//
// Every Telegram Bot API method answers with the same outer object:
//
// Success:
//   { "ok": true, "result": <T> }
//
// Failure:
//   { "ok": false, "error_code": 400, "description": "Bad Request: chat not found" }
//
// `result` is absent on failure; `error_code` and `description` are absent on
// success.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TelegramResponse<T> {
    pub ok: bool,

    /// Present on success.
    pub result: Option<T>,

    /// Present on failure.
    pub error_code: Option<i32>,

    /// Human-readable error message, present on failure.
    pub description: Option<String>,
}

impl<T> TelegramResponse<T> {
    /// Map API-level failures to `NotifyError::Api`.
    pub fn into_result(self) -> Result<T, NotifyError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(NotifyError::Api {
                code: -1,
                description: "ok=true but result field is missing".to_owned(),
            }),
            (false, _) => Err(NotifyError::Api {
                code: self.error_code.unwrap_or(-1),
                description: self.description.unwrap_or_else(|| "(no description)".to_owned()),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// sendMessage: POST /bot{token}/sendMessage
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
}

/// Full response type: `TelegramResponse<SentMessage>`.
pub type SendMessageResponse = TelegramResponse<SentMessage>;

/// The subset of the returned `Message` object that gets logged.
#[derive(Debug, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}
