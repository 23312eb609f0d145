//! Thin Telegram Bot API client.
//!
//! Hand-rolled over the shared reqwest client; only the handful of
//! methods the bot actually uses. Long polling via `getUpdates`, no
//! webhook mode.

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Long-poll timeout, kept under the shared client's request timeout.
const POLL_TIMEOUT_SECS: u64 = 25;

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Serialize)]
pub struct InlineKeyboard {
    inline_keyboard: Vec<Vec<InlineButton>>,
}

#[derive(Debug, Serialize)]
struct InlineButton {
    text: String,
    callback_data: String,
}

impl InlineKeyboard {
    /// One row of callback buttons: (label, callback data) pairs.
    pub fn row(buttons: &[(&str, &str)]) -> Self {
        Self {
            inline_keyboard: vec![
                buttons
                    .iter()
                    .map(|(text, data)| InlineButton {
                        text: text.to_string(),
                        callback_data: data.to_string(),
                    })
                    .collect(),
            ],
        }
    }
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 2],
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboard>,
}

#[derive(Debug, Serialize)]
struct EditMessageTextRequest<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboard>,
}

#[derive(Debug, Serialize)]
struct SendLocationRequest {
    chat_id: i64,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Serialize)]
struct AnswerCallbackQueryRequest<'a> {
    callback_query_id: &'a str,
}

#[derive(Debug, Serialize)]
struct DeleteMessageRequest {
    chat_id: i64,
    message_id: i64,
}

#[derive(Debug, Serialize)]
pub struct BotCommand {
    pub command: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
struct SetMyCommandsRequest {
    commands: Vec<BotCommand>,
    language_code: &'static str,
}

/// Envelope every Bot API method responds with.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramClient {
    client: Client,
    token: String,
}

impl TelegramClient {
    pub fn new(token: &str, client: Client) -> Self {
        Self {
            client,
            token: token.to_string(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{TELEGRAM_API_URL}/bot{}/{method}", self.token)
    }

    async fn call<T, B>(&self, method: &str, body: &B) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
        B: Serialize,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .with_context(|| format!("Telegram {method} request failed"))?;

        let api: ApiResponse<T> = response
            .json()
            .await
            .with_context(|| format!("Failed to decode Telegram {method} response"))?;

        if !api.ok {
            return Err(anyhow!(
                "Telegram {method} error: {}",
                api.description.unwrap_or_else(|| "unknown".to_string())
            ));
        }
        api.result
            .ok_or_else(|| anyhow!("Telegram {method} returned no result"))
    }

    /// Long-poll for incoming updates starting at `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            &GetUpdatesRequest {
                offset,
                timeout: POLL_TIMEOUT_SECS,
                allowed_updates: ["message", "callback_query"],
            },
        )
        .await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markdown: bool,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<Message> {
        self.call(
            "sendMessage",
            &SendMessageRequest {
                chat_id,
                text,
                parse_mode: markdown.then_some("Markdown"),
                reply_markup: keyboard,
            },
        )
        .await
    }

    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<()> {
        self.call::<Value, _>(
            "editMessageText",
            &EditMessageTextRequest {
                chat_id,
                message_id,
                text,
                reply_markup: keyboard,
            },
        )
        .await
        .map(|_| ())
    }

    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()> {
        self.call::<Value, _>("deleteMessage", &DeleteMessageRequest { chat_id, message_id })
            .await
            .map(|_| ())
    }

    pub async fn send_location(&self, chat_id: i64, latitude: f64, longitude: f64) -> Result<()> {
        self.call::<Value, _>(
            "sendLocation",
            &SendLocationRequest {
                chat_id,
                latitude,
                longitude,
            },
        )
        .await
        .map(|_| ())
    }

    /// Upload a raster image as a photo message.
    pub async fn send_photo(&self, chat_id: i64, image: Vec<u8>) -> Result<()> {
        let part = Part::bytes(image)
            .file_name("map.png")
            .mime_str("image/png")
            .context("Invalid photo MIME type")?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("photo", part);

        let response = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await
            .context("Telegram sendPhoto request failed")?;

        let api: ApiResponse<Value> = response
            .json()
            .await
            .context("Failed to decode Telegram sendPhoto response")?;
        if !api.ok {
            return Err(anyhow!(
                "Telegram sendPhoto error: {}",
                api.description.unwrap_or_else(|| "unknown".to_string())
            ));
        }
        Ok(())
    }

    /// Stop the "loading" spinner on a pressed inline button.
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        self.call::<Value, _>(
            "answerCallbackQuery",
            &AnswerCallbackQueryRequest { callback_query_id },
        )
        .await
        .map(|_| ())
    }

    pub async fn set_my_commands(&self, commands: Vec<BotCommand>) -> Result<()> {
        self.call::<Value, _>(
            "setMyCommands",
            &SetMyCommandsRequest {
                commands,
                language_code: "ru",
            },
        )
        .await
        .map(|_| ())
    }
}
