//! Telegram bot delivery channel.
//!
//! Posts to `POST {api_url}/bot{token}/sendMessage`. Transport errors are
//! synthesized into an `{ok: false, description}` response so everything
//! downstream handles a single failure shape.
//!
//! See <https://core.telegram.org/bots#deep-linking-example> for an example
//! flow of sending notifications in Telegram.

use crate::channel::{Channel, ChannelKind, SendOutcome};
use crate::config::{RuntimeMode, TelegramConfig};
use crate::error::NotifyError;
use crate::message::ParseMode;
use crate::notification::Notification;
use crate::recipient::{Destination, Recipient};
use crate::render::{render_or_empty, ViewRenderer};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::error;

/// Response shape of the Bot API `sendMessage` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub struct TelegramChannel {
    config: TelegramConfig,
    mode: RuntimeMode,
    http: reqwest::Client,
    renderer: Arc<dyn ViewRenderer>,
}

impl TelegramChannel {
    pub fn new(
        config: TelegramConfig,
        mode: RuntimeMode,
        renderer: Arc<dyn ViewRenderer>,
    ) -> Result<Self, NotifyError> {
        if config.bot_token.is_empty() {
            return Err(NotifyError::InvalidConfig(
                "bot token is undefined".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NotifyError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            config,
            mode,
            http,
            renderer,
        })
    }

    /// Selects the bot token for the current mode and sender account.
    fn bot_token(&self, sender_account: Option<&str>) -> Result<String, NotifyError> {
        let devel = self.mode == RuntimeMode::Development;
        match sender_account {
            Some(account) => {
                let entry = self.config.sender_accounts.get(account).ok_or_else(|| {
                    NotifyError::InvalidConfig(format!(
                        "please define the `{account}` telegram account"
                    ))
                })?;
                let token = if devel {
                    entry.devel_bot_token.as_ref()
                } else {
                    entry.bot_token.as_ref()
                };
                token.cloned().ok_or_else(|| {
                    let field = if devel { "devel_bot_token" } else { "bot_token" };
                    NotifyError::InvalidConfig(format!(
                        "please define a {field} for the `{account}` telegram account"
                    ))
                })
            }
            None if devel => self.config.devel_bot_token.clone().ok_or_else(|| {
                NotifyError::InvalidConfig("devel_bot_token is undefined".to_string())
            }),
            None => Ok(self.config.bot_token.clone()),
        }
    }

    async fn post_send_message(&self, token: &str, payload: &Value) -> ApiResponse {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_url.trim_end_matches('/'),
            token
        );
        match self.http.post(&url).json(payload).send().await {
            Ok(response) => response.json::<ApiResponse>().await.unwrap_or_else(|e| {
                ApiResponse {
                    ok: false,
                    description: Some(e.to_string()),
                }
            }),
            Err(e) => ApiResponse {
                ok: false,
                description: Some(e.to_string()),
            },
        }
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Telegram
    }

    async fn send(
        &self,
        recipient: &dyn Recipient,
        notification: &dyn Notification,
        sender_account: Option<&str>,
    ) -> Result<SendOutcome, NotifyError> {
        let message = notification
            .export_for(ChannelKind::Telegram)?
            .into_telegram()
            .ok_or_else(|| NotifyError::UnsupportedChannel {
                notification: notification.kind().to_string(),
                channel: ChannelKind::Telegram,
            })?;

        let mut chat_id = match recipient.route_for(ChannelKind::Telegram) {
            Some(Destination::ChatId(id)) => id,
            _ => {
                notification
                    .errors()
                    .add("telegram_chat_id", "No chat ID provided");
                return Ok(SendOutcome::skipped());
            }
        };

        let mut text = match (&message.parse_mode, &message.subject) {
            (ParseMode::Markdown, Some(subject)) if !subject.is_empty() => {
                format!("*{}*\n\n", clean_html(subject))
            }
            _ => String::new(),
        };
        let body = match &message.body {
            Some(body) => body.clone(),
            None => message
                .view
                .as_deref()
                .map(|view| render_or_empty(self.renderer.as_ref(), view, &message.view_data))
                .unwrap_or_default(),
        };
        text.push_str(&clean_html(&body));

        if self.mode == RuntimeMode::Development {
            text = format!("to:{}\n\n{}", recipient.describe(), text);
            chat_id = self.config.devel_chat_id.clone().ok_or_else(|| {
                NotifyError::InvalidConfig("devel_chat_id is undefined".to_string())
            })?;
        }

        let token = self.bot_token(sender_account)?;

        let mut payload = json!({
            "chat_id": chat_id,
            "text": text,
            "disable_notification": message.silent,
            "parse_mode": message.parse_mode.as_str(),
            "disable_web_page_preview": message.without_page_preview,
        });
        if let Some(id) = message.reply_to_message_id {
            payload["reply_to_message_id"] = json!(id);
        }
        if let Some(markup) = &message.reply_markup {
            payload["reply_markup"] = json!(markup.to_string());
        }

        // Test mode composes the payload but never touches the network.
        if self.mode == RuntimeMode::Test {
            return Ok(SendOutcome::success_with(payload));
        }

        let response = self.post_send_message(&token, &payload).await;
        if !response.ok {
            let via = sender_account
                .map(|a| format!(" via {a} account"))
                .unwrap_or_default();
            let err_message = format!(
                "Error sending message to Telegram chat{via}:\n{}",
                response.description.as_deref().unwrap_or_default()
            );
            notification.errors().add("request_error", &err_message);
            error!(channel = "telegram", "{err_message}");
            if self.mode == RuntimeMode::Development {
                error!("Message content:\n{text}");
            }
            return Ok(SendOutcome::failure(serde_json::to_value(&response).ok()));
        }

        Ok(SendOutcome::success_with(
            serde_json::to_value(&response).unwrap_or(Value::Null),
        ))
    }
}

/// Reduces HTML to the subset Telegram accepts.
///
/// `<br>` becomes a paragraph break, tags outside the allowed set are
/// stripped, runs of horizontal whitespace collapse to one space and common
/// entities are decoded. See <https://core.telegram.org/bots/api#html-style>.
pub fn clean_html(html: &str) -> String {
    const ALLOWED_TAGS: &[&str] = &[
        "b",
        "strong",
        "i",
        "em",
        "u",
        "ins",
        "s",
        "strike",
        "del",
        "a",
        "code",
        "pre",
        "tg-spoiler",
        "tg-emoji",
        "blockquote",
    ];

    static BR_RE: OnceLock<Regex> = OnceLock::new();
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    static WS_RE: OnceLock<Regex> = OnceLock::new();

    let html = html.trim();
    if html.is_empty() {
        return String::new();
    }

    let br = BR_RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
    let tag = TAG_RE.get_or_init(|| Regex::new(r"(?is)</?([a-zA-Z][a-zA-Z0-9-]*)[^>]*>").unwrap());
    let ws = WS_RE.get_or_init(|| Regex::new(r"[^\S\r\n]+").unwrap());

    let with_breaks = br.replace_all(html, "\n\n");
    let stripped = tag.replace_all(&with_breaks, |caps: &regex::Captures| {
        let name = caps[1].to_ascii_lowercase();
        if ALLOWED_TAGS.contains(&name.as_str()) {
            caps[0].to_string()
        } else {
            String::new()
        }
    });
    let collapsed = ws.replace_all(&stripped, " ");
    decode_entities(&collapsed)
}

/// Decodes the HTML entities that commonly survive template rendering.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
