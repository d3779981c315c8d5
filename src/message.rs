//! Channel-specific message value objects.
//!
//! Each delivery channel consumes its own message variant, produced on
//! demand by [`Notification::export_for`](crate::notification::Notification::export_for).
//! Messages are plain values: built once, cloned freely, never shared
//! mutably between channels.

use crate::channel::ChannelKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Severity of a notification message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[default]
    Info,
    Success,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Error => "error",
        }
    }
}

/// Telegram message formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParseMode {
    #[default]
    Markdown,
    Html,
}

impl ParseMode {
    /// Wire value expected by the Bot API.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Markdown => "Markdown",
            ParseMode::Html => "HTML",
        }
    }
}

/// Message delivered through the mail channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MailMessage {
    pub level: Level,
    pub subject: Option<String>,
    pub body: Option<String>,
    /// Explicit sender address; falls back to the configured sender account.
    pub from: Option<String>,
    /// View identifier used to render the body when `body` is unset.
    pub view: Option<String>,
    pub view_data: Map<String, Value>,
}

impl MailMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn view(mut self, view: impl Into<String>, data: Map<String, Value>) -> Self {
        self.view = Some(view.into());
        self.view_data = data;
        self
    }
}

/// Message delivered through the Telegram channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelegramMessage {
    pub level: Level,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub view: Option<String>,
    pub view_data: Map<String, Value>,
    pub parse_mode: ParseMode,
    /// Deliver without a notification sound.
    pub silent: bool,
    pub without_page_preview: bool,
    /// If the message is a reply, id of the original message.
    pub reply_to_message_id: Option<i64>,
    /// Inline/reply keyboard structure, JSON-encoded onto the wire as-is.
    pub reply_markup: Option<Value>,
}

impl TelegramMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn view(mut self, view: impl Into<String>, data: Map<String, Value>) -> Self {
        self.view = Some(view.into());
        self.view_data = data;
        self
    }

    pub fn parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = mode;
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn without_page_preview(mut self, without: bool) -> Self {
        self.without_page_preview = without;
        self
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }

    pub fn reply_markup(mut self, markup: Value) -> Self {
        self.reply_markup = Some(markup);
        self
    }
}

/// Message persisted through the database channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatabaseMessage {
    pub level: Level,
    pub subject: Option<String>,
    pub body: Option<String>,
    /// Arbitrary structured payload, serialized into the stored record.
    pub data: Value,
}

impl DatabaseMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// Message shown through the in-session flash channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlashMessage {
    pub level: Level,
    /// Flash category; defaults to the level's string form.
    pub category: Option<String>,
    pub message: Option<String>,
    pub view: Option<String>,
    pub view_data: Map<String, Value>,
}

impl FlashMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn view(mut self, view: impl Into<String>, data: Map<String, Value>) -> Self {
        self.view = Some(view.into());
        self.view_data = data;
        self
    }

    /// The category to flash under, falling back to the message level.
    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or(self.level.as_str())
    }
}

/// A channel-specific message, one variant per built-in channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Mail(MailMessage),
    Telegram(TelegramMessage),
    Database(DatabaseMessage),
    Flash(FlashMessage),
}

impl Message {
    /// The channel this message targets.
    pub fn kind(&self) -> ChannelKind {
        match self {
            Message::Mail(_) => ChannelKind::Mail,
            Message::Telegram(_) => ChannelKind::Telegram,
            Message::Database(_) => ChannelKind::Database,
            Message::Flash(_) => ChannelKind::Flash,
        }
    }

    pub fn into_mail(self) -> Option<MailMessage> {
        match self {
            Message::Mail(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_telegram(self) -> Option<TelegramMessage> {
        match self {
            Message::Telegram(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_database(self) -> Option<DatabaseMessage> {
        match self {
            Message::Database(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_flash(self) -> Option<FlashMessage> {
        match self {
            Message::Flash(m) => Some(m),
            _ => None,
        }
    }
}

impl From<MailMessage> for Message {
    fn from(m: MailMessage) -> Self {
        Message::Mail(m)
    }
}

impl From<TelegramMessage> for Message {
    fn from(m: TelegramMessage) -> Self {
        Message::Telegram(m)
    }
}

impl From<DatabaseMessage> for Message {
    fn from(m: DatabaseMessage) -> Self {
        Message::Database(m)
    }
}

impl From<FlashMessage> for Message {
    fn from(m: FlashMessage) -> Self {
        Message::Flash(m)
    }
}
