//! Delivery channel contract and the built-in channel implementations.
//!
//! A channel knows how to deliver one message variant to one resolved
//! destination. Transport faults are caught inside `send` and converted
//! into a recorded error plus a failed [`SendOutcome`]; they never escape
//! as raw errors, which would abort a multi-recipient dispatch loop.

pub mod database;
pub mod flash;
pub mod mail;
pub mod telegram;

pub use database::{DatabaseChannel, FieldError, NotificationRecord, NotificationStore};
pub use flash::{FlashChannel, FlashSink};
pub use mail::{MailChannel, MailTransport, OutgoingEmail};
pub use telegram::TelegramChannel;

use crate::error::NotifyError;
use crate::notification::Notification;
use crate::recipient::Recipient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Identifier of a built-in delivery channel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Mail,
    Telegram,
    Database,
    Flash,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Mail => "mail",
            ChannelKind::Telegram => "telegram",
            ChannelKind::Database => "database",
            ChannelKind::Flash => "flash",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelKind {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mail" => Ok(ChannelKind::Mail),
            "telegram" => Ok(ChannelKind::Telegram),
            "database" => Ok(ChannelKind::Database),
            "flash" => Ok(ChannelKind::Flash),
            other => Err(NotifyError::InvalidConfig(format!(
                "unknown channel `{other}`"
            ))),
        }
    }
}

/// Result of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    Success,
    Failure,
    /// The channel never reached its backend, e.g. no destination was
    /// resolvable. A missing-destination error is still recorded first.
    Skipped,
}

/// Outcome of [`Channel::send`], carrying the raw backend response when one exists.
#[derive(Debug, Clone, PartialEq)]
pub struct SendOutcome {
    pub status: SendStatus,
    pub response: Option<Value>,
}

impl SendOutcome {
    pub fn success() -> Self {
        Self {
            status: SendStatus::Success,
            response: None,
        }
    }

    pub fn success_with(response: Value) -> Self {
        Self {
            status: SendStatus::Success,
            response: Some(response),
        }
    }

    pub fn failure(response: Option<Value>) -> Self {
        Self {
            status: SendStatus::Failure,
            response,
        }
    }

    pub fn skipped() -> Self {
        Self {
            status: SendStatus::Skipped,
            response: None,
        }
    }
}

/// One pluggable delivery mechanism.
///
/// Implementations record channel-specific failure detail on the
/// notification's error bag before signaling a failed outcome; the
/// dispatcher never fabricates error text itself. `Err` is reserved for
/// configuration and programming defects, which always abort dispatch.
#[async_trait]
pub trait Channel: Send + Sync {
    fn kind(&self) -> ChannelKind;

    async fn send(
        &self,
        recipient: &dyn Recipient,
        notification: &dyn Notification,
        sender_account: Option<&str>,
    ) -> Result<SendOutcome, NotifyError>;
}

impl fmt::Debug for dyn Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel").field("kind", &self.kind()).finish()
    }
}
