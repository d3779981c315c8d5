//! notifly - multi-channel notification dispatch
//!
//! Sends structured notifications to recipients through pluggable delivery
//! channels (mail, Telegram bot, persisted record, in-session flash). The
//! dispatcher computes the eligible channel set per (notification, recipient)
//! pair, accumulates per-channel delivery errors on the notification and
//! applies an error-handling strategy deciding whether a failure is ignored,
//! recorded or escalated.
//!
//! ```no_run
//! use notifly::{AdHocRecipient, Config, NotifierBuilder};
//! # use std::sync::Arc;
//! # async fn example(transport: Arc<dyn notifly::MailTransport>,
//! #                  notification: &dyn notifly::Notification) -> anyhow::Result<()> {
//! let config = Config::load("notifly.toml")?;
//! let notifier = NotifierBuilder::new(config)
//!     .mail_transport(transport)
//!     .build()?;
//!
//! let recipient = AdHocRecipient::new().email("user@example.org");
//! notifier.send_one(&recipient, notification, None).await?;
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod message;
pub mod notification;
pub mod recipient;
pub mod render;

pub use channel::{
    Channel, ChannelKind, DatabaseChannel, FieldError, FlashChannel, FlashSink, MailChannel,
    MailTransport, NotificationRecord, NotificationStore, OutgoingEmail, SendOutcome, SendStatus,
    TelegramChannel,
};
pub use config::{Config, MailConfig, RuntimeMode, TelegramConfig};
pub use dispatcher::{AfterSendEvent, ChannelRegistry, ErrorStrategy, Notifier, NotifierBuilder};
pub use error::{NotifyError, RenderError, TransportError};
pub use message::{
    DatabaseMessage, FlashMessage, Level, MailMessage, Message, ParseMode, TelegramMessage,
};
pub use notification::{ErrorBag, Notification};
pub use recipient::{AdHocRecipient, Destination, Recipient};
pub use render::{NoopRenderer, ViewRenderer};
