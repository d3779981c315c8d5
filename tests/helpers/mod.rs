//! Shared fakes for the integration tests: a multi-channel notification,
//! recipients with unusual routing, and recording channel collaborators.
#![allow(dead_code)]

use async_trait::async_trait;
use notifly::{
    ChannelKind, Destination, ErrorBag, ErrorStrategy, FieldError, FlashMessage, FlashSink,
    MailMessage, MailTransport, Message, Notification, NotificationRecord, NotificationStore,
    NotifyError, OutgoingEmail, Recipient, TelegramMessage, TransportError,
};
use std::sync::Mutex;

/// A notification exporting messages for every built-in channel.
pub struct WelcomeNotification {
    pub strategy: ErrorStrategy,
    pub errors: ErrorBag,
}

impl WelcomeNotification {
    pub fn new(strategy: ErrorStrategy) -> Self {
        Self {
            strategy,
            errors: ErrorBag::new(),
        }
    }
}

impl Notification for WelcomeNotification {
    fn kind(&self) -> &'static str {
        "WelcomeNotification"
    }

    fn broadcast_on(&self) -> Vec<ChannelKind> {
        vec![
            ChannelKind::Mail,
            ChannelKind::Telegram,
            ChannelKind::Database,
            ChannelKind::Flash,
        ]
    }

    fn export_for(&self, channel: ChannelKind) -> Result<Message, NotifyError> {
        match channel {
            ChannelKind::Mail => Ok(MailMessage::new()
                .subject("Welcome aboard")
                .body("<p>Welcome!</p>")
                .into()),
            ChannelKind::Telegram => Ok(TelegramMessage::new()
                .subject("Welcome aboard")
                .body("Welcome!")
                .into()),
            ChannelKind::Database => Ok(notifly::DatabaseMessage::new()
                .subject("Welcome aboard")
                .body("Welcome!")
                .into()),
            ChannelKind::Flash => Ok(FlashMessage::new().message("Welcome!").into()),
        }
    }

    fn strategy(&self) -> ErrorStrategy {
        self.strategy
    }

    fn errors(&self) -> &ErrorBag {
        &self.errors
    }
}

/// Reachable on a channel while resolving no destination for it, to exercise
/// the missing-destination path.
pub struct UnroutedRecipient {
    pub channel: ChannelKind,
}

impl Recipient for UnroutedRecipient {
    fn describe(&self) -> String {
        format!("unrouted {} recipient", self.channel)
    }

    fn via_channels(&self) -> Vec<ChannelKind> {
        vec![self.channel]
    }

    fn route_for(&self, _channel: ChannelKind) -> Option<Destination> {
        None
    }
}

/// Mail transport that records composed emails and optionally fails.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub fail_with: Option<TransportError>,
}

impl RecordingTransport {
    pub fn failing(err: TransportError) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(err),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(email.clone());
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Notification store that records inserted rows and optionally rejects them.
#[derive(Default)]
pub struct RecordingStore {
    pub inserted: Mutex<Vec<NotificationRecord>>,
    pub reject_with: Vec<FieldError>,
}

impl RecordingStore {
    pub fn inserted(&self) -> Vec<NotificationRecord> {
        self.inserted.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationStore for RecordingStore {
    async fn insert(&self, record: &NotificationRecord) -> Result<(), Vec<FieldError>> {
        if self.reject_with.is_empty() {
            self.inserted.lock().unwrap().push(record.clone());
            Ok(())
        } else {
            Err(self.reject_with.clone())
        }
    }
}

/// Flash sink that records (category, message) pairs.
#[derive(Default)]
pub struct RecordingSink {
    pub flashes: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    pub fn flashes(&self) -> Vec<(String, String)> {
        self.flashes.lock().unwrap().clone()
    }
}

impl FlashSink for RecordingSink {
    fn add(&self, category: &str, message: &str) {
        self.flashes
            .lock()
            .unwrap()
            .push((category.to_string(), message.to_string()));
    }
}
