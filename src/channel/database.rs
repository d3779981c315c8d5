//! Persisted-record delivery channel.
//!
//! Writes one row per notification through the injected
//! [`NotificationStore`]; the store's field-level validation errors are
//! recorded on the notification rather than propagated.

use crate::channel::{Channel, ChannelKind, SendOutcome};
use crate::error::NotifyError;
use crate::message::Level;
use crate::notification::Notification;
use crate::recipient::{Destination, Recipient};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// The row handed to the persistence backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationRecord {
    pub level: Level,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub notifiable_type: String,
    pub notifiable_id: i64,
    /// Arbitrary structured payload, JSON-serialized.
    pub data: String,
    pub sender_account: Option<String>,
}

/// A field-level validation error reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Narrow contract for the persistence backend.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, record: &NotificationRecord) -> Result<(), Vec<FieldError>>;
}

pub struct DatabaseChannel {
    store: Arc<dyn NotificationStore>,
}

impl DatabaseChannel {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Channel for DatabaseChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Database
    }

    async fn send(
        &self,
        recipient: &dyn Recipient,
        notification: &dyn Notification,
        sender_account: Option<&str>,
    ) -> Result<SendOutcome, NotifyError> {
        let message = notification
            .export_for(ChannelKind::Database)?
            .into_database()
            .ok_or_else(|| NotifyError::UnsupportedChannel {
                notification: notification.kind().to_string(),
                channel: ChannelKind::Database,
            })?;

        let (notifiable_type, notifiable_id) = match recipient.route_for(ChannelKind::Database) {
            Some(Destination::Record {
                notifiable_type,
                notifiable_id,
            }) => (notifiable_type, notifiable_id),
            _ => {
                notification
                    .errors()
                    .add("database", "No notifiable entity provided");
                return Ok(SendOutcome::skipped());
            }
        };

        let record = NotificationRecord {
            level: message.level,
            subject: message.subject.clone(),
            body: message.body.clone(),
            notifiable_type,
            notifiable_id,
            data: message.data.to_string(),
            sender_account: sender_account.map(str::to_string),
        };

        match self.store.insert(&record).await {
            Ok(()) => Ok(SendOutcome::success()),
            Err(field_errors) => {
                for field_error in &field_errors {
                    notification.errors().add("database", &field_error.message);
                }
                Ok(SendOutcome::failure(Some(json!({
                    "errors": field_errors,
                }))))
            }
        }
    }
}
