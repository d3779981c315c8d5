//! Mail delivery channel.
//!
//! The actual transport (SMTP, API relay, ...) lives behind the
//! [`MailTransport`] trait; this channel only resolves the sender address,
//! composes the outgoing email and converts transport faults into recorded
//! notification errors.

use crate::channel::{Channel, ChannelKind, SendOutcome};
use crate::config::{MailConfig, RuntimeMode};
use crate::error::{NotifyError, TransportError};
use crate::notification::Notification;
use crate::recipient::{Destination, Recipient};
use crate::render::{render_or_empty, ViewRenderer};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// A composed email handed to the transport backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: Vec<String>,
    pub from: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Narrow contract for the mail transport backend.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), TransportError>;
}

pub struct MailChannel {
    config: MailConfig,
    mode: RuntimeMode,
    transport: Arc<dyn MailTransport>,
    renderer: Arc<dyn ViewRenderer>,
}

impl MailChannel {
    pub fn new(
        config: MailConfig,
        mode: RuntimeMode,
        transport: Arc<dyn MailTransport>,
        renderer: Arc<dyn ViewRenderer>,
    ) -> Self {
        Self {
            config,
            mode,
            transport,
            renderer,
        }
    }

    /// Resolves the sender address: explicit message `from`, then the named
    /// sender account, then the configured admin address.
    fn sender_address(
        &self,
        message_from: Option<&str>,
        sender_account: Option<&str>,
    ) -> Result<String, NotifyError> {
        if let Some(from) = message_from {
            return Ok(from.to_string());
        }
        match sender_account {
            Some(account) if account != "admin" => self
                .config
                .sender_accounts
                .get(account)
                .map(|a| a.from.clone())
                .ok_or_else(|| {
                    NotifyError::InvalidConfig(format!(
                        "no settings found for `{account}` mail sender account"
                    ))
                }),
            _ => self.config.admin_email.clone().ok_or_else(|| {
                NotifyError::InvalidConfig(
                    "neither `from` nor a sender account found in mail message".to_string(),
                )
            }),
        }
    }
}

#[async_trait]
impl Channel for MailChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Mail
    }

    async fn send(
        &self,
        recipient: &dyn Recipient,
        notification: &dyn Notification,
        sender_account: Option<&str>,
    ) -> Result<SendOutcome, NotifyError> {
        let message = notification
            .export_for(ChannelKind::Mail)?
            .into_mail()
            .ok_or_else(|| NotifyError::UnsupportedChannel {
                notification: notification.kind().to_string(),
                channel: ChannelKind::Mail,
            })?;

        let mut to = match recipient.route_for(ChannelKind::Mail) {
            Some(Destination::Email(addresses)) if !addresses.is_empty() => addresses,
            _ => {
                notification
                    .errors()
                    .add("mail", "No email address provided");
                return Ok(SendOutcome::skipped());
            }
        };

        let mut from = self.sender_address(message.from.as_deref(), sender_account)?;

        let mut subject = message.subject.clone().unwrap_or_default();
        if let Some(prefix) = &self.config.subject_prefix {
            subject = format!("{prefix}{subject}");
        }

        let body = match &message.body {
            Some(body) => body.clone(),
            None => message
                .view
                .as_deref()
                .map(|view| render_or_empty(self.renderer.as_ref(), view, &message.view_data))
                .unwrap_or_default(),
        };

        if self.mode == RuntimeMode::Development {
            let devel = self.config.devel_email.clone().ok_or_else(|| {
                NotifyError::InvalidConfig(
                    "devel_email must be configured to send mail in development mode".to_string(),
                )
            })?;
            subject = format!("[dev:to:{}]{}", to[0], subject);
            from = devel.clone();
            to = vec![devel];
        }

        let email = OutgoingEmail {
            to: to.clone(),
            from,
            subject,
            html_body: body.clone(),
            text_body: body,
        };

        match self.transport.send(&email).await {
            Ok(()) => Ok(SendOutcome::success()),
            Err(err) => {
                let error_message = if to.len() > 1 {
                    format!(
                        "Unable to send email to {} and {} other recipients",
                        to[0],
                        to.len() - 1
                    )
                } else {
                    format!("Unable to send email to {}", to[0])
                };
                let key = match err {
                    TransportError::Network(_) => "sendmail_network_error",
                    TransportError::Rejected(_) => "sendmail",
                };
                notification.errors().add(key, &error_message);
                if self.mode == RuntimeMode::Development {
                    notification.errors().add("transport", err.to_string());
                }
                Ok(SendOutcome::failure(Some(
                    json!({ "error": err.to_string() }),
                )))
            }
        }
    }
}
