//! In-session flash delivery channel.
//!
//! Fire-and-forget: hands the message to the injected [`FlashSink`] and
//! always succeeds from the dispatcher's perspective.

use crate::channel::{Channel, ChannelKind, SendOutcome};
use crate::error::NotifyError;
use crate::notification::Notification;
use crate::recipient::Recipient;
use crate::render::{render_or_empty, ViewRenderer};
use async_trait::async_trait;
use std::sync::Arc;

/// Narrow contract for the session flash backend.
pub trait FlashSink: Send + Sync {
    fn add(&self, category: &str, message: &str);
}

pub struct FlashChannel {
    sink: Arc<dyn FlashSink>,
    renderer: Arc<dyn ViewRenderer>,
}

impl FlashChannel {
    pub fn new(sink: Arc<dyn FlashSink>, renderer: Arc<dyn ViewRenderer>) -> Self {
        Self { sink, renderer }
    }
}

#[async_trait]
impl Channel for FlashChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Flash
    }

    // The flash destination is the current session, so the recipient's
    // route is never consulted.
    async fn send(
        &self,
        _recipient: &dyn Recipient,
        notification: &dyn Notification,
        _sender_account: Option<&str>,
    ) -> Result<SendOutcome, NotifyError> {
        let message = notification
            .export_for(ChannelKind::Flash)?
            .into_flash()
            .ok_or_else(|| NotifyError::UnsupportedChannel {
                notification: notification.kind().to_string(),
                channel: ChannelKind::Flash,
            })?;

        let body = match &message.message {
            Some(body) => body.clone(),
            None => message
                .view
                .as_deref()
                .map(|view| render_or_empty(self.renderer.as_ref(), view, &message.view_data))
                .unwrap_or_default(),
        };

        self.sink.add(message.category_or_default(), &body);
        Ok(SendOutcome::success())
    }
}
