//! Error types for the notification dispatch pipeline.
//!
//! `NotifyError` covers configuration and programming defects plus the
//! strategy-driven hard delivery abort. Transport-level faults never appear
//! here: channels catch them, record them on the notification's error bag
//! and report a failed [`SendOutcome`](crate::channel::SendOutcome) instead.

use crate::channel::ChannelKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    /// The notification declares no message export for the requested channel.
    #[error("notification `{notification}` has no message export for channel `{channel}`")]
    UnsupportedChannel {
        notification: String,
        channel: ChannelKind,
    },

    /// A recipient/notification pair requires a channel the registry does not know.
    #[error("notification channel `{channel}` is not available or configuration is missing")]
    ChannelNotConfigured { channel: ChannelKind },

    /// A channel or dispatcher setting is missing or inconsistent.
    #[error("invalid notifier configuration: {0}")]
    InvalidConfig(String),

    /// Hard abort raised by the `Fail`/`Throw` strategies in production mode.
    #[error("delivery via `{channel}` failed: {response}")]
    Delivery {
        channel: ChannelKind,
        response: String,
    },
}

/// Failure reported by a mail transport backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The remote backend could not be reached at all.
    #[error("network error: {0}")]
    Network(String),

    /// The backend was reached but refused the message.
    #[error("rejected by transport: {0}")]
    Rejected(String),
}

/// Failure reported by a view renderer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("view `{0}` not found")]
    ViewNotFound(String),

    #[error("render failed: {0}")]
    Render(String),
}
