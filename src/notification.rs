//! The notification contract and its per-channel error accumulation.

use crate::channel::ChannelKind;
use crate::dispatcher::ErrorStrategy;
use crate::error::NotifyError;
use crate::message::Message;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// A logical event to be delivered, producing a channel-specific message on demand.
///
/// The supported channel set is declared statically by the implementation;
/// `broadcast_on` must be stable and side-effect free. The error bag is owned
/// by the notification instance and is only mutated by channel invocations
/// during dispatch; the caller may inspect it after `send` returns.
pub trait Notification: Send + Sync {
    /// Human-readable notification type name, used in logs and events.
    fn kind(&self) -> &'static str;

    /// The channels this notification type supports.
    fn broadcast_on(&self) -> Vec<ChannelKind>;

    /// Produces the channel-specific message.
    ///
    /// Fails with [`NotifyError::UnsupportedChannel`] when the notification
    /// has no export for the requested channel. Repeated calls for the same
    /// channel yield independent messages with equal field values.
    fn export_for(&self, channel: ChannelKind) -> Result<Message, NotifyError>;

    /// Policy applied when a channel delivery fails.
    fn strategy(&self) -> ErrorStrategy {
        ErrorStrategy::StoreErrors
    }

    /// The notification-owned error sink.
    fn errors(&self) -> &ErrorBag;
}

/// Per-channel delivery errors accumulated on a notification.
///
/// Keys are usually channel ids but may be finer-grained
/// (`telegram_chat_id`, `sendmail_network_error`); a repeated key overwrites
/// the previous message rather than appending. The map is interior-mutable
/// so channels can record errors through a shared reference.
#[derive(Debug, Default)]
pub struct ErrorBag {
    inner: Mutex<BTreeMap<String, String>>,
}

impl ErrorBag {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned lock only means a panicking test thread; the map itself
        // stays usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Records an error, overwriting any previous message for the same key.
    pub fn add(&self, key: impl Into<String>, message: impl Into<String>) {
        self.lock().insert(key.into(), message.into());
    }

    /// The most recent error for one key.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// A snapshot of all recorded errors, keyed deterministically.
    pub fn all(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    pub fn has(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn has_any(&self) -> bool {
        !self.lock().is_empty()
    }

    /// Removes the error for one key, if any.
    pub fn clear(&self, key: &str) {
        self.lock().remove(key);
    }

    /// Empties the whole error map.
    pub fn clear_all(&self) {
        self.lock().clear();
    }

    /// All errors joined into a single human-readable block.
    pub fn summary(&self) -> String {
        self.lock()
            .iter()
            .map(|(key, message)| format!("{key}: {message}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
