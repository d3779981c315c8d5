//! The recipient contract: who may receive a notification, on which
//! channels, and at which destination.

use crate::channel::ChannelKind;
use crate::notification::Notification;
use std::collections::BTreeMap;

/// A channel-specific delivery destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// One or more email addresses.
    Email(Vec<String>),
    /// Telegram chat id.
    ChatId(String),
    /// Composite reference for the persisted-record channel.
    Record {
        notifiable_type: String,
        notifiable_id: i64,
    },
    /// The current session; carries no address of its own.
    Session,
}

/// An addressable entity that may receive notifications.
pub trait Recipient: Send + Sync {
    /// Short description used in logs and development-mode message prefixes.
    fn describe(&self) -> String;

    /// Whether this recipient wants the given notification at all.
    ///
    /// Pure predicate, evaluated once per (notification, recipient) pair
    /// before any channel work; `false` skips the pair entirely with no
    /// errors recorded and no events emitted.
    fn should_receive(&self, _notification: &dyn Notification) -> bool {
        true
    }

    /// The channels this recipient is reachable on.
    fn via_channels(&self) -> Vec<ChannelKind>;

    /// Resolves the delivery destination for one channel.
    ///
    /// `None` means "no destination": channels must record a
    /// missing-destination error for it, never skip silently.
    fn route_for(&self, channel: ChannelKind) -> Option<Destination>;
}

/// A recipient assembled from an explicit channel-to-destination map.
///
/// Reachable on exactly the routed channels; the flash channel is routed by
/// default since it needs no address. Always willing to receive.
#[derive(Debug, Clone, Default)]
pub struct AdHocRecipient {
    routes: BTreeMap<ChannelKind, Destination>,
}

impl AdHocRecipient {
    pub fn new() -> Self {
        let mut routes = BTreeMap::new();
        routes.insert(ChannelKind::Flash, Destination::Session);
        Self { routes }
    }

    pub fn route(mut self, channel: ChannelKind, destination: Destination) -> Self {
        self.routes.insert(channel, destination);
        self
    }

    pub fn email(self, address: impl Into<String>) -> Self {
        self.route(ChannelKind::Mail, Destination::Email(vec![address.into()]))
    }

    pub fn chat_id(self, chat_id: impl Into<String>) -> Self {
        self.route(ChannelKind::Telegram, Destination::ChatId(chat_id.into()))
    }
}

impl Recipient for AdHocRecipient {
    fn describe(&self) -> String {
        "ad-hoc recipient".to_string()
    }

    fn via_channels(&self) -> Vec<ChannelKind> {
        self.routes.keys().copied().collect()
    }

    fn route_for(&self, channel: ChannelKind) -> Option<Destination> {
        self.routes.get(&channel).cloned()
    }
}
