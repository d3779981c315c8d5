//! The dispatch engine.
//!
//! `Notifier::send` walks notifications × recipients, computes the eligible
//! channel set for each pair, invokes the channels in deterministic order,
//! applies the notification's error-handling strategy to every failure and
//! emits exactly one `AfterSend` event per attempted channel.

use crate::channel::{Channel, ChannelKind, SendOutcome, SendStatus};
use crate::config::{Config, RuntimeMode};
use crate::error::NotifyError;
use crate::notification::Notification;
use crate::recipient::Recipient;
use crate::render::{NoopRenderer, ViewRenderer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument};

/// Policy governing what a channel delivery failure does to the dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorStrategy {
    /// Abort the whole dispatch with a hard delivery error (production only;
    /// other modes degrade to report-only).
    Fail,
    /// Same escalation behavior as `Fail`.
    Throw,
    /// Clear the notification's errors and continue (production only; other
    /// modes keep the errors visible).
    Ignore,
    /// Leave the errors recorded on the notification and continue; the
    /// caller inspects them after dispatch returns.
    #[default]
    StoreErrors,
}

/// Event emitted after every attempted channel send, success or not.
#[derive(Debug, Clone)]
pub struct AfterSendEvent {
    /// ISO 8601 timestamp of the attempt.
    pub timestamp: String,
    /// Notification type name.
    pub notification: String,
    /// Recipient description.
    pub recipient: String,
    pub channel: ChannelKind,
    pub status: SendStatus,
    /// Raw channel response, when the backend produced one.
    pub response: Option<Value>,
}

type ChannelFactory = Box<dyn Fn() -> Result<Arc<dyn Channel>, NotifyError> + Send + Sync>;

enum Slot {
    Factory(ChannelFactory),
    Ready(Arc<dyn Channel>),
}

/// Registry of configured channels, keyed by [`ChannelKind`].
///
/// Channels registered lazily are constructed on first use and memoized for
/// the registry's lifetime; memoization is race-safe.
#[derive(Default)]
pub struct ChannelRegistry {
    slots: Mutex<BTreeMap<ChannelKind, Slot>>,
    kinds: BTreeSet<ChannelKind>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a ready-made channel instance.
    pub fn register(&mut self, kind: ChannelKind, channel: Arc<dyn Channel>) {
        self.kinds.insert(kind);
        self.slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(kind, Slot::Ready(channel));
    }

    /// Registers a factory invoked on first use of the channel.
    pub fn register_lazy<F>(&mut self, kind: ChannelKind, factory: F)
    where
        F: Fn() -> Result<Arc<dyn Channel>, NotifyError> + Send + Sync + 'static,
    {
        self.kinds.insert(kind);
        self.slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(kind, Slot::Factory(Box::new(factory)));
    }

    /// The set of configured channel kinds.
    pub fn configured(&self) -> &BTreeSet<ChannelKind> {
        &self.kinds
    }

    pub fn is_configured(&self, kind: ChannelKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Returns the channel instance for `kind`, building and caching it on
    /// first use.
    pub fn resolve(&self, kind: ChannelKind) -> Result<Arc<dyn Channel>, NotifyError> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let channel = match slots.get(&kind) {
            None => return Err(NotifyError::ChannelNotConfigured { channel: kind }),
            Some(Slot::Ready(channel)) => return Ok(channel.clone()),
            Some(Slot::Factory(factory)) => factory()?,
        };
        slots.insert(kind, Slot::Ready(channel.clone()));
        Ok(channel)
    }
}

/// Sends notifications to recipients through the configured channels.
pub struct Notifier {
    registry: ChannelRegistry,
    mode: RuntimeMode,
    after_send: Option<broadcast::Sender<AfterSendEvent>>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Notifier {
    pub fn new(registry: ChannelRegistry, mode: RuntimeMode) -> Self {
        Self {
            registry,
            mode,
            after_send: None,
        }
    }

    pub fn runtime_mode(&self) -> RuntimeMode {
        self.mode
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Subscribes to the per-attempt `AfterSend` event stream.
    ///
    /// Within one (notification, recipient) pair the events arrive in
    /// channel-attempt order.
    pub fn after_send_events(&mut self) -> broadcast::Receiver<AfterSendEvent> {
        match &self.after_send {
            Some(tx) => tx.subscribe(),
            None => {
                let (tx, rx) = broadcast::channel(256);
                self.after_send = Some(tx);
                rx
            }
        }
    }

    /// Sends the given notifications to the given recipients.
    ///
    /// Per pair, the eligible channel set is the intersection of the
    /// configured channels, the recipient's reachable channels and the
    /// notification's supported channels, iterated in `broadcast_on` order.
    /// Channel failures are dealt with per the notification's
    /// [`ErrorStrategy`]; a hard abort stops all remaining pairs.
    #[instrument(skip_all, fields(recipients = recipients.len(), notifications = notifications.len()))]
    pub async fn send(
        &self,
        recipients: &[&dyn Recipient],
        notifications: &[&dyn Notification],
        sender_account: Option<&str>,
    ) -> Result<(), NotifyError> {
        for notification in notifications {
            for recipient in recipients {
                if !recipient.should_receive(*notification) {
                    debug!(
                        notification = notification.kind(),
                        recipient = %recipient.describe(),
                        "recipient opted out, skipping pair"
                    );
                    continue;
                }
                self.send_pair(*recipient, *notification, sender_account)
                    .await?;
            }
        }
        Ok(())
    }

    /// Convenience wrapper for a single recipient and notification.
    pub async fn send_one(
        &self,
        recipient: &dyn Recipient,
        notification: &dyn Notification,
        sender_account: Option<&str>,
    ) -> Result<(), NotifyError> {
        self.send(&[recipient], &[notification], sender_account)
            .await
    }

    async fn send_pair(
        &self,
        recipient: &dyn Recipient,
        notification: &dyn Notification,
        sender_account: Option<&str>,
    ) -> Result<(), NotifyError> {
        let reachable: BTreeSet<ChannelKind> = recipient.via_channels().into_iter().collect();
        let mut seen = BTreeSet::new();
        let eligible: Vec<ChannelKind> = notification
            .broadcast_on()
            .into_iter()
            .filter(|kind| {
                reachable.contains(kind) && self.registry.is_configured(*kind) && seen.insert(*kind)
            })
            .collect();

        for kind in eligible {
            let channel = self.registry.resolve(kind)?;
            info!(
                notification = notification.kind(),
                recipient = %recipient.describe(),
                channel = %kind,
                "sending notification"
            );
            let outcome = channel.send(recipient, notification, sender_account).await?;

            // A channel may report success yet still have recorded a soft
            // error; both signals are checked.
            let failed = outcome.status != SendStatus::Success || notification.errors().has_any();
            let mut abort = None;
            if failed {
                let response = outcome
                    .response
                    .as_ref()
                    .map(Value::to_string)
                    .unwrap_or_else(|| notification.errors().summary());
                error!(
                    notification = notification.kind(),
                    recipient = %recipient.describe(),
                    channel = %kind,
                    "error sending notification:\n{response}"
                );
                match notification.strategy() {
                    ErrorStrategy::Fail | ErrorStrategy::Throw => {
                        if self.mode == RuntimeMode::Production {
                            abort = Some(NotifyError::Delivery {
                                channel: kind,
                                response,
                            });
                        }
                    }
                    ErrorStrategy::Ignore => {
                        if self.mode == RuntimeMode::Production {
                            notification.errors().clear_all();
                        }
                    }
                    ErrorStrategy::StoreErrors => {}
                }
            }

            // Exactly one event per attempted channel, emitted even when the
            // attempt escalates to a hard abort.
            self.emit(recipient, notification, kind, &outcome);
            if let Some(err) = abort {
                return Err(err);
            }
        }
        Ok(())
    }

    fn emit(
        &self,
        recipient: &dyn Recipient,
        notification: &dyn Notification,
        channel: ChannelKind,
        outcome: &SendOutcome,
    ) {
        if let Some(tx) = &self.after_send {
            // Nothing to do when all subscribers are gone.
            let _ = tx.send(AfterSendEvent {
                timestamp: chrono::Utc::now().to_rfc3339(),
                notification: notification.kind().to_string(),
                recipient: recipient.describe(),
                channel,
                status: outcome.status,
                response: outcome.response.clone(),
            });
        }
    }
}

/// Assembles a [`Notifier`] from configuration plus the injected channel
/// collaborators.
///
/// Each configured channel section needs its collaborator: mail needs a
/// [`MailTransport`](crate::channel::MailTransport), database a
/// [`NotificationStore`](crate::channel::NotificationStore), flash a
/// [`FlashSink`](crate::channel::FlashSink). The renderer defaults to
/// [`NoopRenderer`].
pub struct NotifierBuilder {
    config: Config,
    mail_transport: Option<Arc<dyn crate::channel::MailTransport>>,
    store: Option<Arc<dyn crate::channel::NotificationStore>>,
    flash_sink: Option<Arc<dyn crate::channel::FlashSink>>,
    renderer: Arc<dyn ViewRenderer>,
}

impl NotifierBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            mail_transport: None,
            store: None,
            flash_sink: None,
            renderer: Arc::new(NoopRenderer),
        }
    }

    pub fn mail_transport(mut self, transport: Arc<dyn crate::channel::MailTransport>) -> Self {
        self.mail_transport = Some(transport);
        self
    }

    pub fn notification_store(mut self, store: Arc<dyn crate::channel::NotificationStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn flash_sink(mut self, sink: Arc<dyn crate::channel::FlashSink>) -> Self {
        self.flash_sink = Some(sink);
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn ViewRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn build(self) -> Result<Notifier, NotifyError> {
        let mode = self.config.runtime_mode;
        let mut registry = ChannelRegistry::new();

        if let Some(mail_config) = self.config.mail {
            let transport = self.mail_transport.ok_or_else(|| {
                NotifyError::InvalidConfig(
                    "mail channel configured but no mail transport provided".to_string(),
                )
            })?;
            let renderer = self.renderer.clone();
            registry.register_lazy(ChannelKind::Mail, move || {
                Ok(Arc::new(crate::channel::MailChannel::new(
                    mail_config.clone(),
                    mode,
                    transport.clone(),
                    renderer.clone(),
                )) as Arc<dyn Channel>)
            });
        }

        if let Some(telegram_config) = self.config.telegram {
            let renderer = self.renderer.clone();
            registry.register_lazy(ChannelKind::Telegram, move || {
                Ok(Arc::new(crate::channel::TelegramChannel::new(
                    telegram_config.clone(),
                    mode,
                    renderer.clone(),
                )?) as Arc<dyn Channel>)
            });
        }

        if self.config.database.is_some() {
            let store = self.store.ok_or_else(|| {
                NotifyError::InvalidConfig(
                    "database channel configured but no notification store provided".to_string(),
                )
            })?;
            registry.register_lazy(ChannelKind::Database, move || {
                Ok(Arc::new(crate::channel::DatabaseChannel::new(store.clone()))
                    as Arc<dyn Channel>)
            });
        }

        if self.config.flash.is_some() {
            let sink = self.flash_sink.ok_or_else(|| {
                NotifyError::InvalidConfig(
                    "flash channel configured but no flash sink provided".to_string(),
                )
            })?;
            let renderer = self.renderer.clone();
            registry.register_lazy(ChannelKind::Flash, move || {
                Ok(
                    Arc::new(crate::channel::FlashChannel::new(
                        sink.clone(),
                        renderer.clone(),
                    )) as Arc<dyn Channel>,
                )
            });
        }

        Ok(Notifier::new(registry, mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{FlashMessage, Message};
    use crate::notification::ErrorBag;
    use crate::recipient::Destination;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Notification fake with a scripted channel set and strategy.
    struct TestNotification {
        channels: Vec<ChannelKind>,
        strategy: ErrorStrategy,
        errors: ErrorBag,
    }

    impl TestNotification {
        fn new(channels: Vec<ChannelKind>, strategy: ErrorStrategy) -> Self {
            Self {
                channels,
                strategy,
                errors: ErrorBag::new(),
            }
        }
    }

    impl Notification for TestNotification {
        fn kind(&self) -> &'static str {
            "TestNotification"
        }

        fn broadcast_on(&self) -> Vec<ChannelKind> {
            self.channels.clone()
        }

        fn export_for(&self, channel: ChannelKind) -> Result<Message, NotifyError> {
            if self.channels.contains(&channel) {
                Ok(FlashMessage::new().message("test").into())
            } else {
                Err(NotifyError::UnsupportedChannel {
                    notification: self.kind().to_string(),
                    channel,
                })
            }
        }

        fn strategy(&self) -> ErrorStrategy {
            self.strategy
        }

        fn errors(&self) -> &ErrorBag {
            &self.errors
        }
    }

    /// Recipient fake reachable on a scripted channel set.
    struct TestRecipient {
        channels: Vec<ChannelKind>,
        receives: bool,
    }

    impl TestRecipient {
        fn reachable_on(channels: Vec<ChannelKind>) -> Self {
            Self {
                channels,
                receives: true,
            }
        }

        fn opted_out() -> Self {
            Self {
                channels: vec![ChannelKind::Mail],
                receives: false,
            }
        }
    }

    impl Recipient for TestRecipient {
        fn describe(&self) -> String {
            "test recipient".to_string()
        }

        fn should_receive(&self, _notification: &dyn Notification) -> bool {
            self.receives
        }

        fn via_channels(&self) -> Vec<ChannelKind> {
            self.channels.clone()
        }

        fn route_for(&self, _channel: ChannelKind) -> Option<Destination> {
            Some(Destination::Session)
        }
    }

    /// Channel fake that records invocations and plays a scripted outcome.
    struct ScriptedChannel {
        kind: ChannelKind,
        calls: Arc<AtomicUsize>,
        fail_with: Option<(String, String)>,
    }

    impl ScriptedChannel {
        fn succeeding(kind: ChannelKind) -> (Arc<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Arc::new(Self {
                    kind,
                    calls: calls.clone(),
                    fail_with: None,
                }),
                calls,
            )
        }

        fn failing(kind: ChannelKind, key: &str, message: &str) -> (Arc<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Arc::new(Self {
                    kind,
                    calls: calls.clone(),
                    fail_with: Some((key.to_string(), message.to_string())),
                }),
                calls,
            )
        }
    }

    #[async_trait]
    impl Channel for ScriptedChannel {
        fn kind(&self) -> ChannelKind {
            self.kind
        }

        async fn send(
            &self,
            _recipient: &dyn Recipient,
            notification: &dyn Notification,
            _sender_account: Option<&str>,
        ) -> Result<SendOutcome, NotifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.fail_with {
                None => Ok(SendOutcome::success()),
                Some((key, message)) => {
                    notification.errors().add(key, message);
                    Ok(SendOutcome::failure(Some(serde_json::json!({
                        "error": message,
                    }))))
                }
            }
        }
    }

    fn notifier_with(
        channels: Vec<Arc<ScriptedChannel>>,
        mode: RuntimeMode,
    ) -> Notifier {
        let mut registry = ChannelRegistry::new();
        for channel in channels {
            let kind = channel.kind();
            registry.register(kind, channel);
        }
        Notifier::new(registry, mode)
    }

    #[tokio::test]
    async fn eligible_set_is_the_three_way_intersection() {
        // Notification supports {mail, telegram}; recipient reachable via
        // {mail, flash}; configured {mail, database}. Eligible = {mail}.
        let (mail, mail_calls) = ScriptedChannel::succeeding(ChannelKind::Mail);
        let (database, database_calls) = ScriptedChannel::succeeding(ChannelKind::Database);
        let notifier = notifier_with(vec![mail, database], RuntimeMode::Production);

        let notification = TestNotification::new(
            vec![ChannelKind::Mail, ChannelKind::Telegram],
            ErrorStrategy::StoreErrors,
        );
        let recipient =
            TestRecipient::reachable_on(vec![ChannelKind::Mail, ChannelKind::Flash]);

        notifier
            .send_one(&recipient, &notification, None)
            .await
            .unwrap();

        assert_eq!(mail_calls.load(Ordering::SeqCst), 1);
        assert_eq!(database_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn opted_out_recipient_gets_no_channel_calls_and_no_events() {
        let (mail, mail_calls) = ScriptedChannel::succeeding(ChannelKind::Mail);
        let mut notifier = notifier_with(vec![mail], RuntimeMode::Production);
        let mut events = notifier.after_send_events();

        let notification =
            TestNotification::new(vec![ChannelKind::Mail], ErrorStrategy::StoreErrors);
        let recipient = TestRecipient::opted_out();

        notifier
            .send_one(&recipient, &notification, None)
            .await
            .unwrap();

        assert_eq!(mail_calls.load(Ordering::SeqCst), 0);
        assert!(events.try_recv().is_err());
        assert!(!notification.errors().has_any());
    }

    #[tokio::test]
    async fn channels_are_attempted_in_broadcast_on_order() {
        let (mail, _) = ScriptedChannel::succeeding(ChannelKind::Mail);
        let (flash, _) = ScriptedChannel::succeeding(ChannelKind::Flash);
        let mut notifier = notifier_with(vec![mail, flash], RuntimeMode::Production);
        let mut events = notifier.after_send_events();

        let notification = TestNotification::new(
            vec![ChannelKind::Flash, ChannelKind::Mail],
            ErrorStrategy::StoreErrors,
        );
        let recipient =
            TestRecipient::reachable_on(vec![ChannelKind::Mail, ChannelKind::Flash]);

        notifier
            .send_one(&recipient, &notification, None)
            .await
            .unwrap();

        assert_eq!(events.try_recv().unwrap().channel, ChannelKind::Flash);
        assert_eq!(events.try_recv().unwrap().channel, ChannelKind::Mail);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn store_errors_keeps_errors_and_continues() {
        let (mail, mail_calls) =
            ScriptedChannel::failing(ChannelKind::Mail, "sendmail", "mailbox unavailable");
        let notifier = notifier_with(vec![mail], RuntimeMode::Production);

        let notification =
            TestNotification::new(vec![ChannelKind::Mail], ErrorStrategy::StoreErrors);
        let first = TestRecipient::reachable_on(vec![ChannelKind::Mail]);
        let second = TestRecipient::reachable_on(vec![ChannelKind::Mail]);

        notifier
            .send(&[&first, &second], &[&notification], None)
            .await
            .unwrap();

        // Both pairs attempted despite the failures.
        assert_eq!(mail_calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            notification.errors().get("sendmail").as_deref(),
            Some("mailbox unavailable")
        );
    }

    #[tokio::test]
    async fn ignore_clears_errors_in_production() {
        let (mail, _) = ScriptedChannel::failing(ChannelKind::Mail, "sendmail", "boom");
        let notifier = notifier_with(vec![mail], RuntimeMode::Production);

        let notification = TestNotification::new(vec![ChannelKind::Mail], ErrorStrategy::Ignore);
        let recipient = TestRecipient::reachable_on(vec![ChannelKind::Mail]);

        notifier
            .send_one(&recipient, &notification, None)
            .await
            .unwrap();

        assert!(!notification.errors().has_any());
    }

    #[tokio::test]
    async fn ignore_keeps_errors_outside_production() {
        let (mail, _) = ScriptedChannel::failing(ChannelKind::Mail, "sendmail", "boom");
        let notifier = notifier_with(vec![mail], RuntimeMode::Development);

        let notification = TestNotification::new(vec![ChannelKind::Mail], ErrorStrategy::Ignore);
        let recipient = TestRecipient::reachable_on(vec![ChannelKind::Mail]);

        notifier
            .send_one(&recipient, &notification, None)
            .await
            .unwrap();

        assert!(notification.errors().has("sendmail"));
    }

    #[tokio::test]
    async fn fail_in_production_aborts_remaining_pairs() {
        let (mail, mail_calls) = ScriptedChannel::failing(ChannelKind::Mail, "sendmail", "boom");
        let mut notifier = notifier_with(vec![mail], RuntimeMode::Production);
        let mut events = notifier.after_send_events();

        let notification = TestNotification::new(vec![ChannelKind::Mail], ErrorStrategy::Fail);
        let first = TestRecipient::reachable_on(vec![ChannelKind::Mail]);
        let second = TestRecipient::reachable_on(vec![ChannelKind::Mail]);

        let err = notifier
            .send(&[&first, &second], &[&notification], None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            NotifyError::Delivery {
                channel: ChannelKind::Mail,
                ..
            }
        ));
        // Only the first pair was attempted, and its event still fired.
        assert_eq!(mail_calls.load(Ordering::SeqCst), 1);
        assert_eq!(events.try_recv().unwrap().status, SendStatus::Failure);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn fail_outside_production_degrades_to_report_only() {
        let (mail, mail_calls) = ScriptedChannel::failing(ChannelKind::Mail, "sendmail", "boom");
        let notifier = notifier_with(vec![mail], RuntimeMode::Test);

        let notification = TestNotification::new(vec![ChannelKind::Mail], ErrorStrategy::Throw);
        let first = TestRecipient::reachable_on(vec![ChannelKind::Mail]);
        let second = TestRecipient::reachable_on(vec![ChannelKind::Mail]);

        notifier
            .send(&[&first, &second], &[&notification], None)
            .await
            .unwrap();

        assert_eq!(mail_calls.load(Ordering::SeqCst), 2);
        assert!(notification.errors().has("sendmail"));
    }

    #[tokio::test]
    async fn events_fire_for_every_attempt_regardless_of_outcome() {
        let (mail, _) = ScriptedChannel::failing(ChannelKind::Mail, "sendmail", "boom");
        let (flash, _) = ScriptedChannel::succeeding(ChannelKind::Flash);
        let mut notifier = notifier_with(vec![mail, flash], RuntimeMode::Production);
        let mut events = notifier.after_send_events();

        let notification = TestNotification::new(
            vec![ChannelKind::Mail, ChannelKind::Flash],
            ErrorStrategy::Ignore,
        );
        let recipient =
            TestRecipient::reachable_on(vec![ChannelKind::Mail, ChannelKind::Flash]);

        notifier
            .send_one(&recipient, &notification, None)
            .await
            .unwrap();

        let first = events.try_recv().unwrap();
        assert_eq!(first.channel, ChannelKind::Mail);
        assert_eq!(first.status, SendStatus::Failure);
        assert_eq!(first.notification, "TestNotification");

        let second = events.try_recv().unwrap();
        assert_eq!(second.channel, ChannelKind::Flash);
        assert_eq!(second.status, SendStatus::Success);
    }

    #[test]
    fn registry_resolves_lazily_and_memoizes() {
        let built = Arc::new(AtomicUsize::new(0));
        let mut registry = ChannelRegistry::new();
        let counter = built.clone();
        registry.register_lazy(ChannelKind::Flash, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let (channel, _) = ScriptedChannel::succeeding(ChannelKind::Flash);
            Ok(channel as Arc<dyn Channel>)
        });

        assert_eq!(built.load(Ordering::SeqCst), 0);
        registry.resolve(ChannelKind::Flash).unwrap();
        registry.resolve(ChannelKind::Flash).unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn registry_rejects_unconfigured_channel() {
        let registry = ChannelRegistry::new();
        let err = registry.resolve(ChannelKind::Telegram).unwrap_err();
        assert!(matches!(
            err,
            NotifyError::ChannelNotConfigured {
                channel: ChannelKind::Telegram,
            }
        ));
    }

    #[test]
    fn builder_requires_collaborators_for_configured_channels() {
        let config = Config {
            mail: Some(Default::default()),
            ..Default::default()
        };
        let err = NotifierBuilder::new(config).build().unwrap_err();
        assert!(matches!(err, NotifyError::InvalidConfig(_)));
    }
}
