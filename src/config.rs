//! Configuration for the notifier.
//!
//! Typed `serde` structs loaded through `figment`: defaults, merged with a
//! TOML file and `NOTIFLY_`-prefixed environment variables. Only the channel
//! sections that are present end up in the channel registry; the runtime
//! mode is carried explicitly here rather than read from ambient state.

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The deployment environment the notifier runs in.
///
/// Governs error escalation (hard aborts degrade to report-only outside
/// production) and the development/test conveniences of the built-in
/// channels (dev rerouting, test-mode short circuits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeMode {
    #[default]
    Production,
    Development,
    Test,
}

/// The main configuration struct for the notifier.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    /// The deployment environment, passed explicitly to the dispatcher.
    #[serde(default)]
    pub runtime_mode: RuntimeMode,
    /// Mail channel settings; absent disables the channel.
    pub mail: Option<MailConfig>,
    /// Telegram channel settings; absent disables the channel.
    pub telegram: Option<TelegramConfig>,
    /// Database channel settings; absent disables the channel.
    pub database: Option<DatabaseConfig>,
    /// Flash channel settings; absent disables the channel.
    pub flash: Option<FlashConfig>,
}

/// Settings for the mail channel.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct MailConfig {
    /// Fallback sender address when neither the message nor a sender
    /// account provides one.
    pub admin_email: Option<String>,
    /// Address all mail is rerouted to in development mode.
    pub devel_email: Option<String>,
    /// Prefix prepended to every mail subject.
    #[serde(default)]
    pub subject_prefix: Option<String>,
    /// Named sender accounts selectable per dispatch call.
    #[serde(default)]
    pub sender_accounts: BTreeMap<String, MailAccount>,
}

/// A named mail sender account.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MailAccount {
    pub from: String,
}

/// Settings for the Telegram channel.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelegramConfig {
    /// Base URL of the Bot API.
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
    /// Default bot token. Looks like `123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11`.
    pub bot_token: String,
    /// Bot token used in development mode.
    pub devel_bot_token: Option<String>,
    /// Chat all messages are rerouted to in development mode.
    pub devel_chat_id: Option<String>,
    /// Per-request timeout for the Bot API call.
    #[serde(default = "default_telegram_timeout_secs")]
    pub timeout_secs: u64,
    /// Named bot accounts selectable per dispatch call.
    #[serde(default)]
    pub sender_accounts: BTreeMap<String, TelegramAccount>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: default_telegram_api_url(),
            bot_token: String::new(),
            devel_bot_token: None,
            devel_chat_id: None,
            timeout_secs: default_telegram_timeout_secs(),
            sender_accounts: BTreeMap::new(),
        }
    }
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_telegram_timeout_secs() -> u64 {
    10
}

/// A named Telegram bot account.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TelegramAccount {
    pub bot_token: Option<String>,
    pub devel_bot_token: Option<String>,
}

/// Settings for the database channel. Presence enables the channel; the
/// backing store itself is injected, not configured.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DatabaseConfig {}

/// Settings for the flash channel. Presence enables the channel.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FlashConfig {}

impl Config {
    /// Loads the notifier configuration from the specified TOML file,
    /// allowing overrides via `NOTIFLY_`-prefixed environment variables.
    pub fn load(config_path: &str) -> Result<Self> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("NOTIFLY_"))
            .extract()?;
        Ok(config)
    }
}
