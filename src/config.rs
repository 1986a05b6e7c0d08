//! Configuration and settings management.
//!
//! Settings layer `config/default`, `config/{RUN_MODE}` and
//! `config/local` files (all optional) under environment variables.
//! Every tunable carries a serde default, so a bare `TELEGRAM_TOKEN` +
//! `OWNER` environment is enough to run.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Application settings loaded at startup. Read-only afterwards.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    pub telegram_token: String,

    /// Owner identity; may carry a transport suffix
    pub owner: String,

    /// Command prefix
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Delay before handling a command, in milliseconds (anti-flood)
    #[serde(default = "default_response_delay_ms")]
    pub response_delay_ms: u64,

    /// Commands admitted per window for each non-owner identity
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: u32,

    /// Rate-limit window, in seconds
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,

    /// Port for the health-check endpoint
    #[serde(default = "default_health_port")]
    pub health_port: u16,

    /// Feature switches
    #[serde(default)]
    pub features: Features,

    /// Collaborator API endpoints
    #[serde(default)]
    pub apis: Apis,

    /// AI persona and timeout
    #[serde(default)]
    pub ai: AiSettings,

    /// Download limits
    #[serde(default)]
    pub downloads: Downloads,

    /// Creator contact card
    #[serde(default)]
    pub contact: Contact,

    /// Presence and menu-media behavior
    #[serde(default)]
    pub media: MediaSettings,

    /// User-facing message templates
    #[serde(default)]
    pub messages: Messages,
}

/// Feature switches. Everything is on by default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Features {
    /// AI question answering
    pub enable_ai: bool,
    /// Song/video search and download
    pub enable_downloads: bool,
    /// APK lookup and download
    pub enable_apk_downloads: bool,
    /// Support tickets
    pub enable_customer_care: bool,
    /// Per-identity command throttling
    pub enable_rate_limiting: bool,
    /// Block-list enforcement
    pub enable_blacklist: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            enable_ai: true,
            enable_downloads: true,
            enable_apk_downloads: true,
            enable_customer_care: true,
            enable_rate_limiting: true,
            enable_blacklist: true,
        }
    }
}

/// Collaborator API endpoints. The defaults point at the public
/// GiftedTech gateway; the key is account-specific.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Apis {
    /// Free-text media search endpoint
    pub search_url: String,
    /// Audio converter endpoint
    pub audio_url: String,
    /// Video converter endpoint
    pub video_url: String,
    /// APK catalog endpoint
    pub apk_url: String,
    /// AI completion endpoint
    pub ai_url: String,
    /// Shared API key for the gateway
    pub api_key: String,
}

impl Default for Apis {
    fn default() -> Self {
        Self {
            search_url: "https://api.giftedtech.my.id/api/search/yts".to_owned(),
            audio_url: "https://api.giftedtech.my.id/api/download/ytmp3".to_owned(),
            video_url: "https://api.giftedtech.my.id/api/download/ytmp4".to_owned(),
            apk_url: "https://api.giftedtech.my.id/api/download/apkdl".to_owned(),
            ai_url: "https://api.giftedtech.my.id/api/ai/gpt".to_owned(),
            api_key: String::new(),
        }
    }
}

/// AI persona and limits.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AiSettings {
    /// Engine name shown in status replies
    pub engine: String,
    /// Completion timeout, in milliseconds
    pub timeout_ms: u64,
    /// Persona prompt prepended to every question
    pub system_prompt: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            engine: "gpt-4o-mini".to_owned(),
            timeout_ms: 30_000,
            system_prompt: "You are Aria Mini, a friendly chat assistant. \
                            Keep answers concise but helpful, and use emojis sparingly."
                .to_owned(),
        }
    }
}

/// Download limits.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Downloads {
    /// Per-download timeout, in milliseconds
    pub timeout_ms: u64,
    /// Maximum delivered file size, in bytes
    pub max_file_size_bytes: u64,
}

impl Default for Downloads {
    fn default() -> Self {
        Self {
            timeout_ms: 120_000,
            max_file_size_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Creator contact information for `.dev` and status replies.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Contact {
    /// Creator display name
    pub name: String,
    /// Support email
    pub email: String,
    /// Phone number in international format
    pub phone: String,
    /// GitHub handle
    pub github: String,
}

impl Default for Contact {
    fn default() -> Self {
        Self {
            name: "Aria Labs".to_owned(),
            email: "support@arialabs.dev".to_owned(),
            phone: "+15555550100".to_owned(),
            github: "aria-labs".to_owned(),
        }
    }
}

/// Presence and menu-media behavior.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MediaSettings {
    /// Image attached to the menu reply; plain text when unset
    pub menu_image_url: Option<String>,
    /// Show a brief "recording" presence after handled commands
    pub auto_recording: bool,
    /// Presence refresh interval, in seconds
    pub presence_interval_secs: u64,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            menu_image_url: None,
            auto_recording: true,
            presence_interval_secs: 30,
        }
    }
}

/// User-facing message templates. `{placeholders}` are substituted at
/// send time.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Messages {
    /// AI backend failure
    pub api_error: String,
    /// Download/search pipeline failure
    pub download_error: String,
    /// Search/lookup miss; `{subject}`
    pub not_found: String,
    /// Throttling notice
    pub rate_limited: String,
    /// Owner-only denial
    pub owner_only: String,
    /// Block confirmation
    pub user_blocked: String,
    /// Unblock confirmation
    pub user_unblocked: String,
    /// Care acknowledgment; `{id}`, `{name}`
    pub care_submitted: String,
    /// Static bot description
    pub bot_info: String,
    /// AI feature switched off
    pub ai_disabled: String,
    /// Downloads switched off
    pub downloads_disabled: String,
    /// APK downloads switched off
    pub apk_disabled: String,
    /// Customer care switched off
    pub care_disabled: String,
    /// Catch-all handler failure
    pub generic_error: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            api_error: "❌ Sorry, I'm having trouble with my AI brain right now. Please try again!"
                .to_owned(),
            download_error:
                "❌ Oops! Couldn't download that for you. Please try a different search term."
                    .to_owned(),
            not_found: "❌ Sorry, couldn't find: <b>{subject}</b>".to_owned(),
            rate_limited:
                "⏰ Whoa there! You're sending messages too fast. Please slow down a bit!"
                    .to_owned(),
            owner_only: "❌ This command is only available to my creator!".to_owned(),
            user_blocked: "🚫 User has been blocked successfully!".to_owned(),
            user_unblocked: "✅ User has been unblocked successfully!".to_owned(),
            care_submitted:
                "🆘 Your support request <b>#{id}</b> has been forwarded to {name}! You'll hear back soon."
                    .to_owned(),
            bot_info: "🤖 <b>Aria Mini</b>\n\n\
                       ✨ Chat assistant with AI answers\n\
                       🎵 Song &amp; video downloads\n\
                       🆘 Built-in customer support\n\n\
                       🛠️ Created by Aria Labs"
                .to_owned(),
            ai_disabled: "🤖 AI features are currently disabled.".to_owned(),
            downloads_disabled: "🎵 Download features are currently disabled.".to_owned(),
            apk_disabled: "📱 APK download features are currently disabled.".to_owned(),
            care_disabled: "🆘 Customer care is currently disabled.".to_owned(),
            generic_error: "❌ Something went wrong. Please try again later!".to_owned(),
        }
    }
}

impl Settings {
    /// Loads settings from config files and the environment.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading or deserialization fails.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(File::with_name("config/default").required(false))
            // Add in the current environment file
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked into git
            .add_source(File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of APP)
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Also add settings from environment variables directly (without prefix)
            // Note: Environment::default() auto-converts UPPER_SNAKE_CASE to snake_case
            // ignore_empty treats empty env vars as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        s.try_deserialize()
    }

    /// Rate-limit window as a [`Duration`].
    #[must_use]
    pub const fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    /// Pre-command delay as a [`Duration`].
    #[must_use]
    pub const fn response_delay(&self) -> Duration {
        Duration::from_millis(self.response_delay_ms)
    }

    /// AI completion timeout as a [`Duration`].
    #[must_use]
    pub const fn ai_timeout(&self) -> Duration {
        Duration::from_millis(self.ai.timeout_ms)
    }

    /// Download timeout as a [`Duration`].
    #[must_use]
    pub const fn download_timeout(&self) -> Duration {
        Duration::from_millis(self.downloads.timeout_ms)
    }
}

fn default_prefix() -> String {
    ".".to_owned()
}

const fn default_response_delay_ms() -> u64 {
    1_000
}

const fn default_rate_limit_max() -> u32 {
    20
}

const fn default_rate_limit_window_secs() -> u64 {
    60
}

const fn default_health_port() -> u16 {
    3_000
}
