//! Persistent endpoint settings.
//!
//! One TOML file under the user's config dir holds the webhook URL (the
//! only state the original client persisted), the timeout, and logging
//! options. Environment variables override the file at load time.

mod error;
mod paths;
mod store;

pub use error::ConfigError;
pub use paths::ConfigPaths;
pub use store::{
    load_settings, save_settings, LoadedSettings, LoggingSettings, Settings, SettingsUpdate,
    WebhookSettings, ENV_TIMEOUT_MS, ENV_WEBHOOK_URL,
};
