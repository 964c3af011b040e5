use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::webhook::{WebhookConfig, DEFAULT_TIMEOUT_MS, DEFAULT_USER_ID};

use super::error::ConfigError;
use super::paths::ConfigPaths;

/// Overrides the saved webhook URL at load time.
pub const ENV_WEBHOOK_URL: &str = "SYLPHIE_WEBHOOK_URL";
/// Overrides the saved timeout (milliseconds) at load time.
pub const ENV_TIMEOUT_MS: &str = "SYLPHIE_TIMEOUT_MS";

const DEFAULT_LOG_ROTATE_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_LOG_ROTATE_KEEP: usize = 5;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub webhook: WebhookSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebhookSettings {
    /// Endpoint URL; the one key the client persists.
    pub url: Option<String>,
    pub timeout_ms: u64,
    pub user_id: String,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_id: DEFAULT_USER_ID.to_string(),
        }
    }
}

impl WebhookSettings {
    /// Builds the dispatcher configuration; `None` until a URL is set.
    pub fn endpoint(&self) -> Option<WebhookConfig> {
        let url = self.url.as_deref()?;
        Some(
            WebhookConfig::new(url)
                .timeout_ms(self.timeout_ms)
                .user_id(self.user_id.clone()),
        )
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub path: Option<String>,
    pub rotate_size: u64,
    pub rotate_keep: usize,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            path: None,
            rotate_size: DEFAULT_LOG_ROTATE_SIZE,
            rotate_keep: DEFAULT_LOG_ROTATE_KEEP,
        }
    }
}

/// Partial update applied over the saved settings.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub user_id: Option<String>,
}

impl Settings {
    /// Merges a partial update; unset fields keep their current value.
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(url) = update.url {
            self.webhook.url = Some(url);
        }
        if let Some(timeout_ms) = update.timeout_ms {
            self.webhook.timeout_ms = timeout_ms;
        }
        if let Some(user_id) = update.user_id {
            self.webhook.user_id = user_id;
        }
    }
}

#[derive(Debug)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub paths: ConfigPaths,
    pub config_exists: bool,
}

/// Loads settings from disk, tolerating a missing file, then applies
/// environment overrides.
pub fn load_settings(path_override: Option<PathBuf>) -> Result<LoadedSettings, ConfigError> {
    let paths = ConfigPaths::resolve(path_override)?;
    ensure_dirs(&paths)?;
    let read = read_settings(&paths.config_file)?;
    let mut settings = read.settings;
    apply_env(
        &mut settings,
        std::env::var(ENV_WEBHOOK_URL).ok(),
        std::env::var(ENV_TIMEOUT_MS).ok(),
    );
    Ok(LoadedSettings {
        settings,
        paths,
        config_exists: read.exists,
    })
}

pub fn save_settings(settings: &Settings, paths: &ConfigPaths) -> Result<(), ConfigError> {
    ensure_dirs(paths)?;
    let contents = toml::to_string_pretty(settings)?;
    fs::write(&paths.config_file, contents)?;
    secure_file_permissions(&paths.config_file)?;
    Ok(())
}

fn read_settings(path: &Path) -> Result<SettingsRead, ConfigError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(SettingsRead {
            settings: toml::from_str(&contents)?,
            exists: true,
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(SettingsRead {
            settings: Settings::default(),
            exists: false,
        }),
        Err(err) => Err(ConfigError::Io(err)),
    }
}

struct SettingsRead {
    settings: Settings,
    exists: bool,
}

fn apply_env(settings: &mut Settings, url: Option<String>, timeout_ms: Option<String>) {
    if let Some(url) = url.filter(|u| !u.is_empty()) {
        settings.webhook.url = Some(url);
    }
    if let Some(ms) = timeout_ms.and_then(|raw| raw.parse().ok()) {
        settings.webhook.timeout_ms = ms;
    }
}

fn ensure_dirs(paths: &ConfigPaths) -> Result<(), ConfigError> {
    fs::create_dir_all(&paths.config_dir)?;
    fs::create_dir_all(&paths.data_dir)?;
    fs::create_dir_all(&paths.logs_dir)?;
    Ok(())
}

fn secure_file_permissions(path: &Path) -> Result<(), ConfigError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = fs::metadata(path) {
            let mut perms = metadata.permissions();
            let mode = perms.mode() & 0o777;
            if mode & 0o077 != 0 {
                perms.set_mode(0o600);
                fs::set_permissions(path, perms)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_paths() -> (tempfile::TempDir, ConfigPaths) {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().to_path_buf();
        let paths = ConfigPaths {
            config_file: root.join("config.toml"),
            config_dir: root.clone(),
            data_dir: root.join("data"),
            logs_dir: root.join("logs"),
        };
        (dir, paths)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let (_dir, paths) = temp_paths();
        let read = read_settings(&paths.config_file).expect("read");
        assert!(!read.exists);
        assert_eq!(read.settings.webhook.url, None);
        assert_eq!(read.settings.webhook.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(read.settings.webhook.user_id, DEFAULT_USER_ID);
    }

    #[test]
    fn save_and_read_round_trip() {
        let (_dir, paths) = temp_paths();
        let mut settings = Settings::default();
        settings.apply(SettingsUpdate {
            url: Some("https://example.com/webhook".to_string()),
            timeout_ms: Some(10_000),
            user_id: None,
        });
        save_settings(&settings, &paths).expect("save");

        let read = read_settings(&paths.config_file).expect("read");
        assert!(read.exists);
        assert_eq!(
            read.settings.webhook.url.as_deref(),
            Some("https://example.com/webhook")
        );
        assert_eq!(read.settings.webhook.timeout_ms, 10_000);
        assert_eq!(read.settings.webhook.user_id, DEFAULT_USER_ID);
    }

    #[test]
    fn apply_merges_only_set_fields() {
        let mut settings = Settings::default();
        settings.apply(SettingsUpdate {
            url: Some("https://a.example".to_string()),
            ..Default::default()
        });
        settings.apply(SettingsUpdate {
            timeout_ms: Some(5_000),
            ..Default::default()
        });
        assert_eq!(settings.webhook.url.as_deref(), Some("https://a.example"));
        assert_eq!(settings.webhook.timeout_ms, 5_000);
    }

    #[test]
    fn env_overrides_take_precedence() {
        let mut settings = Settings::default();
        settings.webhook.url = Some("https://saved.example".to_string());
        apply_env(
            &mut settings,
            Some("https://env.example".to_string()),
            Some("1234".to_string()),
        );
        assert_eq!(settings.webhook.url.as_deref(), Some("https://env.example"));
        assert_eq!(settings.webhook.timeout_ms, 1234);
    }

    #[test]
    fn malformed_env_values_are_ignored() {
        let mut settings = Settings::default();
        apply_env(&mut settings, Some(String::new()), Some("soon".to_string()));
        assert_eq!(settings.webhook.url, None);
        assert_eq!(settings.webhook.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn endpoint_requires_a_url() {
        let settings = Settings::default();
        assert!(settings.webhook.endpoint().is_none());

        let mut settings = Settings::default();
        settings.webhook.url = Some("https://example.com/webhook".to_string());
        let endpoint = settings.webhook.endpoint().expect("endpoint");
        assert_eq!(endpoint.url, "https://example.com/webhook");
        assert_eq!(endpoint.user_id, DEFAULT_USER_ID);
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_user_only() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, paths) = temp_paths();
        save_settings(&Settings::default(), &paths).expect("save");
        let mode = fs::metadata(&paths.config_file)
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o077, 0);
    }
}
