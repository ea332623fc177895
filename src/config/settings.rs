use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub topbar: TopBarGlobalConfig,
    #[serde(default)]
    pub countdown: CountdownDisplayConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Root of the candidate endpoint, e.g. `https://example.com/nc/v1`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Current page URL sent as fetch context
    #[serde(default = "default_page_url")]
    pub page_url: String,
    /// Current page id sent as fetch context (0 = unknown)
    #[serde(default)]
    pub page_id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub mode: DisplayMode,
    #[serde(default)]
    pub sound_enabled: bool,
    #[serde(default)]
    pub badge_style: BadgeStyle,
    #[serde(default)]
    pub debug: bool,
}

/// How the sidebar list is presented by the host adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Drawer,
    Dropdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeStyle {
    /// Numeric unread count, clamped to "9+"
    #[default]
    Count,
    /// Presence-only dot
    Dot,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopBarGlobalConfig {
    /// Global kill switch for the top bar surface
    #[serde(default)]
    pub disabled: bool,
    #[serde(default = "default_true")]
    pub dismissible: bool,
    #[serde(default)]
    pub sticky: bool,
    /// Seconds between rotations when more than one item qualifies
    #[serde(default = "default_rotation_seconds")]
    pub rotation_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountdownDisplayConfig {
    /// Whether countdown segments carry unit labels
    #[serde(default = "default_true")]
    pub show_units: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path of the file-backed state store used by the demo binary
    #[serde(default = "default_storage_path")]
    pub path: String,
}

fn default_base_url() -> String {
    "http://localhost:8080/nc/v1".to_string()
}

fn default_page_url() -> String {
    "/".to_string()
}

fn default_rotation_seconds() -> u64 {
    5
}

fn default_storage_path() -> String {
    "pulse-state.json".to_string()
}

fn default_true() -> bool {
    true
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("api.base_url", default_base_url())?
            .set_default("api.page_url", default_page_url())?
            .set_default("api.page_id", 0)?
            .set_default("topbar.rotation_seconds", default_rotation_seconds() as i64)?
            .set_default("storage.path", default_storage_path())?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // API_BASE_URL, DISPLAY_MODE, TOPBAR_DISABLED, etc.
            .add_source(
                Environment::default()
                    .separator("_")
                    .try_parsing(true)
                    .list_separator(","),
            );

        builder.build()?.try_deserialize()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_url: default_page_url(),
            page_id: 0,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Drawer,
            sound_enabled: false,
            badge_style: BadgeStyle::Count,
            debug: false,
        }
    }
}

impl Default for TopBarGlobalConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            dismissible: true,
            sticky: false,
            rotation_seconds: default_rotation_seconds(),
        }
    }
}

impl Default for CountdownDisplayConfig {
    fn default() -> Self {
        Self { show_units: true }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            display: DisplayConfig::default(),
            topbar: TopBarGlobalConfig::default(),
            countdown: CountdownDisplayConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.api.base_url, "http://localhost:8080/nc/v1");
        assert_eq!(settings.display.mode, DisplayMode::Drawer);
        assert_eq!(settings.display.badge_style, BadgeStyle::Count);
        assert!(settings.topbar.dismissible);
        assert!(!settings.topbar.disabled);
        assert_eq!(settings.topbar.rotation_seconds, 5);
        assert!(settings.countdown.show_units);
    }

    #[test]
    fn test_mode_deserialization() {
        let mode: DisplayMode = serde_json::from_str("\"dropdown\"").unwrap();
        assert_eq!(mode, DisplayMode::Dropdown);
        let style: BadgeStyle = serde_json::from_str("\"dot\"").unwrap();
        assert_eq!(style, BadgeStyle::Dot);
    }
}
