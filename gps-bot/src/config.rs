use std::sync::OnceLock;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpsConfig {
    /// Tracking backend base URL, e.g. "https://tracker.example.com".
    pub base_url: String,
    /// Device IMEI; doubles as the login username.
    pub imei: String,
    pub password: String,

    /// The backend ships a broken certificate chain; opt in to talk
    /// to it anyway. Default off.
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Seconds a PHPSESSID is trusted before re-login.
    #[serde(default = "default_session_refresh_interval")]
    pub session_refresh_interval: u64,

    /// Total attempts for a location-update trigger.
    #[serde(default = "default_retry_count")]
    pub update_retry_count: u32,

    /// Seconds between attempts.
    #[serde(default = "default_retry_delay")]
    pub update_retry_delay: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    pub api_key: String,
    /// "lat,lng" of home, the fixed destination for travel times.
    pub home_coords: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Display timezone as a fixed UTC offset, e.g. "+02:00".
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub gps: GpsConfig,
    pub maps: MapsConfig,
    pub app: AppConfig,
}

fn default_session_refresh_interval() -> u64 {
    1800
}

fn default_retry_count() -> u32 {
    1
}

fn default_retry_delay() -> f64 {
    2.0
}

fn default_timezone() -> String {
    "+02:00".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// The fixed offset all timestamps are displayed in.
    pub fn display_timezone(&self) -> anyhow::Result<FixedOffset> {
        self.app
            .timezone
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid timezone offset '{}': {}", self.app.timezone, e))
    }
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn read_config() -> anyhow::Result<()> {
    let path = "config.toml";
    let config = Config::from_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to load config file {}: {}", path, e))?;
    CONFIG.set(config).ok();
    Ok(())
}
