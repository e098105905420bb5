use crate::application::search::{SearchMode, SearchSettings};
use crate::domain::vehicle::{VehicleCatalog, VehicleIdentity};
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub polling: PollingSettings,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub chat: ChatSettings,
    /// Reference catalog; the built-in ten vehicles when not configured
    #[serde(default)]
    pub vehicles: Option<Vec<VehicleIdentity>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    #[default]
    Http,
    Simulated,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    #[serde(default)]
    pub mode: BackendMode,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            mode: BackendMode::default(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingSettings {
    #[serde(default = "default_vehicle_interval_secs")]
    pub vehicle_interval_secs: u64,
    #[serde(default = "default_fleet_interval_secs")]
    pub fleet_interval_secs: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            vehicle_interval_secs: default_vehicle_interval_secs(),
            fleet_interval_secs: default_fleet_interval_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default)]
    pub mode: SearchMode,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_blur_grace_ms")]
    pub blur_grace_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::default(),
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
            page_size: default_page_size(),
            blur_grace_ms: default_blur_grace_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatSettings {
    #[serde(default = "default_response_delay_ms")]
    pub response_delay_ms: u64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            response_delay_ms: default_response_delay_ms(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_base_url() -> String {
    "http://localhost:3001/api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_vehicle_interval_secs() -> u64 {
    10
}

fn default_fleet_interval_secs() -> u64 {
    30
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_min_query_len() -> usize {
    3
}

fn default_page_size() -> usize {
    10
}

fn default_blur_grace_ms() -> u64 {
    150
}

fn default_response_delay_ms() -> u64 {
    1000
}

impl AppConfig {
    pub fn vehicle_interval(&self) -> Duration {
        Duration::from_secs(self.polling.vehicle_interval_secs)
    }

    pub fn fleet_interval(&self) -> Duration {
        Duration::from_secs(self.polling.fleet_interval_secs)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    pub fn chat_delay(&self) -> Duration {
        Duration::from_millis(self.chat.response_delay_ms)
    }

    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            mode: self.search.mode,
            debounce: Duration::from_millis(self.search.debounce_ms),
            min_query_len: self.search.min_query_len,
            page_size: self.search.page_size,
            blur_grace: Duration::from_millis(self.search.blur_grace_ms),
        }
    }

    pub fn catalog(&self) -> VehicleCatalog {
        match &self.vehicles {
            Some(vehicles) => VehicleCatalog::new(vehicles.clone()),
            None => VehicleCatalog::default(),
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.polling.vehicle_interval_secs > 0, "polling.vehicle_interval_secs must be positive");
        anyhow::ensure!(self.polling.fleet_interval_secs > 0, "polling.fleet_interval_secs must be positive");
        anyhow::ensure!(self.search.page_size > 0, "search.page_size must be positive");
        anyhow::ensure!(self.backend.timeout_secs > 0, "backend.timeout_secs must be positive");
        Ok(())
    }
}

/// `config/dashboard.toml` if present, overridden by `FLEET__SECTION__KEY` variables
/// `FLEET__SECTION__KEY` variables, e.g. `FLEET__BACKEND__MODE=simulated`
fn environment() -> Environment {
    Environment::with_prefix("FLEET")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

pub fn load_config() -> anyhow::Result<AppConfig> {
    let builder = config::Config::builder()
        .add_source(File::with_name("config/dashboard").required(false))
        .add_source(environment());

    finish(builder)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<AppConfig> {
    let settings: AppConfig = builder.build()?.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}
