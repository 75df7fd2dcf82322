use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    pub server: ServerSettings,
    pub feed: FeedSettings,
    pub beacon: BeaconSettings,
    pub broadcast: BroadcastSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedSettings {
    pub url: String,
    pub database: String,
    pub table: String,
    pub filter_field: String,
    pub filter_value: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BeaconSettings {
    pub enabled: bool,
    pub interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BroadcastSettings {
    pub capacity: usize,
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl BeaconSettings {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3002)?
        .set_default("server.static_dir", "public")?
        .set_default("feed.url", "http://localhost:28015")?
        .set_default("feed.database", "data")?
        .set_default("feed.table", "Europe")?
        .set_default("feed.filter_field", "OpIcao")?
        .set_default("feed.filter_value", "IBE")?
        .set_default("beacon.enabled", true)?
        .set_default("beacon.interval_ms", 100)?
        .set_default("broadcast.capacity", 1024)
}

/// Defaults, then `config/relay.toml` if present, then `RELAY__SECTION__KEY` variables
pub fn load_relay_config() -> anyhow::Result<RelayConfig> {
    load_relay_config_from(relay_environment())
}

/// Values stay strings until deserialized, so names like `007` pass through untouched
fn relay_environment() -> Environment {
    Environment::with_prefix("RELAY")
        .prefix_separator("__")
        .separator("__")
}

fn load_relay_config_from(environment: Environment) -> anyhow::Result<RelayConfig> {
    let settings = defaults()?
        .add_source(File::with_name("config/relay").required(false))
        .add_source(environment)
        .build()?;

    Ok(settings.try_deserialize()?)
}
