use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use ticketing_domain::RuntimeConfig;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub payment_window_minutes: i64,
    pub confirmation_window_hours: i64,
    pub scheduler_tick_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            payment_window_minutes: runtime.payment_window_minutes,
            confirmation_window_hours: runtime.confirmation_window_hours,
            scheduler_tick_seconds: runtime.scheduler_tick_seconds,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("TICKETING_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        if !file_path.exists() {
            warn!("config.toml not found, using defaults");
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            return Ok(config);
        }
        let content = fs::read_to_string(file_path).await?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("TICKETING_PAYMENT_WINDOW_MINUTES") {
            if let Ok(parsed) = value.parse() {
                self.payment_window_minutes = parsed;
            }
        }
        if let Ok(value) = env::var("TICKETING_CONFIRMATION_WINDOW_HOURS") {
            if let Ok(parsed) = value.parse() {
                self.confirmation_window_hours = parsed;
            }
        }
        if let Ok(value) = env::var("TICKETING_SCHEDULER_TICK_SECONDS") {
            if let Ok(parsed) = value.parse() {
                self.scheduler_tick_seconds = parsed;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.payment_window_minutes <= 0 {
            return Err(anyhow!("payment_window_minutes must be positive"));
        }
        if self.confirmation_window_hours <= 0 {
            return Err(anyhow!("confirmation_window_hours must be positive"));
        }
        if self.scheduler_tick_seconds == 0 {
            return Err(anyhow!("scheduler_tick_seconds must be positive"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            payment_window_minutes: self.payment_window_minutes,
            confirmation_window_hours: self.confirmation_window_hours,
            scheduler_tick_seconds: self.scheduler_tick_seconds,
        }
    }
}
