use std::sync::Arc;

use anyhow::Result;

use ticketing_application::AppState;
use ticketing_infrastructure::{AppConfig, MemoryStore};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let runtime_config = config.to_runtime_config();

        let store = Arc::new(MemoryStore::new());

        let state = AppState {
            config: runtime_config,
            store,
        };

        Ok(Self { state })
    }
}
