use std::sync::Arc;

use ticketing_domain::ports::Store;
use ticketing_domain::RuntimeConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub store: Arc<dyn Store>,
}
