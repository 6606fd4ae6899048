use std::sync::Arc;

use crate::config::Config;
use crate::services::{Backend, HttpBackend};

/// Shared application state, immutable after startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: Arc<dyn Backend>,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn Backend>) -> Self {
        Self {
            config: Arc::new(config),
            backend,
        }
    }

    /// State backed by the HTTP backend client named in `config`
    pub fn from_config(config: Config) -> Self {
        let backend = HttpBackend::new(config.backend_api_url.clone());
        Self::new(config, Arc::new(backend))
    }
}
