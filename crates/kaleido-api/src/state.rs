use kaleido_search::SearchOrchestrator;
use std::sync::Arc;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The orchestrator is stateless apart from its stores and is built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub search: Arc<SearchOrchestrator>,
    /// Name of the store backend, reported by the health check
    pub storage: &'static str,
}

impl AppState {
    pub fn new(config: Config, search: SearchOrchestrator, storage: &'static str) -> Self {
        Self {
            config: Arc::new(config),
            search: Arc::new(search),
            storage,
        }
    }
}
