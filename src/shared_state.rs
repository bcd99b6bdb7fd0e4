use std::sync::Arc;

use crate::config::Config;
use crate::services::analysis_service::Analyzer;

/// Per-process state handed to every handler. Built once at startup and never
/// mutated, so requests share nothing but read-only configuration.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn new(config: Config, analyzer: Analyzer) -> Self {
        Self {
            config: Arc::new(config),
            analyzer: Arc::new(analyzer),
        }
    }
}
