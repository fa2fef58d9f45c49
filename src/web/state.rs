//! Application state shared across handlers

use crate::config::Settings;
use crate::providers::ProviderRegistry;
use crate::search::Search;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Provider registry
    pub registry: Arc<ProviderRegistry>,
    /// Search executor
    pub search: Arc<Search>,
    /// Timeout for requests that don't specify one
    pub default_timeout: Duration,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: &Settings, search: Search) -> Self {
        Self {
            registry: search.registry().clone(),
            search: Arc::new(search),
            default_timeout: settings.search.default_timeout(),
        }
    }
}
