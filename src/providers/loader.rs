//! Provider loader for registering built-in providers from configuration

use super::github::GitHub;
use super::registry::{ProviderRegistration, ProviderRegistry};
use crate::config::Settings;
use crate::network::HttpClient;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Loader for initializing providers from configuration
pub struct ProviderLoader;

impl ProviderLoader {
    /// Build a registry holding every enabled built-in provider
    pub fn load(settings: &Settings, client: &HttpClient) -> Result<ProviderRegistry> {
        let registry = ProviderRegistry::new();

        for registration in Self::registrations(settings, client) {
            registry.register(registration)?;
        }

        info!("Loaded {} providers", registry.len());
        Ok(registry)
    }

    fn registrations(settings: &Settings, client: &HttpClient) -> Vec<ProviderRegistration> {
        let mut registrations = Vec::new();

        let github = &settings.providers.github;
        if github.enabled {
            info!("Loaded provider: {} ({})", GitHub::NAME, github.url);
            registrations.push(
                ProviderRegistration::new(GitHub::NAME)
                    .title(GitHub::TITLE)
                    .no_ui(github.no_ui)
                    .searcher(Arc::new(GitHub::new(client.clone(), github))),
            );
        } else {
            info!("Skipping disabled provider: {}", GitHub::NAME);
        }

        registrations
    }
}
