//! Provider registry for managing available search providers

use super::traits::Searcher;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Errors raised while registering or looking up providers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The registration carried no search capability
    #[error("invalid provider")]
    InvalidProvider,
    /// The registration had an empty name
    #[error("invalid provider name")]
    InvalidName,
    /// A provider with the same name is already registered
    #[error("search provider {0} is already registered")]
    DuplicateProvider(String),
    /// No provider with the given name exists
    #[error("provider {0} couldn't be found")]
    ProviderNotFound(String),
}

/// Identity fields and capability of a provider about to be registered
#[derive(Clone, Default)]
pub struct ProviderRegistration {
    name: String,
    title: String,
    enabled: bool,
    no_ui: bool,
    searcher: Option<Arc<dyn Searcher>>,
}

impl ProviderRegistration {
    /// Start a registration for the named provider, enabled by default
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            ..Default::default()
        }
    }

    /// Set the display title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set whether the provider is enabled
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Hide the provider from the web UI
    pub fn no_ui(mut self, no_ui: bool) -> Self {
        self.no_ui = no_ui;
        self
    }

    /// Attach the search capability
    pub fn searcher(mut self, searcher: Arc<dyn Searcher>) -> Self {
        self.searcher = Some(searcher);
        self
    }
}

/// A registered provider. Immutable once stored in the registry.
#[derive(Clone)]
pub struct Provider {
    name: String,
    title: String,
    enabled: bool,
    no_ui: bool,
    searcher: Arc<dyn Searcher>,
}

impl Provider {
    /// Unique provider name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display title
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_no_ui(&self) -> bool {
        self.no_ui
    }

    /// The provider's search capability
    pub fn searcher(&self) -> &Arc<dyn Searcher> {
        &self.searcher
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("enabled", &self.enabled)
            .field("no_ui", &self.no_ui)
            .finish_non_exhaustive()
    }
}

/// Registry of all available search providers.
///
/// Populated during bootstrap and read by every search afterwards. A single
/// lock makes registration safe even when it overlaps with lookups.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Arc<Provider>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider
    pub fn register(&self, registration: ProviderRegistration) -> Result<(), RegistryError> {
        let searcher = registration
            .searcher
            .ok_or(RegistryError::InvalidProvider)?;

        if registration.name.is_empty() {
            return Err(RegistryError::InvalidName);
        }
        let title = if registration.title.is_empty() {
            registration.name.clone()
        } else {
            registration.title
        };

        let mut providers = self
            .providers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if providers.contains_key(&registration.name) {
            return Err(RegistryError::DuplicateProvider(registration.name));
        }

        providers.insert(
            registration.name.clone(),
            Arc::new(Provider {
                name: registration.name,
                title,
                enabled: registration.enabled,
                no_ui: registration.no_ui,
                searcher,
            }),
        );

        Ok(())
    }

    /// Names of all registered providers, sorted ascending
    pub fn providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Get a provider by name
    pub fn provider_by_name(&self, name: &str) -> Result<Arc<Provider>, RegistryError> {
        self.read()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::ProviderNotFound(name.to_string()))
    }

    /// All registered providers, sorted by name
    pub fn list(&self) -> Vec<Arc<Provider>> {
        let mut providers: Vec<Arc<Provider>> = self.read().values().cloned().collect();
        providers.sort_by(|a, b| a.name.cmp(&b.name));
        providers
    }

    /// Check if a provider exists
    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Get number of registered providers
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<Provider>>> {
        self.providers.read().unwrap_or_else(PoisonError::into_inner)
    }
}
