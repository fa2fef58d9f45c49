//! Settings structures for Ferret configuration

use super::{default_goto_command, parse_duration_or_default};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main settings structure matching `ferret.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search: SearchSettings,
    pub server: ServerSettings,
    pub outgoing: OutgoingSettings,
    pub providers: ProvidersSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables (FERRET_* prefix)
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Merge values from an arbitrary variable lookup.
    ///
    /// Empty values are ignored so an exported but blank variable does not
    /// wipe a configured setting.
    pub fn merge_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(val) = var("FERRET_SEARCH_TIMEOUT") {
            self.search.timeout = val;
        }
        if let Some(val) = var("FERRET_GOTO_CMD") {
            self.search.goto_command = Some(val);
        }
        if let Some(val) = var("FERRET_LISTEN_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Some(val) = var("FERRET_LISTEN_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("FERRET_GITHUB_URL") {
            self.providers.github.url = val.trim_end_matches('/').to_string();
        }
        if let Some(val) = var("FERRET_GITHUB_TOKEN") {
            self.providers.github.token = Some(val);
        }
        if let Some(val) = var("FERRET_GITHUB_SEARCH_USER") {
            self.providers.github.search_user = Some(val);
        }
    }
}

/// Search behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Default per-query timeout, e.g. `5000ms` or `5s`
    pub timeout: String,
    /// Command used to open a result link
    pub goto_command: Option<String>,
}

impl SearchSettings {
    /// Configured timeout, falling back to 5000ms when malformed
    pub fn default_timeout(&self) -> Duration {
        parse_duration_or_default(&self.timeout)
    }

    /// Configured goto command, or the platform opener
    pub fn goto_command(&self) -> String {
        self.goto_command
            .clone()
            .unwrap_or_else(|| default_goto_command().to_string())
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            timeout: "5000ms".to_string(),
            goto_command: None,
        }
    }
}

/// Settings for the `listen` HTTP server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 3030,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Outgoing HTTP settings shared by providers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// User agent sent with provider requests
    pub user_agent: String,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            user_agent: format!("ferret/{}", crate::VERSION),
            verify_ssl: true,
            proxies: ProxySettings::default(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    /// Proxy for all protocols
    pub all: Option<String>,
    /// HTTP proxy
    pub http: Option<String>,
    /// HTTPS proxy
    pub https: Option<String>,
}

/// Settings for the built-in providers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersSettings {
    pub github: GithubSettings,
}

/// GitHub code search provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSettings {
    /// Register the provider at startup
    pub enabled: bool,
    /// Hide the provider from the web UI
    pub no_ui: bool,
    /// API base URL, without a trailing slash
    pub url: String,
    /// Personal access token
    pub token: Option<String>,
    /// Restrict searches to this user's repositories
    pub search_user: Option<String>,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            no_ui: false,
            url: "https://api.github.com".to_string(),
            token: None,
            search_user: None,
        }
    }
}
