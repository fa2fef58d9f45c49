//! Ferret: a search dispatcher for pluggable search providers
//!
//! A query names one registered provider; Ferret validates it, runs the
//! provider under a deadline, normalizes what comes back and can open one of
//! the results with an external command.

pub mod config;
pub mod network;
pub mod output;
pub mod providers;
pub mod results;
pub mod search;
pub mod web;

pub use config::Settings;
pub use providers::{ProviderRegistration, ProviderRegistry, Searcher};
pub use results::{RawResult, Result as SearchResult};
pub use search::{Outcome, Query, Search, SearchError};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
