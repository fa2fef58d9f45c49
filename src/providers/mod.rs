//! Search provider module
//!
//! Defines the Searcher capability and the registry that holds every
//! provider known to the process.

mod loader;
mod registry;
mod traits;

// Provider implementations
pub mod github;

pub use loader::ProviderLoader;
pub use registry::{Provider, ProviderRegistration, ProviderRegistry, RegistryError};
pub use traits::*;
