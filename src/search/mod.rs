//! Search orchestration module
//!
//! Validates a query, dispatches it to the named provider under a deadline,
//! normalizes the results and optionally opens one of them.

mod error;
mod executor;
mod models;
mod opener;

pub use error::SearchError;
pub use executor::Search;
pub use models::*;
pub use opener::{CommandOpener, Opener};
