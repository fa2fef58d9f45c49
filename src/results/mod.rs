//! Result types for normalized search hits
//!
//! Providers hand back loosely-typed [`RawResult`] records; the search
//! orchestrator turns them into uniform [`Result`] values.

mod types;

pub use types::*;
