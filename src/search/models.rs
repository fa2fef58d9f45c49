//! Search query and related data models

use crate::results::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where a query is in its lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryState {
    #[default]
    Created,
    /// Rejected before any provider call
    Invalid,
    Validated,
    Dispatched,
    Completed,
    TimedOut,
    Canceled,
    BackendFailed,
    /// A result link was handed to the opener
    GotoResolved,
    GotoFailed,
}

/// One search request plus its accumulated outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Provider name
    pub provider: String,
    /// Search text
    pub keyword: String,
    /// Page number (1-indexed)
    pub page: i64,
    /// Result to open (1-indexed), 0 for none
    pub goto_index: usize,
    /// Maximum duration of the provider call
    pub timeout: Duration,
    /// When the provider call started
    pub start: Option<DateTime<Utc>>,
    /// How long the provider call took
    pub elapsed: Option<Duration>,
    /// Status code of a failed query
    pub http_status: Option<u16>,
    /// Normalized results, in provider order
    pub results: Vec<Result>,
    /// Lifecycle state
    pub state: QueryState,
}

impl Query {
    /// Create a query for page 1 with the default timeout
    pub fn new(provider: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            keyword: keyword.into(),
            page: 1,
            goto_index: 0,
            timeout: crate::config::DEFAULT_TIMEOUT,
            start: None,
            elapsed: None,
            http_status: None,
            results: Vec::new(),
            state: QueryState::Created,
        }
    }

    /// Set page number
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    /// Set the result to open after searching
    pub fn with_goto(mut self, index: usize) -> Self {
        self.goto_index = index;
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Elapsed time in whole milliseconds, 0 when not recorded
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.map(|d| d.as_millis()).unwrap_or(0)
    }
}

/// Successful end of a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Results are ready to be displayed
    Results,
    /// The given link was opened instead of displaying results
    Opened { link: String },
}
