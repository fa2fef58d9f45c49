//! Provider traits and types

use crate::results::RawResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Longest deadline a context will carry; larger timeouts are clamped to it
pub const MAX_TIMEOUT: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

/// Deadline `timeout` after `start`, clamped to [`MAX_TIMEOUT`]
pub fn deadline_after(start: Instant, timeout: Duration) -> Instant {
    let timeout = timeout.min(MAX_TIMEOUT);
    start
        .checked_add(timeout)
        .unwrap_or_else(|| start + Duration::from_secs(60 * 60 * 24))
}

/// Arguments handed to a provider for one search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchArgs {
    /// Page number (1-indexed)
    pub page: i64,
    /// Search text
    pub keyword: String,
}

impl SearchArgs {
    /// Create new search arguments
    pub fn new(keyword: impl Into<String>, page: i64) -> Self {
        Self {
            page,
            keyword: keyword.into(),
        }
    }
}

/// Cancellable, deadline-bound execution context for a provider call.
///
/// The orchestrator cancels the token as soon as the call is abandoned,
/// whichever way the dispatch ends.
#[derive(Debug, Clone)]
pub struct SearchContext {
    token: CancellationToken,
    deadline: Instant,
}

impl SearchContext {
    /// Create a context that expires at `deadline`
    pub fn new(token: CancellationToken, deadline: Instant) -> Self {
        Self { token, deadline }
    }

    /// Create a context that expires `timeout` from now
    pub fn with_timeout(token: CancellationToken, timeout: Duration) -> Self {
        Self::new(token, deadline_after(Instant::now(), timeout))
    }

    /// Instant at which the call is considered timed out
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the deadline
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Whether the deadline has passed
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Whether the call was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the call is cancelled or the deadline passes
    pub async fn done(&self) {
        tokio::select! {
            _ = self.token.cancelled() => {}
            _ = tokio::time::sleep_until(self.deadline) => {}
        }
    }

    /// Token backing this context
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// The search capability every provider must implement
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Run a search and return raw records in the provider's own order.
    ///
    /// Implementations should return promptly once `ctx` is done.
    async fn search(&self, ctx: &SearchContext, args: &SearchArgs)
        -> anyhow::Result<Vec<RawResult>>;
}
