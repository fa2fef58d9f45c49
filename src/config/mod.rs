//! Configuration module for Ferret
//!
//! Handles loading settings from YAML files and environment variables, and
//! parsing the loosely-typed values users pass on the command line.

mod settings;

pub use settings::*;

use std::time::Duration;

/// Timeout used when none is configured or the configured one is malformed
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Platform opener used when no goto command is configured
pub fn default_goto_command() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    }
}

/// Parse a page number; anything that isn't a positive integer means page 1
pub fn parse_page(page: &str) -> i64 {
    match page.trim().parse::<i64>() {
        Ok(p) if p > 0 => p,
        _ => 1,
    }
}

/// Parse a goto index; anything that isn't a positive integer means no goto
pub fn parse_goto(goto: &str) -> usize {
    goto.trim().parse::<usize>().unwrap_or(0)
}

/// Parse a timeout string such as `5000ms` or `2s`.
///
/// An empty value uses `default`; a malformed one uses [`DEFAULT_TIMEOUT`].
pub fn parse_timeout(timeout: &str, default: Duration) -> Duration {
    if timeout.trim().is_empty() {
        default
    } else {
        parse_duration_or_default(timeout)
    }
}

pub(crate) fn parse_duration_or_default(value: &str) -> Duration {
    humantime::parse_duration(value.trim()).unwrap_or(DEFAULT_TIMEOUT)
}
