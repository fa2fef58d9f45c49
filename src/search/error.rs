//! Search error taxonomy

use thiserror::Error;

/// Errors surfaced by a search.
///
/// Provider failures never escape raw; they are reclassified into one of
/// these variants at the dispatch boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("invalid search provider. Possible search providers are {}", format_names(.available))]
    InvalidProvider { available: Vec<String> },

    #[error("missing keyword")]
    MissingKeyword,

    #[error("invalid page #. It should be greater than 0")]
    InvalidPage,

    #[error("timeout")]
    Timeout,

    #[error("canceled")]
    Canceled,

    #[error("failed to search due to {0}")]
    BackendFailure(String),

    #[error("invalid result # to go. It should be between 1 and {max}")]
    InvalidGotoIndex { max: usize },

    #[error("failed to go to {link} due to {reason}. Check FERRET_GOTO_CMD environment variable")]
    GotoCommandFailed { link: String, reason: String },
}

impl SearchError {
    /// Status code recorded on the query for this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidProvider { .. } | Self::MissingKeyword | Self::InvalidPage => Some(400),
            Self::Timeout => Some(504),
            Self::Canceled | Self::BackendFailure(_) => Some(500),
            Self::InvalidGotoIndex { .. } | Self::GotoCommandFailed { .. } => None,
        }
    }
}

fn format_names(names: &[String]) -> String {
    format!("[{}]", names.join(" "))
}
