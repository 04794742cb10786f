use std::path::PathBuf;

use thiserror::Error;

use crate::query::QueryType;

/// Convenient result alias for the galnav library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a system name could not be found in the catalogue.
    #[error("unknown system name: {name}{}", format_suggestions(.suggestions))]
    UnknownSystem {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when a second resolver is registered for a query type.
    #[error("a resolver is already registered for query type {query}")]
    DuplicateResolver { query: QueryType },

    /// Raised when no resolver exists for the requested query type.
    #[error("no resolver registered for query type {query}")]
    ResolverMissing { query: QueryType },

    /// Raised when a query type string does not name a supported query.
    #[error("unsupported query type: {value}")]
    InvalidQueryType { value: String },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for navigation config")]
    ConfigPathUnavailable,

    /// Raised by a resolver when its inputs are malformed.
    #[error("{query} resolver failed: {message}")]
    Resolver { query: QueryType, message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON (de)serialization errors.
    #[error("failed to parse {}: {source}", .path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "JSON input".to_string()))]
    Json {
        path: Option<PathBuf>,
        #[source]
        source: serde_json::Error,
    },
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Error::Json { path: None, source }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
