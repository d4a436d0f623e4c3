//! Extraction-layer error types.

use thiserror::Error;
use valtab_core::SourceCategory;

/// Errors raised while building the registry or discovering sources.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A built-in pattern failed to compile.
    #[error("invalid {name} pattern: {source}")]
    Pattern {
        /// Which pattern (e.g. `annual link shape`).
        name: &'static str,
        /// Underlying regex error.
        source: regex::Error,
    },

    /// A required category had no candidate links on the index page.
    #[error("mandatory source not found: no {category} document link on the index page")]
    MandatorySourceNotFound {
        /// The category designated as required.
        category: SourceCategory,
    },

    /// The configured base URL cannot be parsed.
    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        /// The configured value.
        url: String,
        /// Underlying parse error.
        source: url::ParseError,
    },
}

/// Convenience alias for extraction results.
pub type ExtractResult<T> = Result<T, ExtractError>;
