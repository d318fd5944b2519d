//! Error types for RSS ingest.

use thiserror::Error;

/// Errors raised while fetching or parsing a feed.
#[derive(Debug, Error)]
pub enum RssError {
    /// The feed could not be fetched over HTTP.
    #[error("failed to fetch feed {url}")]
    Fetch {
        /// The feed URL that failed.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The feed body was not well-formed XML.
    #[error("failed to parse feed {url} as XML")]
    Xml {
        /// The feed URL that failed.
        url: String,
        /// Underlying parse error.
        #[source]
        source: quick_xml::Error,
    },
    /// A filter rule's regex pattern failed to compile.
    #[error("invalid filter pattern {pattern}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}

/// Convenience alias for RSS ingest results.
pub type RssResult<T> = Result<T, RssError>;
