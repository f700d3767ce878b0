//! Error taxonomy.
//!
//! Configuration errors are fatal at load time; structural input errors are
//! fatal for the parse call that hit them. Everything else is a warning on
//! the diagnostic sink and the run continues.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration (unknown comparator, bad config file).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Malformed doclet input, e.g. a dotted parameter with no preceding
    /// structural root or an enum doclet without the enum flag.
    #[error("malformed doclet input: {0}")]
    Structure(String),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}
