// ⚠️ Errors
// The extraction pipeline itself never fails. These cover loading keyword
// tables and scanner configuration.

use thiserror::Error;

/// Rejected keyword table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("keyword table '{0}' has no keywords")]
    Empty(String),

    #[error("keyword table '{table}' contains an entry that is blank after normalization")]
    EmptyEntry { table: String },

    #[error("keyword table '{table}' lists '{entry}' twice")]
    Duplicate { table: String, entry: String },

    #[error("priority keyword '{entry}' is not a keyword of table '{table}'")]
    UnknownPriority { table: String, entry: String },

    #[error("'{entry}' is both a keyword and a disqualifying keyword in table '{table}'")]
    Overlap { table: String, entry: String },

    #[error("unknown keyword locale: {0}")]
    UnknownLocale(String),
}

/// Failure while loading configuration or a keyword table file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Table(#[from] TableError),
}
