use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    /// The path (and every ancestor) is outside any working copy
    #[error("Not a git repository: {path}")]
    RepositoryNotFound { path: String },

    #[error("Invalid date range: {reason}")]
    InvalidDateRange { reason: String },

    #[error("Unsupported export format: {format}")]
    UnsupportedExportFormat { format: String },

    /// Only ever logged; the commit still counts with zero line stats
    #[error("Diff unavailable for commit {hash}: {source}")]
    DiffUnavailable {
        hash: String,
        #[source]
        source: git2::Error,
    },

    /// Only ever logged; the author filter is dropped instead
    #[error("Could not resolve configured user name: {0}")]
    AuthorResolutionFailed(#[source] git2::Error),

    #[error("Invalid ticket pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<fancy_regex::Error>,
    },

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    pub(crate) fn invalid_range(reason: impl Into<String>) -> Self {
        ReportError::InvalidDateRange {
            reason: reason.into(),
        }
    }
}
