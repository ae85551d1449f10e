use std::path::PathBuf;
use thiserror::Error;

/// Rejected filter/sort input coming from the command line or the browse screen.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown work type '{0}' (expected remote, hybrid or on-site)")]
    WorkType(String),
    #[error("unknown status '{0}' (expected applied, interview, rejected or offer)")]
    Status(String),
    #[error("unknown sort key '{0}' (expected date, company or status)")]
    SortKey(String),
    #[error("unknown sort direction '{0}' (expected asc or desc)")]
    SortDirection(String),
    #[error("'{0}' is not a date (expected YYYY-MM-DD)")]
    Date(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("application '{0}' already exists")]
    DuplicateId(String),
    #[error("application '{0}' not found")]
    NotFound(String),
    #[error("{0} must not be empty")]
    BlankField(&'static str),
    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a valid application snapshot")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JOBTRACKR_PAGE_SIZE must be a positive integer, got '{0}'")]
    InvalidPageSize(String),
}
