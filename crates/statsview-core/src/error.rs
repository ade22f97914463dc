//! Error types shared across the statsview crates.

use thiserror::Error;

/// A configuration that cannot be served.
///
/// Raised by [`Config::validate`](crate::config::Config::validate) before the
/// server starts. None of these are recoverable at runtime.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("sampling interval must be at least 1ms")]
    InvalidInterval,

    #[error("max points must be greater than zero")]
    InvalidMaxPoints,

    #[error("{0} address must not be empty")]
    EmptyAddr(&'static str),

    #[error("invalid time format {0:?}")]
    TimeFormat(String),

    #[error("invalid pull template: {0}")]
    Template(String),
}

/// Failure while reading runtime statistics for a refresh.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("reading {path}: {source}")]
    Io {
        path: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {0}")]
    Parse(&'static str),

    #[error("stats probe did not finish within one interval")]
    Timeout,

    #[error("stats probe task failed: {0}")]
    Join(String),
}

/// Misuse of the sampling scheduler lifecycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("sampling scheduler already started")]
    AlreadyStarted,
}
