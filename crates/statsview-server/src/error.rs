use statsview_core::{ConfigError, SchedulerError};
use thiserror::Error;

/// Failure to start or run the dashboard server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("binding {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("http server: {0}")]
    Serve(#[from] std::io::Error),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}
