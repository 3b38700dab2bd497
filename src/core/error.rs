use std::io;

use thiserror::Error;

/// Failure reported by a single bus subscriber.
///
/// The bus logs and counts these per handler; one failing subscriber never
/// prevents the others from receiving the same event.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The component behind the handler was already borrowed, which happens
    /// when a handler emits back onto the bus while it is being updated.
    #[error("{0} is busy (re-entrant emission)")]
    Busy(&'static str),
    #[error("handler rejected event: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access settings file: {0}")]
    Io(#[from] io::Error),
    #[error("malformed settings file: {0}")]
    Parse(#[from] serde_json::Error),
}
