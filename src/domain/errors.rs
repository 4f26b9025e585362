//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Content source error: {0}")]
    Content(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Store error: {0}")]
    Store(String),

    /// Malformed send day / send time. Callers log and skip scheduling.
    #[error("Schedule error: {0}")]
    Schedule(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Bind or serve failure of the admin surface.
    #[error("Server error: {0}")]
    Server(String),
}
