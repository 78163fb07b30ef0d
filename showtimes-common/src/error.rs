//! Common error types for the showtimes workspace

use thiserror::Error;

/// Common result type for showtimes operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the showtimes crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input (date expressions, times, theater names)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A raw listing start time did not match `H:MMam/pm`
    ///
    /// Indicates an upstream format change, so it is never swallowed.
    #[error("Invalid start time: {0:?}")]
    InvalidStartTime(String),

    /// No per-day schedules were available to aggregate
    #[error("Could not find any data for the requested date(s).")]
    EmptyInput,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
