//! CLI command implementations.

pub mod auth;
pub mod orders;

use thiserror::Error;

/// Errors a CLI command can exit with.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] terra_console::ConfigError),

    /// A console operation failed.
    #[error(transparent)]
    Api(#[from] terra_console::ApiError),

    /// The backend rejected the credentials.
    #[error("Authentication rejected: {0}")]
    Auth(String),

    /// A command argument did not parse.
    #[error("{0}")]
    Input(String),
}
