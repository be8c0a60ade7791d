//! Server error types

use crate::config::ConfigError;
use thiserror::Error;

/// Errors raised while starting or running the server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// A collaborator could not be constructed
    #[error("Startup failed: {0}")]
    Startup(String),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}
