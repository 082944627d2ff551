//! Error types for the console

use thiserror::Error;

/// Console-wide error type
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Control action '{action}' failed: {message}")]
    Action { action: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConsoleError {
    pub fn api(msg: impl Into<String>) -> Self {
        ConsoleError::Api(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        ConsoleError::Network(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        ConsoleError::Auth(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        ConsoleError::Parse(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ConsoleError::NotFound(msg.into())
    }

    pub fn action(action: impl Into<String>, message: impl Into<String>) -> Self {
        ConsoleError::Action {
            action: action.into(),
            message: message.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        ConsoleError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ConsoleError::Internal(msg.into())
    }
}

/// Result type alias for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;
