//! Error types for the chatbox.

use thiserror::Error;

/// Chatbox error type.
///
/// Only configuration, wiring and decoding can fail. Appending lines and
/// routing events never return errors: unknown entities are dropped and
/// rejected input is reported in the chat output itself.
#[derive(Error, Debug)]
pub enum ChatboxError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The configured history capacity cannot hold any line.
    #[error("Invalid history capacity: {0} (must be at least 1)")]
    InvalidCapacity(usize),

    /// An inbound event was not valid JSON for any known kind.
    #[error("Event decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type alias for chatbox operations.
pub type Result<T> = std::result::Result<T, ChatboxError>;
