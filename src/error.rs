//! Error types for the parlotte assistant

use thiserror::Error;

/// Result type alias for parlotte operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the parlotte assistant
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Content file error (missing file, missing wake key)
    #[error("content error: {0}")]
    Content(String),

    /// Audio capture error
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech recognition error
    #[error("recognizer error: {0}")]
    Recognizer(String),

    /// Speech synthesis error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Media playback error (player launch failure)
    #[error("playback error: {0}")]
    Playback(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
