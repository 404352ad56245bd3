//! Error types for voxnote.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoxnoteError {
    // Session / transcription cycle errors
    #[error("No audio to transcribe")]
    NoAudio,

    #[error("A transcription cycle is already in flight")]
    TranscribeBusy,

    #[error("Recognition failed: {message}")]
    Recognition { message: String },

    #[error("Unsupported audio format: {details}")]
    UnsupportedFormat { details: String },

    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio capture errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Model errors
    #[error("Recognition model not found at {path}")]
    ModelNotFound { path: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, VoxnoteError>;

impl VoxnoteError {
    /// True for errors the user can recover from within the same session
    /// (record more audio, retry the cycle). Format and config errors are not
    /// retryable without changing the setup.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            VoxnoteError::NoAudio | VoxnoteError::TranscribeBusy | VoxnoteError::Recognition { .. }
        )
    }
}
