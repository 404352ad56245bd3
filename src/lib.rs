//! voxnote - incremental voice-to-text transcription
//!
//! Captures spoken audio (live microphone or a finished recording), runs it
//! through a speech-to-text engine on demand, and accumulates the recognized
//! text as a growing, exportable session transcript.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

#[cfg(all(feature = "cpal-audio", feature = "model-download", feature = "cli"))]
pub mod app;
pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
#[cfg(feature = "model-download")]
pub mod models;
pub mod session;
pub mod transcript;

// Core traits (capture → session → recognition)
pub use audio::recorder::AudioSource;
pub use engine::recognizer::SpeechRecognizer;

// Session orchestration
pub use session::intake::{CaptureIntake, IntakeHandle};
pub use session::{CycleReport, Session, SessionController, SessionState};

// Data model
pub use audio::aggregator::FrameAggregator;
pub use audio::frame::{AudioBuffer, AudioFrame};
pub use engine::recognizer::{LanguageDetection, Recognition, RecognizeOptions, TranscriptSegment};
pub use transcript::accumulator::TranscriptAccumulator;
pub use transcript::export::TranscriptExport;

// Error handling
pub use error::{Result, VoxnoteError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `<version>+<hash>` when built inside a git checkout, plain
/// `<version>` otherwise.
pub fn version_string() -> String {
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", env!("CARGO_PKG_VERSION"), hash),
        _ => env!("CARGO_PKG_VERSION").to_string(),
    }
}
