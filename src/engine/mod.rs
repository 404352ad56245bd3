//! Speech recognition engine adapter.

pub mod recognizer;
pub mod whisper;
