//! Default configuration constants for voxnote.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Audio sample rate the recognition engine consumes, in Hz.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and computational efficiency for voice applications.
/// All materialized buffers are mono, 16-bit PCM at this rate.
pub const SAMPLE_RATE: u32 = 16000;

/// Channel count the recognition engine consumes.
///
/// Multi-channel input is downmixed to mono before recognition.
pub const CHANNELS: u16 = 1;

/// Default beam width for decoding.
///
/// Wider beams search more candidate decodings per step (more accurate,
/// slower). 5 is a common sweet spot for speech.
pub const BEAM_SIZE: u32 = 5;

/// Default Whisper model name.
///
/// "tiny" (multilingual) keeps first-run downloads small and transcribes a
/// few seconds of speech in well under a second on commodity CPUs.
pub const DEFAULT_MODEL: &str = "tiny";

/// Default language code for transcription.
///
/// "auto" lets the engine detect the spoken language automatically.
/// Set to a specific code (e.g., "en", "de") to force a language.
pub const DEFAULT_LANGUAGE: &str = "auto";

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";

/// Fixed filename for exported transcripts.
pub const EXPORT_FILENAME: &str = "recorded_audio_transcript.txt";

/// MIME type for exported transcripts.
pub const EXPORT_MIME: &str = "text/plain";

/// Capture chunk size in samples (100ms at 16kHz).
///
/// Finite sources (WAV files) are fed to the intake in chunks of this size so
/// live and recorded modes flow through the same path.
pub const CAPTURE_CHUNK_SAMPLES: usize = 1600;

/// Number of in-flight frames the intake channel buffers.
pub const INTAKE_CHANNEL_CAPACITY: usize = 1000;

/// Polling interval for the capture thread when no samples are available (ms).
pub const INTAKE_POLL_INTERVAL_MS: u64 = 10;

/// Report the GPU backend compiled into this build.
///
/// Returns a human-readable name based on the compile-time feature flags.
/// Only one GPU backend can be active at a time; if none is enabled, returns "CPU".
pub fn gpu_backend() -> &'static str {
    if cfg!(feature = "cuda") {
        "CUDA"
    } else if cfg!(feature = "vulkan") {
        "Vulkan"
    } else if cfg!(feature = "hipblas") {
        "HipBLAS (AMD)"
    } else if cfg!(feature = "openblas") {
        "OpenBLAS"
    } else {
        "CPU"
    }
}
