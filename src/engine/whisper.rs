//! Whisper-based speech recognition.
//!
//! This module provides a Whisper implementation of the SpeechRecognizer
//! trait using whisper-rs.
//!
//! # Feature Gate
//!
//! This module requires the `whisper` feature to be enabled and cmake to be
//! installed. To build with Whisper support:
//!
//! ```bash
//! cargo build --features whisper
//! ```

use crate::audio::frame::AudioBuffer;
use crate::engine::recognizer::{Recognition, RecognizeOptions, SpeechRecognizer};
use crate::error::{Result, VoxnoteError};
use std::path::PathBuf;

#[cfg(feature = "whisper")]
use crate::engine::recognizer::{LanguageDetection, TranscriptSegment};
#[cfg(feature = "whisper")]
use std::sync::{Mutex, Once};
#[cfg(feature = "whisper")]
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, install_logging_hooks,
};

#[cfg(feature = "whisper")]
static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Configuration for the Whisper recognizer.
///
/// Decoding choices (beam width, language, conditioning) are per-invocation
/// options, not model configuration; see `RecognizeOptions`.
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// Path to the Whisper model file
    pub model_path: PathBuf,
    /// Number of threads for inference (None = auto-detect)
    pub threads: Option<usize>,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/ggml-tiny.bin"),
            threads: None,
        }
    }
}

/// Whisper-based recognizer implementation.
///
/// The WhisperContext is wrapped in a Mutex to ensure thread safety; each
/// invocation creates its own decoding state, so no text context survives
/// between invocations unless explicitly requested via options.
///
/// # Feature Gate
///
/// This type is only available when the `whisper` feature is enabled.
#[cfg(feature = "whisper")]
pub struct WhisperRecognizer {
    context: Mutex<WhisperContext>,
    config: WhisperConfig,
    model_name: String,
}

#[cfg(feature = "whisper")]
impl std::fmt::Debug for WhisperRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperRecognizer")
            .field("config", &self.config)
            .field("model_name", &self.model_name)
            .field("context", &"<WhisperContext>")
            .finish()
    }
}

/// Whisper-based recognizer placeholder (without whisper feature).
///
/// This is a stub implementation that returns errors when used.
/// Enable the `whisper` feature to use real recognition.
#[cfg(not(feature = "whisper"))]
#[derive(Debug)]
pub struct WhisperRecognizer {
    config: WhisperConfig,
    model_name: String,
}

fn model_name_from_path(path: &std::path::Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(feature = "whisper")]
impl WhisperRecognizer {
    /// Create a new Whisper recognizer.
    ///
    /// # Errors
    /// Returns `VoxnoteError::ModelNotFound` if the model file doesn't exist
    /// and `VoxnoteError::Recognition` if model loading fails.
    pub fn new(config: WhisperConfig) -> Result<Self> {
        // Install logging hooks to suppress whisper.cpp output (only once)
        LOGGING_HOOKS_INSTALLED.call_once(|| {
            install_logging_hooks();
        });

        if !config.model_path.exists() {
            return Err(VoxnoteError::ModelNotFound {
                path: config.model_path.to_string_lossy().to_string(),
            });
        }

        let model_name = model_name_from_path(&config.model_path);

        let mut context_params = WhisperContextParameters::default();
        // Enable flash attention: uses fused attention kernels that avoid the
        // standalone softmax CUDA kernel, which crashes on Blackwell GPUs
        // (sm_120) with ggml <= 1.7.6
        context_params.flash_attn(true);
        let context = WhisperContext::new_with_params(
            config
                .model_path
                .to_str()
                .ok_or_else(|| VoxnoteError::Recognition {
                    message: "Invalid UTF-8 in model path".to_string(),
                })?,
            context_params,
        )
        .map_err(|e| VoxnoteError::Recognition {
            message: format!("Failed to load Whisper model: {}", e),
        })?;

        Ok(Self {
            context: Mutex::new(context),
            config,
            model_name,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }

    /// Convert i16 audio samples to f32 normalized to [-1.0, 1.0]
    ///
    /// Whisper expects audio in f32 format normalized to the range [-1.0, 1.0].
    /// Input is 16-bit PCM audio where samples range from -32768 to 32767.
    fn convert_audio(samples: &[i16]) -> Vec<f32> {
        samples
            .iter()
            .map(|&sample| sample as f32 / 32768.0)
            .collect()
    }
}

#[cfg(not(feature = "whisper"))]
impl WhisperRecognizer {
    /// Create a new Whisper recognizer (stub implementation).
    ///
    /// This returns an error indicating that the whisper feature is not enabled.
    pub fn new(config: WhisperConfig) -> Result<Self> {
        if !config.model_path.exists() {
            return Err(VoxnoteError::ModelNotFound {
                path: config.model_path.to_string_lossy().to_string(),
            });
        }

        let model_name = model_name_from_path(&config.model_path);

        Ok(Self { config, model_name })
    }

    /// Get the configuration
    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }

    /// Convert i16 audio samples to f32 normalized to [-1.0, 1.0]
    ///
    /// This function is available even without the whisper feature for testing.
    pub fn convert_audio(samples: &[i16]) -> Vec<f32> {
        samples
            .iter()
            .map(|&sample| sample as f32 / 32768.0)
            .collect()
    }
}

#[cfg(feature = "whisper")]
impl SpeechRecognizer for WhisperRecognizer {
    fn recognize(&self, buffer: &AudioBuffer, options: &RecognizeOptions) -> Result<Recognition> {
        if options.beam_size == 0 {
            return Err(VoxnoteError::Recognition {
                message: "beam size must be at least 1".to_string(),
            });
        }

        let audio_f32 = Self::convert_audio(&buffer.samples);

        let context = self.context.lock().map_err(|e| VoxnoteError::Recognition {
            message: format!("Failed to acquire context lock: {}", e),
        })?;

        // A fresh state per invocation keeps invocations acoustically independent
        let mut state = context
            .create_state()
            .map_err(|e| VoxnoteError::Recognition {
                message: format!("Failed to create Whisper state: {}", e),
            })?;

        let strategy = if options.beam_size == 1 {
            SamplingStrategy::Greedy { best_of: 1 }
        } else {
            SamplingStrategy::BeamSearch {
                beam_size: options.beam_size as i32,
                patience: -1.0,
            }
        };
        let mut params = FullParams::new(strategy);

        match options.language.as_deref() {
            Some(code) => params.set_language(Some(code)),
            None => params.set_language(None),
        }

        params.set_no_context(!options.condition_on_previous_text);

        if let Some(threads) = self.config.threads {
            params.set_n_threads(threads as i32);
        }

        // Disable printing to stdout/stderr
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        let started = std::time::Instant::now();
        state
            .full(params, &audio_f32)
            .map_err(|e| VoxnoteError::Recognition {
                message: format!("Whisper inference failed: {}", e),
            })?;
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            buffer_ms = buffer.duration_ms(),
            "whisper inference complete"
        );

        // Extract segments with their timings. Whisper reports timestamps in
        // centiseconds relative to the buffer start.
        let mut segments = Vec::new();
        let mut speech_confidence_sum = 0.0_f32;
        for segment in state.as_iter() {
            let text = segment.to_string().trim().to_string();
            let start_ms = (segment.start_timestamp().max(0) as u64) * 10;
            let end_ms = (segment.end_timestamp().max(0) as u64) * 10;
            speech_confidence_sum += 1.0 - segment.no_speech_probability();
            segments.push(TranscriptSegment {
                text,
                start_ms: Some(start_ms),
                end_ms: Some(end_ms),
            });
        }

        let language = match options.language.as_deref() {
            Some(forced) => LanguageDetection {
                language: forced.to_string(),
                probability: 1.0,
            },
            None => {
                let lang_id = state.full_lang_id_from_state();
                let language = whisper_rs::get_lang_str(lang_id).unwrap_or("").to_string();
                // whisper.cpp exposes no per-language probability after a full
                // decode; the mean speech confidence over segments is the
                // closest available signal.
                let probability = if segments.is_empty() {
                    0.0
                } else {
                    (speech_confidence_sum / segments.len() as f32).clamp(0.0, 1.0)
                };
                LanguageDetection {
                    language,
                    probability,
                }
            }
        };

        Ok(Recognition { segments, language })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        // The recognizer is ready if we successfully created it
        true
    }
}

#[cfg(not(feature = "whisper"))]
impl SpeechRecognizer for WhisperRecognizer {
    fn recognize(&self, _buffer: &AudioBuffer, _options: &RecognizeOptions) -> Result<Recognition> {
        Err(VoxnoteError::Recognition {
            message: concat!(
                "Whisper feature not enabled. This binary was built without speech recognition.\n",
                "To fix: cargo build --release (whisper is enabled by default)\n",
                "If build fails with cmake errors, install: sudo apt install cmake"
            )
            .to_string(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        false
    }
}
