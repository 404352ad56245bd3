use crate::audio::frame::AudioBuffer;
use crate::defaults;
use crate::error::{Result, VoxnoteError};
use std::sync::Arc;
use std::time::Duration;

/// One engine-emitted unit of recognized text.
///
/// Segments arrive in emission order, which is assumed monotonic in time.
/// Offsets are relative to the start of the recognized buffer; engines that
/// do not report timings leave them as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    /// Recognized text, trimmed. May be empty.
    pub text: String,
    /// Start offset within the buffer, in milliseconds.
    pub start_ms: Option<u64>,
    /// End offset within the buffer, in milliseconds.
    pub end_ms: Option<u64>,
}

impl TranscriptSegment {
    /// Creates a segment carrying text only, without timing information.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start_ms: None,
            end_ms: None,
        }
    }
}

/// The engine's language hypothesis for one recognition invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageDetection {
    /// Language code (e.g., "en", "de").
    pub language: String,
    /// Confidence in [0, 1].
    pub probability: f32,
}

/// Everything one recognition invocation produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    /// Recognized segments in emission order.
    pub segments: Vec<TranscriptSegment>,
    /// Language hypothesis for the whole buffer (one per invocation).
    pub language: LanguageDetection,
}

/// Per-invocation decoding options.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizeOptions {
    /// Beam width for decoding; must be at least 1. Wider is more accurate
    /// and slower.
    pub beam_size: u32,
    /// Condition each segment's decoding on previously decoded text within
    /// the same buffer. Off by default: every invocation is treated as
    /// acoustically independent, so stale context from an unrelated
    /// recording cannot leak into the next one.
    pub condition_on_previous_text: bool,
    /// Force this language and skip auto-detection. `None` auto-detects.
    pub language: Option<String>,
}

impl Default for RecognizeOptions {
    fn default() -> Self {
        Self {
            beam_size: defaults::BEAM_SIZE,
            condition_on_previous_text: false,
            language: None,
        }
    }
}

/// Trait for speech recognition engines.
///
/// Implementations treat the underlying recognizer as a pure function over
/// the buffer: same buffer and options produce an equivalent segmentation.
/// This trait allows swapping implementations (real Whisper vs mock).
pub trait SpeechRecognizer: Send + Sync {
    /// Recognize a finite audio buffer.
    ///
    /// Blocking and potentially long-running (seconds). Callers must keep it
    /// off any audio-append path.
    ///
    /// # Errors
    /// Returns `VoxnoteError::Recognition` on any engine-level fault. The
    /// caller must not retry automatically; recognition is expensive.
    fn recognize(&self, buffer: &AudioBuffer, options: &RecognizeOptions) -> Result<Recognition>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;

    /// Check if the recognizer is ready
    fn is_ready(&self) -> bool;
}

/// Implement SpeechRecognizer for Arc<T> to allow sharing across sessions.
impl<T: SpeechRecognizer> SpeechRecognizer for Arc<T> {
    fn recognize(&self, buffer: &AudioBuffer, options: &RecognizeOptions) -> Result<Recognition> {
        (**self).recognize(buffer, options)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Mock recognizer for testing
#[derive(Debug, Clone)]
pub struct MockRecognizer {
    model_name: String,
    segments: Vec<TranscriptSegment>,
    language: LanguageDetection,
    should_fail: bool,
    delay: Option<Duration>,
}

impl MockRecognizer {
    /// Create a new mock recognizer with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            segments: vec![TranscriptSegment::text_only("mock transcription")],
            language: LanguageDetection {
                language: "en".to_string(),
                probability: 1.0,
            },
            should_fail: false,
            delay: None,
        }
    }

    /// Configure the mock to emit segments with the given texts
    pub fn with_segment_texts(mut self, texts: &[&str]) -> Self {
        self.segments = texts
            .iter()
            .map(|t| TranscriptSegment::text_only(*t))
            .collect();
        self
    }

    /// Configure the mock to emit specific segments
    pub fn with_segments(mut self, segments: Vec<TranscriptSegment>) -> Self {
        self.segments = segments;
        self
    }

    /// Configure the language detection the mock reports
    pub fn with_language(mut self, language: &str, probability: f32) -> Self {
        self.language = LanguageDetection {
            language: language.to_string(),
            probability,
        };
        self
    }

    /// Configure the mock to fail on recognize
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Configure the mock to sleep before responding (for in-flight tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl SpeechRecognizer for MockRecognizer {
    fn recognize(&self, _buffer: &AudioBuffer, options: &RecognizeOptions) -> Result<Recognition> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.should_fail {
            return Err(VoxnoteError::Recognition {
                message: "mock recognition failure".to_string(),
            });
        }
        let language = match &options.language {
            Some(forced) => LanguageDetection {
                language: forced.clone(),
                probability: 1.0,
            },
            None => self.language.clone(),
        };
        Ok(Recognition {
            segments: self.segments.clone(),
            language,
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}
