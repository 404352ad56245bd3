use crate::audio::materializer::InputFormat;
use crate::error::{Result, VoxnoteError};

/// Trait for audio source devices.
///
/// This trait allows swapping implementations (real audio device vs mock).
pub trait AudioSource: Send + Sync {
    /// Start capturing audio from the source.
    ///
    /// # Returns
    /// Ok(()) if the source started successfully, or an error
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio from the source.
    ///
    /// # Returns
    /// Ok(()) if the source stopped successfully, or an error
    fn stop(&mut self) -> Result<()>;

    /// Read audio samples from the source.
    ///
    /// Returns the samples accumulated since the last read, in the layout
    /// reported by [`AudioSource::format`]. An empty vector means no samples
    /// are available right now (live source) or the source is exhausted
    /// (finite source).
    fn read_samples(&mut self) -> Result<Vec<i16>>;

    /// Sample layout this source delivers.
    ///
    /// Defaults to the engine convention (mono, 16kHz).
    fn format(&self) -> InputFormat {
        InputFormat::default()
    }

    /// True for sources with a fixed amount of audio (files); false for
    /// live sources that produce until stopped.
    fn is_finite(&self) -> bool {
        false
    }
}

/// Mock audio source for testing
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    is_started: bool,
    samples: Vec<i16>,
    reads_remaining: Option<usize>,
    should_fail_start: bool,
    should_fail_stop: bool,
    should_fail_read: bool,
    error_message: String,
}

impl MockAudioSource {
    /// Create a new mock audio source with default settings
    pub fn new() -> Self {
        Self {
            is_started: false,
            samples: vec![0i16; 160],
            reads_remaining: None,
            should_fail_start: false,
            should_fail_stop: false,
            should_fail_read: false,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Configure the mock to return specific samples
    pub fn with_samples(mut self, samples: Vec<i16>) -> Self {
        self.samples = samples;
        self
    }

    /// Configure the mock to act as a finite source that is exhausted after
    /// `reads` non-empty reads.
    pub fn with_finite_reads(mut self, reads: usize) -> Self {
        self.reads_remaining = Some(reads);
        self
    }

    /// Configure the mock to fail on start
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail on stop
    pub fn with_stop_failure(mut self) -> Self {
        self.should_fail_stop = true;
        self
    }

    /// Configure the mock to fail on read
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Check if the audio source is started
    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            Err(VoxnoteError::AudioCapture {
                message: self.error_message.clone(),
            })
        } else {
            self.is_started = true;
            Ok(())
        }
    }

    fn stop(&mut self) -> Result<()> {
        if self.should_fail_stop {
            Err(VoxnoteError::AudioCapture {
                message: self.error_message.clone(),
            })
        } else {
            self.is_started = false;
            Ok(())
        }
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.should_fail_read {
            return Err(VoxnoteError::AudioCapture {
                message: self.error_message.clone(),
            });
        }
        match self.reads_remaining {
            Some(0) => Ok(Vec::new()),
            Some(ref mut n) => {
                *n -= 1;
                Ok(self.samples.clone())
            }
            None => Ok(self.samples.clone()),
        }
    }

    fn is_finite(&self) -> bool {
        self.reads_remaining.is_some()
    }
}
