//! Frame and buffer types for the audio intake path.

use std::time::Instant;

/// One arrival-ordered chunk of raw audio samples from a capture source.
///
/// Frames are immutable once appended to an aggregator. A frame with zero
/// samples is legal; it contributes nothing when the buffer is materialized.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Sequence number for ordering frames.
    pub sequence: u64,
    /// Timestamp when the audio was captured.
    pub timestamp: Instant,
    /// Audio samples as 16-bit PCM (interleaved if multi-channel).
    pub samples: Vec<i16>,
}

impl AudioFrame {
    /// Creates a new audio frame.
    pub fn new(sequence: u64, samples: Vec<i16>) -> Self {
        Self {
            sequence,
            timestamp: Instant::now(),
            samples,
        }
    }

    /// Returns the duration of this frame in milliseconds.
    pub fn duration_ms(&self, sample_rate: u32) -> u32 {
        (self.samples.len() as u32 * 1000) / sample_rate
    }
}

/// A materialized, contiguous audio payload ready for recognition.
///
/// Always mono 16-bit PCM at the engine sample rate. Created on demand from
/// an aggregator snapshot; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Contiguous mono samples in arrival order.
    pub samples: Vec<i16>,
    /// Sample rate of `samples` in Hz.
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Returns the number of samples in the buffer.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the duration of the buffer in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        (self.samples.len() as u64 * 1000) / self.sample_rate as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_frame_creation() {
        let samples = vec![100i16, 200, 300];
        let frame = AudioFrame::new(42, samples.clone());

        assert_eq!(frame.sequence, 42);
        assert_eq!(frame.samples, samples);
    }

    #[test]
    fn test_audio_frame_duration() {
        let samples = vec![0i16; 16000]; // 1 second at 16kHz
        let frame = AudioFrame::new(0, samples);

        assert_eq!(frame.duration_ms(16000), 1000);
    }

    #[test]
    fn test_empty_frame_is_legal() {
        let frame = AudioFrame::new(7, Vec::new());
        assert_eq!(frame.samples.len(), 0);
        assert_eq!(frame.duration_ms(16000), 0);
    }

    #[test]
    fn test_audio_buffer_duration() {
        let buffer = AudioBuffer {
            samples: vec![0i16; 8000],
            sample_rate: 16000,
        };
        assert_eq!(buffer.duration_ms(), 500);
        assert_eq!(buffer.len(), 8000);
        assert!(!buffer.is_empty());
    }

    #[test]
    fn test_audio_buffer_empty() {
        let buffer = AudioBuffer {
            samples: Vec::new(),
            sample_rate: 16000,
        };
        assert!(buffer.is_empty());
        assert_eq!(buffer.duration_ms(), 0);
    }
}
