//! Turns an ordered frame sequence into one contiguous recognition buffer.
//!
//! The engine consumes mono 16-bit PCM at 16kHz. Sources that capture in a
//! different layout go through the documented conversion here: interleaved
//! multi-channel input is downmixed by channel average, then resampled with
//! linear interpolation. Both steps are deterministic.

use crate::audio::frame::{AudioBuffer, AudioFrame};
use crate::defaults;
use crate::error::{Result, VoxnoteError};

/// Sample layout of the frames a capture source delivers.
///
/// Samples are interleaved when `channels > 1`. Layouts this module cannot
/// decode (zero channels, zero rate, a sample count that is not a multiple
/// of the channel count) are rejected as unsupported, never guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for InputFormat {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            channels: defaults::CHANNELS,
        }
    }
}

impl InputFormat {
    /// Returns true when no conversion is needed.
    pub fn is_engine_native(&self) -> bool {
        self.sample_rate == defaults::SAMPLE_RATE && self.channels == defaults::CHANNELS
    }
}

/// Concatenates frames already in the engine layout (mono, 16kHz).
///
/// # Errors
/// Returns `VoxnoteError::NoAudio` when the sequence is empty or every frame
/// has zero samples. Callers gate transcription on this before the engine is
/// ever invoked.
pub fn materialize(frames: &[AudioFrame]) -> Result<AudioBuffer> {
    materialize_from(frames, InputFormat::default())
}

/// Concatenates frames in arrival order and converts to the engine layout.
///
/// # Errors
/// - `VoxnoteError::NoAudio` when there is nothing to concatenate.
/// - `VoxnoteError::UnsupportedFormat` when the declared layout cannot be
///   decoded.
pub fn materialize_from(frames: &[AudioFrame], format: InputFormat) -> Result<AudioBuffer> {
    let total: usize = frames.iter().map(|f| f.samples.len()).sum();
    if total == 0 {
        return Err(VoxnoteError::NoAudio);
    }

    let mut samples = Vec::with_capacity(total);
    for frame in frames {
        samples.extend_from_slice(&frame.samples);
    }

    let samples = convert_to_engine_format(samples, format)?;

    Ok(AudioBuffer {
        samples,
        sample_rate: defaults::SAMPLE_RATE,
    })
}

/// Converts interleaved samples in `format` to mono 16kHz.
///
/// Downmix averages across channels; resampling is linear interpolation.
pub fn convert_to_engine_format(samples: Vec<i16>, format: InputFormat) -> Result<Vec<i16>> {
    if format.channels == 0 {
        return Err(VoxnoteError::UnsupportedFormat {
            details: "0 channels".to_string(),
        });
    }
    if format.sample_rate == 0 {
        return Err(VoxnoteError::UnsupportedFormat {
            details: "0 Hz sample rate".to_string(),
        });
    }
    if samples.len() % format.channels as usize != 0 {
        return Err(VoxnoteError::UnsupportedFormat {
            details: format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                format.channels
            ),
        });
    }

    let mono = downmix(samples, format.channels);

    if format.sample_rate == defaults::SAMPLE_RATE {
        Ok(mono)
    } else {
        Ok(resample(&mono, format.sample_rate, defaults::SAMPLE_RATE))
    }
}

/// Mix interleaved multi-channel audio to mono by averaging channels.
fn downmix(samples: Vec<i16>, channels: u16) -> Vec<i16> {
    if channels == 1 {
        return samples;
    }

    let channels = channels as usize;
    samples
        .chunks_exact(channels)
        .map(|group| {
            let sum: i32 = group.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Simple linear interpolation resampling.
pub(crate) fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
