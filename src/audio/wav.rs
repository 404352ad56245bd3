//! WAV decoding for recorded mode.
//!
//! A finished recording arrives as one complete WAV blob. Decoding converts
//! it to the engine layout (mono, 16kHz) up front, then the source replays it
//! in capture-sized chunks so recorded and live audio flow through the same
//! intake path.

use crate::audio::materializer::{InputFormat, convert_to_engine_format};
use crate::audio::recorder::AudioSource;
use crate::defaults;
use crate::error::{Result, VoxnoteError};
use std::io::Read;

/// Decode a WAV stream to mono 16kHz 16-bit PCM.
///
/// # Errors
/// - `VoxnoteError::AudioCapture` when the container is not parseable as WAV.
/// - `VoxnoteError::UnsupportedFormat` when the sample encoding cannot be
///   read as 16-bit integers or the declared channel layout is undecodable.
pub fn decode_wav(reader: Box<dyn Read + Send>) -> Result<Vec<i16>> {
    let mut wav_reader = hound::WavReader::new(reader).map_err(|e| VoxnoteError::AudioCapture {
        message: format!("Failed to parse WAV file: {}", e),
    })?;

    let spec = wav_reader.spec();
    let format = InputFormat {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    };

    let raw_samples: Vec<i16> = wav_reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| VoxnoteError::UnsupportedFormat {
            details: format!("WAV samples are not readable as 16-bit PCM: {}", e),
        })?;

    convert_to_engine_format(raw_samples, format)
}

/// Audio source that replays decoded WAV data in capture-sized chunks.
pub struct WavAudioSource {
    samples: Vec<i16>,
    position: usize,
    chunk_size: usize,
}

impl WavAudioSource {
    /// Create from any reader (for testing/flexibility).
    pub fn from_reader(reader: Box<dyn Read + Send>) -> Result<Self> {
        Ok(Self {
            samples: decode_wav(reader)?,
            position: 0,
            chunk_size: defaults::CAPTURE_CHUNK_SAMPLES,
        })
    }

    /// Create from stdin.
    pub fn from_stdin() -> Result<Self> {
        use std::io::Cursor;

        // Read all data from stdin into memory first (StdinLock is not Send)
        let mut buffer = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut buffer)
            .map_err(|e| VoxnoteError::AudioCapture {
                message: format!("Failed to read from stdin: {}", e),
            })?;

        Self::from_reader(Box::new(Cursor::new(buffer)))
    }

    /// Consume the source and return all samples as a single buffer.
    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }

    /// Total duration of the decoded audio in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        (self.samples.len() as u64 * 1000) / defaults::SAMPLE_RATE as u64
    }
}

impl AudioSource for WavAudioSource {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.position >= self.samples.len() {
            return Ok(Vec::new());
        }

        let end = std::cmp::min(self.position + self.chunk_size, self.samples.len());
        let chunk = self.samples[self.position..end].to_vec();
        self.position = end;

        Ok(chunk)
    }

    fn is_finite(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn make_wav_data(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn from_reader_16khz_mono_matches_exactly() {
        let input_samples = vec![100i16, 200, 300, 400, 500];
        let wav_data = make_wav_data(16000, 1, &input_samples);

        let source = WavAudioSource::from_reader(Box::new(Cursor::new(wav_data))).unwrap();

        assert_eq!(source.samples, input_samples);
        assert_eq!(source.position, 0);
        assert_eq!(source.chunk_size, 1600);
    }

    #[test]
    fn from_reader_16khz_stereo_downmixes_to_mono() {
        // Stereo pairs: (100, 200), (300, 400), (500, 600)
        let stereo_samples = vec![100i16, 200, 300, 400, 500, 600];
        let wav_data = make_wav_data(16000, 2, &stereo_samples);

        let source = WavAudioSource::from_reader(Box::new(Cursor::new(wav_data))).unwrap();

        assert_eq!(source.samples, vec![150i16, 350, 550]);
    }

    #[test]
    fn from_reader_48khz_mono_resamples_to_16khz() {
        let input_samples = vec![0i16; 48000]; // 1 second at 48kHz
        let wav_data = make_wav_data(48000, 1, &input_samples);

        let source = WavAudioSource::from_reader(Box::new(Cursor::new(wav_data))).unwrap();

        assert!(source.samples.len() >= 15900 && source.samples.len() <= 16100);
    }

    #[test]
    fn from_reader_44100hz_mono_resamples_correctly() {
        let input_samples = vec![1000i16; 44100]; // 1 second at 44.1kHz
        let wav_data = make_wav_data(44100, 1, &input_samples);

        let source = WavAudioSource::from_reader(Box::new(Cursor::new(wav_data))).unwrap();

        assert!(source.samples.len() >= 15900 && source.samples.len() <= 16100);
        assert!(source.samples.iter().all(|&s| (900..=1100).contains(&s)));
    }

    #[test]
    fn read_samples_returns_chunks_of_correct_size() {
        let input_samples = vec![1i16; 5000];
        let wav_data = make_wav_data(16000, 1, &input_samples);

        let mut source = WavAudioSource::from_reader(Box::new(Cursor::new(wav_data))).unwrap();

        assert_eq!(source.read_samples().unwrap().len(), 1600);
        assert_eq!(source.read_samples().unwrap().len(), 1600);
        assert_eq!(source.read_samples().unwrap().len(), 1600);
        // 5000 - 3*1600 = 200 samples remain
        assert_eq!(source.read_samples().unwrap().len(), 200);
    }

    #[test]
    fn read_samples_returns_empty_vec_at_eof() {
        let input_samples = vec![1i16; 100];
        let wav_data = make_wav_data(16000, 1, &input_samples);

        let mut source = WavAudioSource::from_reader(Box::new(Cursor::new(wav_data))).unwrap();

        assert_eq!(source.read_samples().unwrap().len(), 100);
        assert_eq!(source.read_samples().unwrap().len(), 0);
        assert_eq!(source.read_samples().unwrap().len(), 0);
    }

    #[test]
    fn wav_source_is_finite() {
        let wav_data = make_wav_data(16000, 1, &[1i16; 10]);
        let source = WavAudioSource::from_reader(Box::new(Cursor::new(wav_data))).unwrap();
        assert!(source.is_finite());
    }

    #[test]
    fn duration_reflects_decoded_length() {
        let wav_data = make_wav_data(16000, 1, &vec![0i16; 8000]);
        let source = WavAudioSource::from_reader(Box::new(Cursor::new(wav_data))).unwrap();
        assert_eq!(source.duration_ms(), 500);
    }

    #[test]
    fn invalid_wav_data_returns_error() {
        let invalid_data = vec![0u8, 1, 2, 3, 4, 5];

        let result = WavAudioSource::from_reader(Box::new(Cursor::new(invalid_data)));

        assert!(result.is_err());
        match result {
            Err(VoxnoteError::AudioCapture { message }) => {
                assert!(message.contains("Failed to parse WAV file"));
            }
            _ => panic!("Expected AudioCapture error"),
        }
    }

    #[test]
    fn empty_wav_data_returns_error() {
        let result = WavAudioSource::from_reader(Box::new(Cursor::new(Vec::new())));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_wav_missing_riff_header() {
        let bad_data = b"XXXX\x00\x00\x00\x00WAVEfmt ";
        let result = WavAudioSource::from_reader(Box::new(Cursor::new(bad_data.to_vec())));

        assert!(result.is_err(), "Should reject WAV without RIFF header");
    }

    #[test]
    fn malformed_wav_truncated_header() {
        let truncated = b"RIFF\x00\x00";
        let result = WavAudioSource::from_reader(Box::new(Cursor::new(truncated.to_vec())));

        assert!(result.is_err(), "Should reject truncated WAV header");
    }

    #[test]
    fn malformed_wav_random_garbage() {
        // Pseudo-random but deterministic
        let garbage: Vec<u8> = (0..500).map(|i| ((i * 17 + 42) % 256) as u8).collect();

        let result = WavAudioSource::from_reader(Box::new(Cursor::new(garbage)));

        assert!(result.is_err(), "Should reject random garbage as WAV");
    }

    #[test]
    fn decode_wav_returns_engine_layout() {
        let stereo_samples = vec![100i16, 300, 500, 700];
        let wav_data = make_wav_data(16000, 2, &stereo_samples);

        let samples = decode_wav(Box::new(Cursor::new(wav_data))).unwrap();
        assert_eq!(samples, vec![200i16, 600]);
    }
}
