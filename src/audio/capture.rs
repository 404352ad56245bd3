//! Live microphone capture using CPAL (Cross-Platform Audio Library).

use crate::audio::materializer::{InputFormat, convert_to_engine_format};
use crate::audio::recorder::AudioSource;
use crate::defaults;
use crate::error::{Result, VoxnoteError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// This suppresses noisy ALSA/JACK/PipeWire messages that CPAL triggers
/// when probing audio backends. The messages are harmless but confusing to users.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2 (stderr).
/// Safe as long as no other thread is concurrently manipulating fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Suppress noisy JACK/ALSA error messages that occur during audio backend probing.
/// These are harmless but confusing to users.
///
/// # Safety
/// This modifies environment variables which is safe when called before spawning threads.
pub fn suppress_audio_warnings() {
    // SAFETY: Called at startup before any threads are spawned
    unsafe {
        std::env::set_var("JACK_NO_START_SERVER", "1");
        std::env::set_var("JACK_NO_AUDIO_RESERVATION", "1");
        std::env::set_var("PIPEWIRE_DEBUG", "0");
        std::env::set_var("ALSA_DEBUG", "0");
        std::env::set_var("PW_LOG", "0");
    }
}

/// Preferred device names for GNOME/PipeWire environments.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse", "PulseAudio"];

/// Device name patterns to filter out (not useful for voice input).
const FILTERED_PATTERNS: &[&str] = &[
    "surround",
    "front:",
    "rear:",
    "center:",
    "side:",
    "Digital Output",
    "HDMI",
    "S/PDIF",
];

/// Check if a device name should be filtered out.
fn should_filter_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTERED_PATTERNS
        .iter()
        .any(|pattern| lower.contains(&pattern.to_lowercase()))
}

/// Check if a device is a preferred device.
fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES
        .iter()
        .any(|pref| lower.contains(&pref.to_lowercase()))
}

/// List all available audio input devices with filtering and recommendations.
///
/// # Returns
/// A vector of device names, with preferred devices marked with "\[recommended\]".
/// Filters out obviously unusable devices (surround channels, HDMI, etc.).
///
/// # Errors
/// Returns `VoxnoteError::AudioCapture` if device enumeration fails.
pub fn list_devices() -> Result<Vec<String>> {
    let (host, devices) = with_suppressed_stderr(|| {
        let host = cpal::default_host();
        let devices = host.input_devices();
        (host, devices)
    });
    let _ = host; // keep host alive while iterating devices
    let devices = devices.map_err(|e| VoxnoteError::AudioCapture {
        message: format!("Failed to enumerate input devices: {}", e),
    })?;

    let mut device_names = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            if should_filter_device(&name) {
                continue;
            }

            if is_preferred_device(&name) {
                device_names.push(format!("{} [recommended]", name));
            } else {
                device_names.push(name);
            }
        }
    }

    Ok(device_names)
}

/// Get the best default input device, preferring PipeWire/PulseAudio.
///
/// Tries in order:
/// 1. PipeWire
/// 2. PulseAudio/Pulse
/// 3. System default
///
/// This ensures we respect the desktop's audio device selection.
///
/// # Errors
/// Returns `VoxnoteError::AudioDeviceNotFound` if no input device is available.
fn get_best_default_device() -> Result<cpal::Device> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();

        if let Ok(devices) = host.input_devices() {
            for device in devices {
                if let Ok(name) = device.name()
                    && is_preferred_device(&name)
                {
                    return Ok(device);
                }
            }
        }

        host.default_input_device()
            .ok_or_else(|| VoxnoteError::AudioDeviceNotFound {
                device: "default".to_string(),
            })
    })
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: We ensure that the stream is only accessed from a single thread at a time
/// through the Mutex wrapper in CpalAudioSource. The stream methods are called
/// synchronously and don't cross thread boundaries unsafely.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Live microphone source delivering 16-bit PCM at 16kHz mono.
///
/// Tries the engine format first (i16/16kHz/mono), then falls back to the
/// device's default config with software conversion (channel downmix +
/// resampling) so reads always deliver the engine layout.
///
/// Note: The stream is wrapped in SendableStream + Mutex to make it Send+Sync.
/// This is safe because we ensure exclusive access through the Mutex.
pub struct CpalAudioSource {
    device: cpal::Device,
    stream: Arc<Mutex<Option<SendableStream>>>,
    buffer: Arc<Mutex<Vec<i16>>>,
    callback_count: Arc<std::sync::atomic::AtomicU64>,
    sample_rate: u32,
}

impl CpalAudioSource {
    /// Create a new CPAL audio source.
    ///
    /// # Arguments
    /// * `device_name` - Optional device name. If None, uses the default input device.
    ///
    /// # Errors
    /// Returns errors if the device is not found or cannot be configured.
    pub fn new(device_name: Option<&str>) -> Result<Self> {
        let device = with_suppressed_stderr(|| {
            let host = cpal::default_host();

            if let Some(name) = device_name {
                let devices = host
                    .input_devices()
                    .map_err(|e| VoxnoteError::AudioCapture {
                        message: format!("Failed to enumerate devices: {}", e),
                    })?;

                let mut found_device = None;
                for dev in devices {
                    if let Ok(dev_name) = dev.name()
                        && dev_name == name
                    {
                        found_device = Some(dev);
                        break;
                    }
                }

                found_device.ok_or_else(|| VoxnoteError::AudioDeviceNotFound {
                    device: name.to_string(),
                })
            } else {
                get_best_default_device()
            }
        })?;

        Ok(Self {
            device,
            stream: Arc::new(Mutex::new(None)),
            buffer: Arc::new(Mutex::new(Vec::new())),
            callback_count: Arc::new(std::sync::atomic::AtomicU64::new(0)),
            sample_rate: defaults::SAMPLE_RATE,
        })
    }

    /// Build the audio stream with the configured format.
    ///
    /// Tries in order:
    /// 1. i16/16kHz/mono — preferred, zero-copy path
    /// 2. f32/16kHz/mono — for devices that only expose float formats
    /// 3. Device default config — native rate/channels with software conversion
    ///
    /// Step 3 handles PipeWire setups where the ALSA compatibility layer accepts
    /// non-native configs but never fires the data callback.
    fn build_stream(&self) -> Result<cpal::Stream> {
        use std::sync::atomic::Ordering;

        let preferred_config = cpal::StreamConfig {
            channels: 1,
            sample_rate: self.sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let err_callback = |err| {
            tracing::warn!("audio stream error: {}", err);
        };

        // Try i16/16kHz/mono — works with PipeWire/PulseAudio which convert transparently
        let buffer = Arc::clone(&self.buffer);
        let counter = Arc::clone(&self.callback_count);
        if let Ok(stream) = self.device.build_input_stream(
            &preferred_config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                counter.fetch_add(1, Ordering::Relaxed);
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend_from_slice(data);
                }
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        // Try f32/16kHz/mono — for devices that only expose float formats
        let buffer = Arc::clone(&self.buffer);
        let counter = Arc::clone(&self.callback_count);
        if let Ok(stream) = self.device.build_input_stream(
            &preferred_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                counter.fetch_add(1, Ordering::Relaxed);
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend(
                        data.iter()
                            .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16),
                    );
                }
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        self.build_stream_native()
    }

    /// Build a stream using the device's default/native config, with software
    /// channel downmix and resampling to the engine layout.
    fn build_stream_native(&self) -> Result<cpal::Stream> {
        use cpal::SampleFormat;
        use std::sync::atomic::Ordering;

        let default_config =
            self.device
                .default_input_config()
                .map_err(|e| VoxnoteError::AudioCapture {
                    message: format!("Failed to query default input config: {}", e),
                })?;

        let native_format = InputFormat {
            sample_rate: default_config.sample_rate(),
            channels: default_config.channels(),
        };

        let stream_config: cpal::StreamConfig = default_config.clone().into();

        tracing::info!(
            "using native audio format ({}ch/{}Hz/{:?}), converting in software",
            native_format.channels,
            native_format.sample_rate,
            default_config.sample_format(),
        );

        let err_callback = |err| {
            tracing::warn!("audio stream error: {}", err);
        };

        let buffer = Arc::clone(&self.buffer);
        let counter = Arc::clone(&self.callback_count);

        match default_config.sample_format() {
            SampleFormat::I16 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        counter.fetch_add(1, Ordering::Relaxed);
                        // cpal delivers whole interleaved frames, so conversion
                        // cannot fail on the divisibility check
                        if let Ok(converted) =
                            convert_to_engine_format(data.to_vec(), native_format)
                            && let Ok(mut buf) = buffer.lock()
                        {
                            buf.extend_from_slice(&converted);
                        }
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| VoxnoteError::AudioCapture {
                    message: format!("Failed to build native i16 stream: {}", e),
                }),
            SampleFormat::F32 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        counter.fetch_add(1, Ordering::Relaxed);
                        let i16_data: Vec<i16> = data
                            .iter()
                            .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                            .collect();
                        if let Ok(converted) = convert_to_engine_format(i16_data, native_format)
                            && let Ok(mut buf) = buffer.lock()
                        {
                            buf.extend_from_slice(&converted);
                        }
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| VoxnoteError::AudioCapture {
                    message: format!("Failed to build native f32 stream: {}", e),
                }),
            fmt => Err(VoxnoteError::UnsupportedFormat {
                details: format!(
                    "native sample format {:?} is not convertible; try another --device",
                    fmt
                ),
            }),
        }
    }
}

impl AudioSource for CpalAudioSource {
    fn start(&mut self) -> Result<()> {
        use std::sync::atomic::Ordering;

        {
            let stream_guard = self.stream.lock().map_err(|e| VoxnoteError::AudioCapture {
                message: format!("Failed to lock stream: {}", e),
            })?;
            if stream_guard.is_some() {
                return Ok(()); // Already started
            }
        }

        let stream = self.build_stream()?;
        stream.play().map_err(|e| VoxnoteError::AudioCapture {
            message: format!("Failed to start audio stream: {}", e),
        })?;

        // Wait briefly to check if the CPAL callback actually fires.
        // Some PipeWire-ALSA setups accept non-native configs but never deliver data.
        std::thread::sleep(std::time::Duration::from_millis(200));

        let final_stream = if self.callback_count.load(Ordering::Relaxed) == 0 {
            // Preferred config didn't deliver data — stop it, clear buffer, try native
            drop(stream);
            if let Ok(mut buf) = self.buffer.lock() {
                buf.clear();
            }

            let native_stream = self.build_stream_native()?;
            native_stream
                .play()
                .map_err(|e| VoxnoteError::AudioCapture {
                    message: format!("Failed to start native audio stream: {}", e),
                })?;
            native_stream
        } else {
            stream
        };

        let mut stream_guard = self.stream.lock().map_err(|e| VoxnoteError::AudioCapture {
            message: format!("Failed to lock stream: {}", e),
        })?;
        *stream_guard = Some(SendableStream(final_stream));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut stream_guard = self.stream.lock().map_err(|e| VoxnoteError::AudioCapture {
            message: format!("Failed to lock stream: {}", e),
        })?;

        if let Some(sendable_stream) = stream_guard.take() {
            sendable_stream
                .0
                .pause()
                .map_err(|e| VoxnoteError::AudioCapture {
                    message: format!("Failed to stop audio stream: {}", e),
                })?;
        }
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        let mut buffer = self.buffer.lock().map_err(|e| VoxnoteError::AudioCapture {
            message: format!("Failed to lock audio buffer: {}", e),
        })?;

        let samples = buffer.clone();
        buffer.clear();
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_filter_device() {
        assert!(should_filter_device("surround51"));
        assert!(should_filter_device("front:CARD=PCH"));
        assert!(should_filter_device("HDMI Output"));
        assert!(should_filter_device("Digital Output S/PDIF"));
        assert!(!should_filter_device("pipewire"));
        assert!(!should_filter_device("PulseAudio"));
        assert!(!should_filter_device("Built-in Audio"));
    }

    #[test]
    fn test_is_preferred_device() {
        assert!(is_preferred_device("pipewire"));
        assert!(is_preferred_device("PipeWire"));
        assert!(is_preferred_device("pulse"));
        assert!(is_preferred_device("PulseAudio"));
        assert!(!is_preferred_device("hw:0,0"));
        assert!(!is_preferred_device("default"));
    }

    #[test]
    fn test_create_with_invalid_device_name() {
        let source = CpalAudioSource::new(Some("NonExistentDevice12345"));
        assert!(source.is_err());
        match source {
            Err(VoxnoteError::AudioDeviceNotFound { device }) => {
                assert_eq!(device, "NonExistentDevice12345");
            }
            _ => panic!("Expected AudioDeviceNotFound error"),
        }
    }

    #[test]
    #[ignore] // Requires audio hardware
    fn test_list_devices_returns_at_least_one_device() {
        let devices = list_devices();
        assert!(devices.is_ok());
        assert!(
            !devices.unwrap().is_empty(),
            "Expected at least one audio device"
        );
    }

    #[test]
    #[ignore] // Requires audio hardware
    fn test_audio_source_trait_implementation() {
        let mut source = CpalAudioSource::new(None).expect("Failed to create audio source");

        assert!(source.start().is_ok(), "Failed to start audio capture");
        assert!(source.read_samples().is_ok(), "Failed to read samples");
        assert!(source.stop().is_ok(), "Failed to stop audio capture");
    }

    #[test]
    #[ignore] // Requires audio hardware
    fn test_start_stop_multiple_times() {
        let mut source = CpalAudioSource::new(None).expect("Failed to create audio source");

        for _ in 0..3 {
            assert!(source.start().is_ok());
            std::thread::sleep(std::time::Duration::from_millis(50));
            assert!(source.stop().is_ok());
        }
    }
}
