//! Capture intake: pumps an audio source into a session's aggregator.
//!
//! Frame delivery is a message-passing channel with a single consumer whose
//! only job is calling the aggregator's append entry point. The capture side
//! runs on a dedicated thread so a slow consumer never stalls the device
//! callback, and recognition never runs anywhere near this path.

use crate::audio::aggregator::FrameAggregator;
use crate::audio::recorder::AudioSource;
use crate::defaults;
use crate::error::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;

/// Configuration for the capture intake.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Channel buffer size (number of frames to buffer).
    pub channel_capacity: usize,
    /// Polling interval when no samples are available (ms).
    pub poll_interval_ms: u64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: defaults::INTAKE_CHANNEL_CAPACITY,
            poll_interval_ms: defaults::INTAKE_POLL_INTERVAL_MS,
        }
    }
}

/// Pumps frames from an audio source into an aggregator until stopped.
///
/// Finite sources (WAV files) end the pump on exhaustion; live sources run
/// until [`IntakeHandle::stop`] is called or the handle is drained.
pub struct CaptureIntake<A: AudioSource> {
    source: A,
    config: IntakeConfig,
    running: Arc<AtomicBool>,
}

impl<A: AudioSource + 'static> CaptureIntake<A> {
    /// Creates an intake with default configuration.
    pub fn new(source: A) -> Self {
        Self::with_config(source, IntakeConfig::default())
    }

    /// Creates an intake with custom configuration.
    pub fn with_config(source: A, config: IntakeConfig) -> Self {
        Self {
            source,
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Starts the capture thread and the consumer task.
    ///
    /// The consumer task is the channel's single receiver; every frame it
    /// takes goes straight into `aggregator`. Must be called from within a
    /// tokio runtime.
    pub fn start(self, aggregator: Arc<FrameAggregator>) -> Result<IntakeHandle> {
        let CaptureIntake {
            mut source,
            config,
            running,
        } = self;

        let (tx, mut rx) = mpsc::channel::<Vec<i16>>(config.channel_capacity);

        source.start()?;
        running.store(true, Ordering::SeqCst);

        let poll_interval = Duration::from_millis(config.poll_interval_ms);
        let finite = source.is_finite();
        let capture_running = Arc::clone(&running);

        thread::spawn(move || {
            while capture_running.load(Ordering::SeqCst) {
                match source.read_samples() {
                    Ok(samples) if !samples.is_empty() => {
                        // Stop if the receiver is gone
                        if tx.blocking_send(samples).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {
                        if finite {
                            break;
                        }
                        thread::sleep(poll_interval);
                    }
                    Err(e) => {
                        tracing::warn!("audio capture error: {}", e);
                        break;
                    }
                }
            }

            let _ = source.stop();
            capture_running.store(false, Ordering::SeqCst);
        });

        let consumer = tokio::spawn(async move {
            let mut delivered = 0u64;
            while let Some(samples) = rx.recv().await {
                aggregator.push(samples);
                delivered += 1;
            }
            tracing::debug!(frames = delivered, "capture intake drained");
            delivered
        });

        Ok(IntakeHandle { running, consumer })
    }
}

/// Handle to a running capture intake.
pub struct IntakeHandle {
    running: Arc<AtomicBool>,
    consumer: tokio::task::JoinHandle<u64>,
}

impl IntakeHandle {
    /// Signals the capture thread to stop. Already-captured frames still
    /// drain into the aggregator.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// True while the capture thread is producing.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stops the capture and waits until every in-flight frame has reached
    /// the aggregator. Returns the number of frames delivered.
    pub async fn drain(self) -> u64 {
        self.running.store(false, Ordering::SeqCst);
        self.consumer.await.unwrap_or(0)
    }
}
