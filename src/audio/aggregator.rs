//! Ordered collection of audio frames arriving from a capture source.
//!
//! One producer context appends frames while consumer contexts take
//! snapshots to trigger transcription. Appends are atomic per frame: a
//! snapshot never observes a partially written frame, and the critical
//! section is a single `Vec` push so the producer is never blocked for long.

use crate::audio::frame::AudioFrame;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Collects raw audio frames into an ordered, appendable sequence.
///
/// Shared between the capture side and transcription triggers via `Arc`.
/// `snapshot` is non-destructive, so long recordings can be polled without
/// draining accumulated audio.
#[derive(Debug, Default)]
pub struct FrameAggregator {
    frames: Mutex<Vec<AudioFrame>>,
    next_sequence: AtomicU64,
}

impl FrameAggregator {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a frame to the ordered sequence.
    ///
    /// Accepts frames with zero samples; they contribute nothing on
    /// materialization but keep the arrival ordering intact.
    pub fn append(&self, frame: AudioFrame) {
        self.lock_frames().push(frame);
    }

    /// Wraps raw samples in a frame with the next sequence number and appends it.
    ///
    /// Returns the sequence number assigned to the frame.
    pub fn push(&self, samples: Vec<i16>) -> u64 {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        self.append(AudioFrame::new(sequence, samples));
        sequence
    }

    /// Returns a copy of the frames accumulated so far, in arrival order.
    ///
    /// Non-destructive: the frames stay in the aggregator. Frames appended
    /// after the snapshot is taken are not included.
    pub fn snapshot(&self) -> Vec<AudioFrame> {
        self.lock_frames().clone()
    }

    /// Returns true if no frames have been appended (or all were cleared).
    pub fn is_empty(&self) -> bool {
        self.lock_frames().is_empty()
    }

    /// Returns the number of frames accumulated so far.
    pub fn len(&self) -> usize {
        self.lock_frames().len()
    }

    /// Total number of samples across all accumulated frames.
    pub fn total_samples(&self) -> usize {
        self.lock_frames().iter().map(|f| f.samples.len()).sum()
    }

    /// Removes all accumulated frames and restarts sequence numbering.
    ///
    /// Called on explicit session reset only.
    pub fn clear(&self) {
        self.lock_frames().clear();
        self.next_sequence.store(0, Ordering::SeqCst);
    }

    // Frames are plain data, so a panicked producer cannot leave one half
    // written; recover the guard rather than poisoning every later caller.
    fn lock_frames(&self) -> std::sync::MutexGuard<'_, Vec<AudioFrame>> {
        match self.frames.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_aggregator_is_empty() {
        let aggregator = FrameAggregator::new();
        assert!(aggregator.is_empty());
        assert_eq!(aggregator.len(), 0);
        assert_eq!(aggregator.total_samples(), 0);
    }

    #[test]
    fn test_append_preserves_arrival_order() {
        let aggregator = FrameAggregator::new();
        aggregator.append(AudioFrame::new(0, vec![1i16]));
        aggregator.append(AudioFrame::new(1, vec![2i16]));
        aggregator.append(AudioFrame::new(2, vec![3i16]));

        let frames = aggregator.snapshot();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].samples, vec![1i16]);
        assert_eq!(frames[1].samples, vec![2i16]);
        assert_eq!(frames[2].samples, vec![3i16]);
    }

    #[test]
    fn test_push_assigns_monotonic_sequences() {
        let aggregator = FrameAggregator::new();
        assert_eq!(aggregator.push(vec![1i16]), 0);
        assert_eq!(aggregator.push(vec![2i16]), 1);
        assert_eq!(aggregator.push(vec![3i16]), 2);

        let frames = aggregator.snapshot();
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.sequence, i as u64);
        }
    }

    #[test]
    fn test_snapshot_is_non_destructive() {
        let aggregator = FrameAggregator::new();
        aggregator.push(vec![1i16, 2, 3]);

        let first = aggregator.snapshot();
        let second = aggregator.snapshot();

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(aggregator.len(), 1);
    }

    #[test]
    fn test_snapshot_excludes_later_appends() {
        let aggregator = FrameAggregator::new();
        aggregator.push(vec![1i16]);

        let snapshot = aggregator.snapshot();
        aggregator.push(vec![2i16]);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(aggregator.len(), 2);
    }

    #[test]
    fn test_zero_sample_frames_accepted() {
        let aggregator = FrameAggregator::new();
        aggregator.push(Vec::new());
        aggregator.push(vec![5i16]);
        aggregator.push(Vec::new());

        assert_eq!(aggregator.len(), 3);
        assert_eq!(aggregator.total_samples(), 1);
    }

    #[test]
    fn test_clear_empties_and_restarts_sequences() {
        let aggregator = FrameAggregator::new();
        aggregator.push(vec![1i16]);
        aggregator.push(vec![2i16]);

        aggregator.clear();
        assert!(aggregator.is_empty());

        assert_eq!(aggregator.push(vec![3i16]), 0);
    }

    #[test]
    fn test_concurrent_append_and_snapshot_sees_whole_frames() {
        let aggregator = Arc::new(FrameAggregator::new());
        let producer_aggregator = Arc::clone(&aggregator);

        // Each frame is homogeneous: all samples equal its index. A torn
        // frame would show up as a mixed-value sample vector.
        let producer = thread::spawn(move || {
            for i in 0..200i16 {
                producer_aggregator.push(vec![i; 512]);
            }
        });

        let mut max_seen = 0;
        while max_seen < 200 {
            let frames = aggregator.snapshot();
            for frame in &frames {
                assert!(
                    frame.samples.iter().all(|&s| s == frame.samples[0]),
                    "snapshot observed a torn frame at sequence {}",
                    frame.sequence
                );
            }
            max_seen = frames.len();
        }

        producer.join().unwrap();
        assert_eq!(aggregator.len(), 200);
    }
}
