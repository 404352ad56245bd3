//! Transcription sessions: state machine and cycle orchestration.
//!
//! A [`Session`] owns one transcript and the audio accumulated for it; a
//! [`SessionController`] runs "transcribe now" cycles against it. Each cycle
//! operates on a snapshot of the audio taken at trigger time, so a live
//! capture source can keep appending while recognition runs; frames appended
//! after the trigger are picked up by the next cycle.

pub mod intake;

use crate::audio::aggregator::FrameAggregator;
use crate::audio::frame::AudioBuffer;
use crate::audio::materializer;
use crate::engine::recognizer::{
    LanguageDetection, Recognition, RecognizeOptions, SpeechRecognizer,
};
use crate::error::{Result, VoxnoteError};
use crate::transcript::accumulator::TranscriptAccumulator;
use crate::transcript::export::{self, TranscriptExport};
use std::sync::{Arc, Mutex, MutexGuard};

/// Lifecycle states of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No recording has started.
    Idle,
    /// Audio is being (or has been) collected; a cycle may be triggered.
    AwaitingAudio,
    /// A recognition cycle is in flight. A second trigger is rejected.
    Transcribing,
    /// The last cycle completed and its segments were appended.
    Complete,
    /// The last cycle failed; the transcript is unchanged. Retry is allowed.
    Failed,
}

/// Outcome of one successful transcription cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Number of segments the engine emitted (including empty-text ones).
    pub segment_count: usize,
    /// Text appended to the transcript by this cycle.
    pub appended: String,
    /// Language hypothesis for this cycle's buffer.
    pub language: LanguageDetection,
}

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    accumulator: TranscriptAccumulator,
    last_language: Option<LanguageDetection>,
}

/// One user interaction scope: a transcript plus its audio aggregation state.
///
/// Created and destroyed by the caller and passed by reference wherever it is
/// needed; there is no process-wide session store. State shared with the
/// capture side lives behind the aggregator's own lock, so producers never
/// contend with transcript reads.
#[derive(Debug)]
pub struct Session {
    aggregator: Arc<FrameAggregator>,
    inner: Mutex<SessionInner>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates an idle session with an empty transcript.
    pub fn new() -> Self {
        Self {
            aggregator: Arc::new(FrameAggregator::new()),
            inner: Mutex::new(SessionInner {
                state: SessionState::Idle,
                accumulator: TranscriptAccumulator::new(),
                last_language: None,
            }),
        }
    }

    /// The frame aggregator collecting this session's audio.
    ///
    /// Hand this to the capture side (see [`intake::CaptureIntake`]).
    pub fn aggregator(&self) -> Arc<FrameAggregator> {
        Arc::clone(&self.aggregator)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.lock_inner().state
    }

    /// Marks the session as recording. Only meaningful from `Idle`.
    pub fn begin_recording(&self) {
        let mut inner = self.lock_inner();
        if inner.state == SessionState::Idle {
            inner.state = SessionState::AwaitingAudio;
        }
    }

    /// Read-only snapshot of the accumulated transcript.
    pub fn transcript(&self) -> String {
        self.lock_inner().accumulator.current().to_string()
    }

    /// Language detection reported by the most recent completed cycle.
    pub fn last_language(&self) -> Option<LanguageDetection> {
        self.lock_inner().last_language.clone()
    }

    /// Sentence-level bullet view of the transcript.
    pub fn bullets(&self) -> Vec<String> {
        self.lock_inner().accumulator.derive_bullets()
    }

    /// Export the current transcript as plain text.
    pub fn export(&self) -> TranscriptExport {
        export::export_transcript(self.lock_inner().accumulator.current())
    }

    /// Discards all audio and transcript state and returns to `Idle`.
    ///
    /// The only way the transcript is ever cleared.
    pub fn reset(&self) {
        let mut inner = self.lock_inner();
        inner.accumulator.reset();
        inner.last_language = None;
        inner.state = SessionState::Idle;
        self.aggregator.clear();
    }

    /// Guards and enters `Transcribing`, returning the cycle's fixed input.
    ///
    /// Rejects a trigger while a cycle is in flight; rejects empty audio
    /// before the state changes, so a failed guard leaves the session where
    /// it was.
    fn begin_cycle(&self) -> Result<AudioBuffer> {
        let mut inner = self.lock_inner();
        if inner.state == SessionState::Transcribing {
            return Err(VoxnoteError::TranscribeBusy);
        }

        let frames = self.aggregator.snapshot();
        let buffer = materializer::materialize(&frames)?;

        inner.state = SessionState::Transcribing;
        Ok(buffer)
    }

    /// Commits one cycle's output. Segments are appended exactly once.
    fn complete_cycle(&self, recognition: Recognition) -> CycleReport {
        let mut inner = self.lock_inner();
        let before = inner.accumulator.current().len();
        inner.accumulator.append(&recognition.segments);
        let appended = inner.accumulator.current()[before..].to_string();
        inner.last_language = Some(recognition.language.clone());
        inner.state = SessionState::Complete;

        tracing::debug!(
            segments = recognition.segments.len(),
            appended_chars = appended.len(),
            "transcription cycle complete"
        );

        CycleReport {
            segment_count: recognition.segments.len(),
            appended,
            language: recognition.language,
        }
    }

    /// Records a failed cycle. The transcript is left untouched.
    fn fail_cycle(&self) {
        self.lock_inner().state = SessionState::Failed;
    }

    // Session state is plain data; recover a poisoned lock instead of
    // propagating panics into every reader.
    fn lock_inner(&self) -> MutexGuard<'_, SessionInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Runs transcription cycles for one session.
///
/// Recognition is blocking and may take seconds, so the async entry point
/// moves it to the blocking pool; the session stays observable (state
/// `Transcribing`) while the cycle runs. There is no automatic retry and no
/// mid-recognition cancellation; callers may layer a timeout on top.
pub struct SessionController<R: SpeechRecognizer + 'static> {
    session: Arc<Session>,
    recognizer: Arc<R>,
    options: RecognizeOptions,
}

impl<R: SpeechRecognizer + 'static> SessionController<R> {
    /// Creates a controller with default recognition options.
    pub fn new(session: Arc<Session>, recognizer: R) -> Self {
        Self::with_options(session, recognizer, RecognizeOptions::default())
    }

    /// Creates a controller with explicit recognition options.
    pub fn with_options(session: Arc<Session>, recognizer: R, options: RecognizeOptions) -> Self {
        Self {
            session,
            recognizer: Arc::new(recognizer),
            options,
        }
    }

    /// The session this controller drives.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// The options applied to every cycle.
    pub fn options(&self) -> &RecognizeOptions {
        &self.options
    }

    /// Runs one transcription cycle off the async runtime's blocking pool.
    ///
    /// # Errors
    /// - `VoxnoteError::TranscribeBusy` if a cycle is already in flight.
    /// - `VoxnoteError::NoAudio` if no (non-empty) frames exist yet.
    /// - `VoxnoteError::Recognition` on engine faults; the transcript is
    ///   unchanged and the session may be retried.
    pub async fn transcribe(&self) -> Result<CycleReport> {
        let buffer = self.session.begin_cycle()?;
        tracing::debug!(
            samples = buffer.len(),
            buffer_ms = buffer.duration_ms(),
            "transcription cycle started"
        );

        let recognizer = Arc::clone(&self.recognizer);
        let options = self.options.clone();
        let outcome =
            tokio::task::spawn_blocking(move || recognizer.recognize(&buffer, &options)).await;

        match outcome {
            Ok(Ok(recognition)) => Ok(self.session.complete_cycle(recognition)),
            Ok(Err(e)) => {
                self.session.fail_cycle();
                Err(e)
            }
            Err(join_error) => {
                self.session.fail_cycle();
                Err(VoxnoteError::Recognition {
                    message: format!("recognition task failed: {}", join_error),
                })
            }
        }
    }

    /// Synchronous variant of [`SessionController::transcribe`] for callers
    /// without an async runtime. Blocks for the duration of recognition.
    pub fn transcribe_blocking(&self) -> Result<CycleReport> {
        let buffer = self.session.begin_cycle()?;

        match self.recognizer.recognize(&buffer, &self.options) {
            Ok(recognition) => Ok(self.session.complete_cycle(recognition)),
            Err(e) => {
                self.session.fail_cycle();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::recognizer::MockRecognizer;
    use std::time::Duration;

    fn session_with_audio() -> Arc<Session> {
        let session = Arc::new(Session::new());
        session.begin_recording();
        session.aggregator().push(vec![100i16; 1600]);
        session
    }

    #[test]
    fn test_new_session_is_idle_and_empty() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.transcript(), "");
        assert_eq!(session.last_language(), None);
    }

    #[test]
    fn test_begin_recording_transitions_from_idle_only() {
        let session = Session::new();
        session.begin_recording();
        assert_eq!(session.state(), SessionState::AwaitingAudio);

        // No-op once past Idle
        session.begin_recording();
        assert_eq!(session.state(), SessionState::AwaitingAudio);
    }

    #[tokio::test]
    async fn test_cycle_appends_segments_and_reports_language() {
        let session = session_with_audio();
        let recognizer = MockRecognizer::new("mock")
            .with_segment_texts(&["Hello", "world"])
            .with_language("en", 0.97);
        let controller = SessionController::new(Arc::clone(&session), recognizer);

        let report = controller.transcribe().await.unwrap();

        assert_eq!(report.segment_count, 2);
        assert_eq!(report.appended, "Hello world ");
        assert_eq!(report.language.language, "en");
        assert!((report.language.probability - 0.97).abs() < f32::EPSILON);

        assert_eq!(session.state(), SessionState::Complete);
        assert_eq!(session.transcript(), "Hello world ");
        assert_eq!(session.last_language().unwrap().language, "en");
    }

    #[tokio::test]
    async fn test_transcribe_without_audio_is_no_audio_and_state_unchanged() {
        let session = Arc::new(Session::new());
        session.begin_recording();
        let controller =
            SessionController::new(Arc::clone(&session), MockRecognizer::new("mock"));

        let result = controller.transcribe().await;

        assert!(matches!(result, Err(VoxnoteError::NoAudio)));
        assert_eq!(session.state(), SessionState::AwaitingAudio);
        assert_eq!(session.transcript(), "");
    }

    #[tokio::test]
    async fn test_only_empty_frames_is_no_audio() {
        let session = Arc::new(Session::new());
        session.begin_recording();
        session.aggregator().push(Vec::new());
        session.aggregator().push(Vec::new());
        let controller =
            SessionController::new(Arc::clone(&session), MockRecognizer::new("mock"));

        let result = controller.transcribe().await;
        assert!(matches!(result, Err(VoxnoteError::NoAudio)));
    }

    #[tokio::test]
    async fn test_repeated_cycles_accumulate() {
        let session = session_with_audio();
        let recognizer = MockRecognizer::new("mock").with_segment_texts(&["again"]);
        let controller = SessionController::new(Arc::clone(&session), recognizer);

        controller.transcribe().await.unwrap();
        controller.transcribe().await.unwrap();

        assert_eq!(session.transcript(), "again again ");
    }

    #[tokio::test]
    async fn test_failed_cycle_leaves_transcript_and_allows_retry() {
        let session = session_with_audio();

        let failing = SessionController::new(
            Arc::clone(&session),
            MockRecognizer::new("mock").with_failure(),
        );
        let seeded = SessionController::new(
            Arc::clone(&session),
            MockRecognizer::new("mock").with_segment_texts(&["ok"]),
        );

        seeded.transcribe().await.unwrap();
        assert_eq!(session.transcript(), "ok ");

        let result = failing.transcribe().await;
        assert!(matches!(result, Err(VoxnoteError::Recognition { .. })));
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(session.transcript(), "ok ");

        // Retry with the same audio succeeds from Failed
        seeded.transcribe().await.unwrap();
        assert_eq!(session.state(), SessionState::Complete);
        assert_eq!(session.transcript(), "ok ok ");
    }

    #[tokio::test]
    async fn test_second_trigger_while_in_flight_is_rejected() {
        let session = session_with_audio();
        let slow = MockRecognizer::new("mock")
            .with_segment_texts(&["slow"])
            .with_delay(Duration::from_millis(300));
        let controller = Arc::new(SessionController::new(Arc::clone(&session), slow));

        let in_flight = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.transcribe().await })
        };

        // Wait until the first cycle has entered Transcribing
        while session.state() != SessionState::Transcribing {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let second = controller.transcribe().await;
        assert!(matches!(second, Err(VoxnoteError::TranscribeBusy)));

        in_flight.await.unwrap().unwrap();

        // Exactly one append happened
        assert_eq!(session.transcript(), "slow ");
        assert_eq!(session.state(), SessionState::Complete);
    }

    #[tokio::test]
    async fn test_cycle_uses_trigger_time_snapshot() {
        let session = session_with_audio();
        let slow = MockRecognizer::new("mock")
            .with_segment_texts(&["snap"])
            .with_delay(Duration::from_millis(100));
        let controller = Arc::new(SessionController::new(Arc::clone(&session), slow));

        let in_flight = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.transcribe().await })
        };

        while session.state() != SessionState::Transcribing {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        // Frames appended mid-cycle belong to the next cycle
        session.aggregator().push(vec![7i16; 1600]);

        in_flight.await.unwrap().unwrap();
        assert_eq!(session.aggregator().len(), 2);
        assert_eq!(session.transcript(), "snap ");
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let session = session_with_audio();
        let controller = SessionController::new(
            Arc::clone(&session),
            MockRecognizer::new("mock").with_language("de", 0.8),
        );
        controller.transcribe().await.unwrap();

        session.reset();

        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.transcript(), "");
        assert_eq!(session.last_language(), None);
        assert!(session.aggregator().is_empty());
    }

    #[test]
    fn test_transcribe_blocking_matches_async_semantics() {
        let session = session_with_audio();
        let controller = SessionController::new(
            Arc::clone(&session),
            MockRecognizer::new("mock").with_segment_texts(&["sync"]),
        );

        let report = controller.transcribe_blocking().unwrap();
        assert_eq!(report.appended, "sync ");
        assert_eq!(session.state(), SessionState::Complete);
    }

    #[test]
    fn test_export_reflects_current_transcript() {
        let session = session_with_audio();
        let controller = SessionController::new(
            Arc::clone(&session),
            MockRecognizer::new("mock").with_segment_texts(&["Hello there.", "How are you."]),
        );
        controller.transcribe_blocking().unwrap();

        let export = session.export();
        assert_eq!(export.as_str(), "Hello there. How are you. ");
        assert_eq!(export.filename, "recorded_audio_transcript.txt");

        assert_eq!(session.bullets(), vec!["Hello there", "How are you"]);
    }

    #[tokio::test]
    async fn test_forced_language_reported_verbatim() {
        let session = session_with_audio();
        let options = RecognizeOptions {
            language: Some("fr".to_string()),
            ..Default::default()
        };
        let controller = SessionController::with_options(
            Arc::clone(&session),
            MockRecognizer::new("mock").with_language("en", 0.5),
            options,
        );

        let report = controller.transcribe().await.unwrap();
        assert_eq!(report.language.language, "fr");
        assert_eq!(report.language.probability, 1.0);
    }
}
