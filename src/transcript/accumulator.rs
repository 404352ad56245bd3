//! Session-scoped transcript accumulation.
//!
//! The transcript is append-only within a session: every completed
//! recognition cycle contributes its segments exactly once, each non-empty
//! segment text followed by a single space. Nothing clears it except an
//! explicit reset.

use crate::engine::recognizer::TranscriptSegment;

/// Characters that terminate a sentence for the bullet view.
const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Accumulates recognized text across transcription cycles.
#[derive(Debug, Clone, Default)]
pub struct TranscriptAccumulator {
    text: String,
}

impl TranscriptAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one cycle's segments to the running transcript.
    ///
    /// Each non-empty segment text is appended followed by a single space;
    /// empty-text segments contribute nothing but do not disturb the order
    /// of those that follow. An empty segment list is a no-op.
    pub fn append(&mut self, segments: &[TranscriptSegment]) {
        for segment in segments {
            if segment.text.is_empty() {
                continue;
            }
            self.text.push_str(&segment.text);
            self.text.push(' ');
        }
    }

    /// Read-only snapshot of the accumulated transcript.
    pub fn current(&self) -> &str {
        &self.text
    }

    /// Returns true if nothing has been accumulated.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Clears the transcript. Called on explicit new-session action only,
    /// never after a transcription cycle.
    pub fn reset(&mut self) {
        self.text.clear();
    }

    /// Sentence-level bullet view of the transcript.
    ///
    /// Splits on sentence-terminal punctuation, trims whitespace, and drops
    /// empty fragments, in document order. A derived view, not a mutation.
    pub fn derive_bullets(&self) -> Vec<String> {
        self.text
            .split(SENTENCE_TERMINATORS)
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .map(str::to_string)
            .collect()
    }
}
