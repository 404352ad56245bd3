//! Plain-text transcript export.

use crate::defaults;

/// A transcript rendered for download or saving.
///
/// A pure snapshot of the transcript at export time; producing one has no
/// side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptExport {
    /// UTF-8 transcript bytes.
    pub bytes: Vec<u8>,
    /// Suggested filename.
    pub filename: String,
    /// MIME type (`text/plain`).
    pub mime_type: String,
}

impl TranscriptExport {
    /// The transcript as a string slice (always valid UTF-8).
    pub fn as_str(&self) -> &str {
        // bytes come from a String in export_named
        std::str::from_utf8(&self.bytes).unwrap_or("")
    }
}

/// Export a transcript under the fixed default filename.
pub fn export_transcript(transcript: &str) -> TranscriptExport {
    export_named(transcript, defaults::EXPORT_FILENAME)
}

/// Export a transcript under a caller-chosen filename.
pub fn export_named(transcript: &str, filename: &str) -> TranscriptExport {
    TranscriptExport {
        bytes: transcript.as_bytes().to_vec(),
        filename: filename.to_string(),
        mime_type: defaults::EXPORT_MIME.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_uses_fixed_filename_and_mime() {
        let export = export_transcript("Hello world ");

        assert_eq!(export.filename, "recorded_audio_transcript.txt");
        assert_eq!(export.mime_type, "text/plain");
        assert_eq!(export.bytes, b"Hello world ");
    }

    #[test]
    fn test_export_empty_transcript() {
        let export = export_transcript("");
        assert!(export.bytes.is_empty());
        assert_eq!(export.as_str(), "");
    }

    #[test]
    fn test_export_is_pure_snapshot() {
        let transcript = "content ".to_string();
        let first = export_transcript(&transcript);
        let second = export_transcript(&transcript);
        assert_eq!(first, second);
    }

    #[test]
    fn test_export_named_overrides_filename_only() {
        let export = export_named("text ", "meeting_notes.txt");
        assert_eq!(export.filename, "meeting_notes.txt");
        assert_eq!(export.mime_type, "text/plain");
    }

    #[test]
    fn test_export_preserves_unicode() {
        let export = export_transcript("Grüße, 世界 ");
        assert_eq!(export.as_str(), "Grüße, 世界 ");
    }
}
