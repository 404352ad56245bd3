//! Whisper model metadata catalog.
//!
//! This module provides a catalog of available Whisper models from OpenAI,
//! including model information, availability checks, and defaults.

use crate::defaults;

/// Metadata for a Whisper model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    /// Model identifier (e.g., "tiny.en", "base", "large")
    pub name: &'static str,
    /// Model size in megabytes
    pub size_mb: u32,
    /// SHA-1 checksum for integrity verification; empty skips verification.
    // TODO: pin checksums from the upstream model cards
    pub sha1: &'static str,
    /// Download URL from HuggingFace
    pub url: &'static str,
    /// Whether this model supports English only
    pub english_only: bool,
}

/// Catalog of available Whisper models.
///
/// Models range from tiny (75 MB, fast, lower accuracy) to large (3094 MB,
/// slower, highest accuracy). The `.en` suffix indicates English-only models,
/// which are faster and smaller.
pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        name: "tiny.en",
        size_mb: 75,
        sha1: "",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-tiny.en.bin",
        english_only: true,
    },
    ModelInfo {
        name: "tiny",
        size_mb: 75,
        sha1: "",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-tiny.bin",
        english_only: false,
    },
    ModelInfo {
        name: "base.en",
        size_mb: 142,
        sha1: "",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.en.bin",
        english_only: true,
    },
    ModelInfo {
        name: "base",
        size_mb: 142,
        sha1: "",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.bin",
        english_only: false,
    },
    ModelInfo {
        name: "small.en",
        size_mb: 466,
        sha1: "",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-small.en.bin",
        english_only: true,
    },
    ModelInfo {
        name: "small",
        size_mb: 466,
        sha1: "",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-small.bin",
        english_only: false,
    },
    ModelInfo {
        name: "medium.en",
        size_mb: 1533,
        sha1: "",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-medium.en.bin",
        english_only: true,
    },
    ModelInfo {
        name: "medium",
        size_mb: 1533,
        sha1: "",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-medium.bin",
        english_only: false,
    },
    ModelInfo {
        name: "large",
        size_mb: 3094,
        sha1: "",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-large-v3.bin",
        english_only: false,
    },
];

/// Find a model by name.
pub fn get_model(name: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.name == resolve_name(name))
}

/// Get all available models.
pub fn list_models() -> &'static [ModelInfo] {
    MODELS
}

/// Get the default model.
pub fn default_model() -> &'static ModelInfo {
    // SAFETY: the default model name is always present in MODELS
    #[allow(clippy::expect_used)]
    get_model(defaults::DEFAULT_MODEL).expect("default model missing from catalog")
}

/// Normalize a user-supplied model name.
///
/// Accepts the `ggml-` filename prefix and a `.bin` suffix so paths copied
/// from a models directory resolve to catalog names.
pub fn resolve_name(name: &str) -> &str {
    let name = name.trim();
    let name = name.strip_prefix("ggml-").unwrap_or(name);
    name.strip_suffix(".bin").unwrap_or(name)
}

/// The multilingual sibling of an English-only model, if any.
///
/// `"base.en"` → `Some("base")`; `"base"` → `None`.
pub fn multilingual_variant(name: &str) -> Option<&'static str> {
    let stripped = name.strip_suffix(".en")?;
    MODELS
        .iter()
        .find(|m| m.name == stripped && !m.english_only)
        .map(|m| m.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_model_finds_known_models() {
        assert!(get_model("tiny").is_some());
        assert!(get_model("base.en").is_some());
        assert!(get_model("large").is_some());
        assert!(get_model("nonexistent").is_none());
    }

    #[test]
    fn test_default_model_exists_in_catalog() {
        let model = default_model();
        assert_eq!(model.name, "tiny");
        assert!(!model.english_only);
    }

    #[test]
    fn test_resolve_name_strips_filename_decorations() {
        assert_eq!(resolve_name("tiny"), "tiny");
        assert_eq!(resolve_name("ggml-tiny.bin"), "tiny");
        assert_eq!(resolve_name("ggml-base.en.bin"), "base.en");
        assert_eq!(resolve_name("  small  "), "small");
    }

    #[test]
    fn test_get_model_accepts_filenames() {
        assert_eq!(get_model("ggml-tiny.bin").map(|m| m.name), Some("tiny"));
    }

    #[test]
    fn test_multilingual_variant() {
        assert_eq!(multilingual_variant("base.en"), Some("base"));
        assert_eq!(multilingual_variant("tiny.en"), Some("tiny"));
        assert_eq!(multilingual_variant("base"), None);
        assert_eq!(multilingual_variant("unknown.en"), None);
    }

    #[test]
    fn test_english_only_models_have_en_suffix() {
        for model in MODELS {
            assert_eq!(model.english_only, model.name.ends_with(".en"));
        }
    }

    #[test]
    fn test_all_urls_point_at_ggml_binaries() {
        for model in MODELS {
            assert!(model.url.starts_with("https://"));
            assert!(model.url.ends_with(".bin"));
        }
    }
}
