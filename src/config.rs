use crate::defaults;
use crate::engine::recognizer::RecognizeOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
#[cfg(feature = "cli")]
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub engine: EngineConfig,
    pub export: ExportConfig,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Recognition engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub model: String,
    pub language: String,
    pub beam_size: u32,
    pub condition_on_previous_text: bool,
    pub threads: Option<usize>,
}

/// Transcript export configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub filename: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            channels: defaults::CHANNELS,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            beam_size: defaults::BEAM_SIZE,
            condition_on_previous_text: false,
            threads: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename: defaults::EXPORT_FILENAME.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - VOXNOTE_MODEL → engine.model
    /// - VOXNOTE_LANGUAGE → engine.language
    /// - VOXNOTE_AUDIO_DEVICE → audio.device
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("VOXNOTE_MODEL")
            && !model.is_empty()
        {
            self.engine.model = model;
        }

        if let Ok(language) = std::env::var("VOXNOTE_LANGUAGE")
            && !language.is_empty()
        {
            self.engine.language = language;
        }

        if let Ok(device) = std::env::var("VOXNOTE_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        self
    }

    /// Build per-invocation recognition options from this configuration.
    ///
    /// `language = "auto"` becomes `None` (engine auto-detects); anything else
    /// forces that language and skips detection.
    pub fn recognize_options(&self) -> RecognizeOptions {
        let language = if self.engine.language == defaults::AUTO_LANGUAGE {
            None
        } else {
            Some(self.engine.language.clone())
        };

        RecognizeOptions {
            beam_size: self.engine.beam_size,
            condition_on_previous_text: self.engine.condition_on_previous_text,
            language,
        }
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/voxnote/config.toml on Linux
    #[cfg(feature = "cli")]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("voxnote").join("config.toml"))
    }
}
