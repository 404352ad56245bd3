//! Command-line interface for voxnote
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Incremental voice-to-text transcription
#[derive(Parser, Debug)]
#[command(
    name = "voxnote",
    version,
    about = "Incremental voice-to-text transcription"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: cycle details, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Audio input device (e.g., pipewire)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Whisper model (default: tiny, multilingual). Use tiny.en for English-only optimized
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Language code for transcription (default: auto-detect). Examples: auto, en, de, es, fr
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Beam width for decoding (higher: more accurate, slower)
    #[arg(long, value_name = "N")]
    pub beam_size: Option<u32>,

    /// Write the transcript to this file when the session ends
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the transcript as sentence bullets when the session ends
    #[arg(long)]
    pub bullets: bool,

    /// Stop recording after this long. Examples: 30s, 5m, 1h30m
    #[arg(long, value_name = "DURATION", value_parser = parse_duration_secs)]
    pub duration: Option<u64>,

    /// Prevent automatic model download if configured model is missing
    #[arg(long)]
    pub no_download: bool,
}

/// Parse a duration string into seconds.
///
/// Supports any duration format accepted by `humantime`: bare numbers
/// (seconds), single-unit (`30s`, `5m`, `2h`), and compound (`1h30m`, `2m30s`).
fn parse_duration_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs())
        .map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available audio input devices
    Devices,

    /// Manage Whisper models
    Models {
        /// Action to perform
        #[command(subcommand)]
        action: ModelsAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Model management actions
#[derive(Subcommand, Debug)]
pub enum ModelsAction {
    /// List catalog models and their install status
    List,

    /// Download and install a model
    Install {
        /// Model name (e.g., tiny, base.en)
        name: String,
    },
}
