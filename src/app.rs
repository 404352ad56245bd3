//! Session composition for the CLI.
//!
//! Wires capture source → session → recognizer for the two entry modes:
//! live microphone (transcribe on demand while recording continues) and
//! recorded audio piped in as WAV.

use crate::audio::capture::{CpalAudioSource, suppress_audio_warnings};
use crate::audio::wav::WavAudioSource;
use crate::config::Config;
use crate::defaults;
use crate::engine::recognizer::SpeechRecognizer;
use crate::engine::whisper::{WhisperConfig, WhisperRecognizer};
use crate::error::{Result, VoxnoteError};
use crate::models::catalog::{get_model, multilingual_variant};
use crate::models::download::{download_model, is_model_installed, model_path};
use crate::session::intake::CaptureIntake;
use crate::session::{Session, SessionController};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;

/// Runtime options shared by both entry modes.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Write the transcript here when the session ends.
    pub output: Option<PathBuf>,
    /// Print the bullet view when the session ends.
    pub bullets: bool,
    /// Stop a live recording after this many seconds.
    pub duration_secs: Option<u64>,
    /// Suppress status messages.
    pub quiet: bool,
    /// Verbosity level (0=default, 1=cycle details, 2=full diagnostics).
    pub verbosity: u8,
    /// Prevent automatic model download.
    pub no_download: bool,
}

/// Run the live microphone mode.
///
/// Records continuously; each Enter keypress triggers a transcription cycle
/// over everything recorded so far, and Ctrl+C (or `--duration`) ends the
/// recording with a final cycle. The transcript accumulates across cycles.
pub async fn run_live_command(config: Config, opts: RunOptions) -> Result<()> {
    // Suppress noisy JACK/ALSA warnings before audio init
    suppress_audio_warnings();

    let recognizer = create_recognizer(&config, opts.quiet, opts.no_download).await?;
    let session = Arc::new(Session::new());
    let controller = SessionController::with_options(
        Arc::clone(&session),
        recognizer,
        config.recognize_options(),
    );

    let source = CpalAudioSource::new(config.audio.device.as_deref())?;
    session.begin_recording();
    let intake = CaptureIntake::new(source).start(session.aggregator())?;

    if !opts.quiet {
        eprintln!(
            "{} Press Enter to transcribe, Ctrl+C to finish.",
            "Recording.".green()
        );
    }

    let deadline = opts
        .duration_secs
        .map(|secs| tokio::time::Instant::now() + Duration::from_secs(secs));
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        let timer = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = timer => {
                if !opts.quiet {
                    eprintln!("Recording limit reached.");
                }
                break;
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(_)) => run_cycle(&controller, &opts).await?,
                    // stdin closed
                    Ok(None) => break,
                    Err(_) => break,
                }
            }
        }
    }

    intake.drain().await;

    // Final cycle over everything recorded
    run_cycle(&controller, &opts).await?;

    finish(&session, &config, &opts)
}

/// Run the recorded mode: one complete WAV blob from stdin.
pub async fn run_pipe_command(config: Config, opts: RunOptions) -> Result<()> {
    let recognizer = create_recognizer(&config, opts.quiet, opts.no_download).await?;
    let session = Arc::new(Session::new());
    let controller = SessionController::with_options(
        Arc::clone(&session),
        recognizer,
        config.recognize_options(),
    );

    let source = WavAudioSource::from_stdin()?;
    if !opts.quiet {
        eprintln!("Read {}ms of audio from stdin.", source.duration_ms());
    }

    session.begin_recording();
    let intake = CaptureIntake::new(source).start(session.aggregator())?;
    intake.drain().await;

    // A pipe with no usable audio is an error here, unlike live mode where
    // the user can simply record more
    let report = controller.transcribe().await?;
    print_cycle_report(&report, &opts);

    finish(&session, &config, &opts)
}

/// Run one cycle, treating recoverable errors as user messages.
async fn run_cycle<R: SpeechRecognizer>(
    controller: &SessionController<R>,
    opts: &RunOptions,
) -> Result<()> {
    if !opts.quiet {
        eprintln!("Transcribing...");
    }
    match controller.transcribe().await {
        Ok(report) => {
            print_cycle_report(&report, opts);
            Ok(())
        }
        // The session stays usable; previously accumulated text is untouched
        Err(e) if e.is_recoverable() => {
            eprintln!("{} {}", "warning:".yellow().bold(), e);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn print_cycle_report(report: &crate::session::CycleReport, opts: &RunOptions) {
    if !opts.quiet {
        eprintln!(
            "Detected language: {} with probability {:.2}",
            report.language.language, report.language.probability
        );
        if !report.appended.is_empty() {
            eprintln!("\"{}\"", report.appended.trim_end());
        }
        if opts.verbosity >= 1 {
            eprintln!("  [{} segments]", report.segment_count);
        }
    }
}

/// Print and export the final transcript.
fn finish(session: &Session, config: &Config, opts: &RunOptions) -> Result<()> {
    let transcript = session.transcript();
    if transcript.is_empty() {
        if !opts.quiet {
            eprintln!("No transcript produced.");
        }
        return Ok(());
    }

    println!("{}", transcript.trim_end());

    if opts.bullets {
        println!();
        for bullet in session.bullets() {
            println!("- {}", bullet);
        }
    }

    if let Some(path) = &opts.output {
        let export = session.export();
        let path = if path.is_dir() {
            path.join(&config.export.filename)
        } else {
            path.clone()
        };
        std::fs::write(&path, &export.bytes)?;
        if !opts.quiet {
            eprintln!("{} {}", "Saved transcript to".green(), path.display());
        }
    }

    Ok(())
}

/// Create the recognizer, handling model resolution and download.
async fn create_recognizer(
    config: &Config,
    quiet: bool,
    no_download: bool,
) -> Result<WhisperRecognizer> {
    let model = resolve_model_for_language(&config.engine.model, &config.engine.language, quiet);
    let path = ensure_model(&model, quiet, no_download).await?;

    if !quiet {
        eprintln!("Loading model '{}' ({})...", model, defaults::gpu_backend());
    }
    WhisperRecognizer::new(WhisperConfig {
        model_path: path,
        threads: config.engine.threads,
    })
}

/// Make sure the model file exists locally, downloading it if allowed.
async fn ensure_model(name: &str, quiet: bool, no_download: bool) -> Result<PathBuf> {
    if is_model_installed(name) {
        return Ok(model_path(name));
    }

    if no_download {
        return Err(VoxnoteError::ModelNotFound {
            path: model_path(name).display().to_string(),
        });
    }

    if get_model(name).is_none() {
        return Err(VoxnoteError::Other(format!(
            "Unknown model '{name}'. Run 'voxnote models list' to see available models."
        )));
    }

    download_model(name, !quiet).await
}

/// Resolve the model name based on the configured language.
///
/// Ensures a multilingual model is used when language is not English.
/// - `language="auto"` + `model="tiny.en"` → switch to `"tiny"`, warn
/// - `language="de"` + `model="tiny.en"` → switch to `"tiny"`, warn
/// - `language="en"` + `model="tiny.en"` → keep as-is
fn resolve_model_for_language(model: &str, language: &str, quiet: bool) -> String {
    let needs_multilingual =
        language == defaults::AUTO_LANGUAGE || (language != "en" && !language.is_empty());

    if needs_multilingual
        && model.ends_with(".en")
        && let Some(multilingual) = multilingual_variant(model)
    {
        if !quiet {
            eprintln!(
                "Switching model '{}' → '{}' (language='{}' needs multilingual model).",
                model, multilingual, language
            );
        }
        return multilingual.to_string();
    }
    model.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_model_auto_language_switches_english_model() {
        assert_eq!(resolve_model_for_language("tiny.en", "auto", true), "tiny");
        assert_eq!(resolve_model_for_language("base.en", "de", true), "base");
    }

    #[test]
    fn test_resolve_model_keeps_english_model_for_english() {
        assert_eq!(
            resolve_model_for_language("tiny.en", "en", true),
            "tiny.en"
        );
    }

    #[test]
    fn test_resolve_model_keeps_multilingual_models() {
        assert_eq!(resolve_model_for_language("tiny", "auto", true), "tiny");
        assert_eq!(resolve_model_for_language("base", "fr", true), "base");
    }

    #[tokio::test]
    async fn test_ensure_model_respects_no_download() {
        let result = ensure_model("definitely-not-installed", true, true).await;
        assert!(matches!(result, Err(VoxnoteError::ModelNotFound { .. })));
    }

    #[tokio::test]
    async fn test_ensure_model_rejects_unknown_names() {
        let result = ensure_model("not-a-real-model", true, false).await;
        assert!(matches!(result, Err(VoxnoteError::Other(_))));
    }
}
