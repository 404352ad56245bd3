use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::io::IsTerminal;
use voxnote::app::{RunOptions, run_live_command, run_pipe_command};
use voxnote::audio::capture::list_devices;
use voxnote::cli::{Cli, Commands, ModelsAction};
use voxnote::config::Config;
use voxnote::models::catalog::list_models;
use voxnote::models::download::{download_model, format_model_info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        None => {
            let config = load_config(&cli)?;
            let opts = RunOptions {
                output: cli.output.clone(),
                bullets: cli.bullets,
                duration_secs: cli.duration,
                quiet: cli.quiet,
                verbosity: cli.verbose,
                no_download: cli.no_download,
            };

            if std::io::stdin().is_terminal() {
                // Mic mode
                run_live_command(config, opts).await?;
            } else {
                // Pipe mode: stdin has WAV data
                run_pipe_command(config, opts).await?;
            }
        }
        Some(Commands::Devices) => {
            for device in list_devices()? {
                println!("{}", device);
            }
        }
        Some(Commands::Models { action }) => match action {
            ModelsAction::List => {
                for model in list_models() {
                    println!("{}", format_model_info(model));
                }
            }
            ModelsAction::Install { name } => {
                download_model(&name, !cli.quiet).await?;
            }
        },
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "voxnote", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Load configuration, layering file < environment < CLI flags.
fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path)?,
            None => Config::default(),
        },
    };

    let mut config = config.with_env_overrides();

    if let Some(device) = &cli.device {
        config.audio.device = Some(device.clone());
    }
    if let Some(model) = &cli.model {
        config.engine.model = model.clone();
    }
    if let Some(language) = &cli.language {
        config.engine.language = language.clone();
    }
    if let Some(beam_size) = cli.beam_size {
        config.engine.beam_size = beam_size;
    }

    Ok(config)
}

/// Initialize tracing to stderr; RUST_LOG overrides the verbosity flag.
fn init_tracing(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
