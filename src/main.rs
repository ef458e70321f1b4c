//! DAW Shell CLI
//!
//! Command-line interface for the headless studio.

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use daw_shell::ai::MusicConceptParams;
use daw_shell::cli::{commands, Cli, Commands};
use daw_shell::config::StudioConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so rendered output can be piped
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    info!("DAW Shell v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => StudioConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => StudioConfig::from_env(),
    };
    config.validate().context("invalid configuration")?;

    match cli.command {
        Some(cmd) => handle_command(&config, cmd).await,
        None => {
            println!("DAW Shell v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

async fn handle_command(config: &StudioConfig, cmd: Commands) -> anyhow::Result<()> {
    let result = match cmd {
        Commands::Scene {
            format,
            time,
            zoom,
            script,
            out,
        } => commands::render_scene(config, format, time, zoom, script.as_deref(), out.as_deref()),
        Commands::Script { path } => commands::run_script(config, &path),
        Commands::Lyrics { prompt } => commands::lyrics(config, &prompt).await,
        Commands::Voice { description } => commands::voice(config, &description).await,
        Commands::Concept {
            genre,
            mood,
            tempo,
            time_signature,
            key,
            instrumentation,
            arrangement,
            description,
        } => {
            let params = MusicConceptParams {
                genre,
                mood,
                tempo,
                time_signature,
                key,
                instrumentation,
                arrangement,
                description,
            };
            commands::concept(config, &params).await
        }
        Commands::Keys { octave } => {
            commands::keys(octave);
            Ok(())
        }
    };

    if let Err(e) = &result {
        eprintln!("{} ({})", e, e.error_code());
        if let Some(hint) = e.recovery_suggestion() {
            eprintln!("hint: {}", hint);
        }
    }
    result.map_err(anyhow::Error::from)
}
