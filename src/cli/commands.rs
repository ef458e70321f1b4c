//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::ai::{AssistService, MusicConcept, MusicConceptParams, MISSING_KEY_MESSAGE};
use crate::cli::script::ScriptRunner;
use crate::cli::SceneFormat;
use crate::config::StudioConfig;
use crate::error::{Result, StudioError};
use crate::studio::Studio;
use crate::ui::keyboard::{self, VirtualKeyboard};

/// Studio for commands that never talk to the model.
fn offline_studio(config: &StudioConfig) -> Result<Studio> {
    Studio::with_service(config.clone(), Arc::new(AssistService::unconfigured()))
}

fn emit(out: Option<&Path>, contents: &str) -> Result<()> {
    match out {
        Some(path) => {
            fs::write(path, contents)?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", contents),
    }
    Ok(())
}

/// Render the timeline as SVG or as the raw draw list.
pub fn render_scene(
    config: &StudioConfig,
    format: SceneFormat,
    time: Option<f64>,
    zoom: Option<f64>,
    script: Option<&Path>,
    out: Option<&Path>,
) -> Result<()> {
    let mut studio = offline_studio(config)?;
    if let Some(path) = script {
        let mut runner = ScriptRunner::new(studio);
        let ran = runner.run_file(path)?;
        info!(commands = ran, "script finished: {}", path.display());
        studio = runner.into_studio();
    }
    if let Some(zoom) = zoom {
        studio.viewport_mut().set_zoom(zoom);
    }
    if let Some(time) = time {
        studio.seek(time);
    }

    let scene = studio.scene();
    info!(commands = scene.len(), "scene rendered");
    let contents = match format {
        SceneFormat::Svg => scene.to_svg(),
        SceneFormat::Json => serde_json::to_string_pretty(&scene)?,
    };
    emit(out, &contents)
}

/// Run a session script and summarize the project it leaves behind.
pub fn run_script(config: &StudioConfig, path: &Path) -> Result<()> {
    info!("Running script: {}", path.display());

    let mut runner = ScriptRunner::new(offline_studio(config)?);
    let ran = runner.run_file(path)?;
    let studio = runner.studio();
    let store = studio.store();
    let stats = studio.stats();

    println!("Ran {} commands", ran);
    println!("Project: {}", store.name());
    println!("Tracks: {}  Duration: {}  BPM: {}", stats.track_count, stats.duration, stats.bpm);
    println!("Playhead: {}", crate::engine::format_time(studio.current_time()));
    println!();

    for strip in studio.mixer() {
        let flags = format!(
            "{}{}{}",
            if strip.muted { "M" } else { "-" },
            if strip.solo { "S" } else { "-" },
            if strip.fx_enabled { "F" } else { "-" },
        );
        let regions = store.track(strip.track_id).map_or(0, |t| t.regions.len());
        println!(
            "  {:>3}  {:<16} vol {:>3}%  pan {:<4} {}  {} regions{}",
            strip.track_id,
            strip.name,
            strip.volume_percent,
            strip.pan_label,
            flags,
            regions,
            if strip.effectively_muted { "  (silent)" } else { "" }
        );
    }

    let labels = store.history().undo_labels();
    if !labels.is_empty() {
        println!();
        println!("History (most recent first):");
        for label in labels {
            println!("  {}", label);
        }
    }

    Ok(())
}

/// A missing key is a displayable outcome, the same text the panel shows.
fn missing_key_inline(result: Result<String>) -> Result<String> {
    match result {
        Err(StudioError::MissingCredential) => Ok(MISSING_KEY_MESSAGE.to_string()),
        other => other,
    }
}

pub async fn lyrics(config: &StudioConfig, prompt: &str) -> Result<()> {
    let service = AssistService::from_config(&config.ai)?;
    let text = missing_key_inline(service.generate_lyrics(prompt).await)?;
    println!("{}", text);
    Ok(())
}

pub async fn voice(config: &StudioConfig, description: &str) -> Result<()> {
    let service = AssistService::from_config(&config.ai)?;
    let text = missing_key_inline(service.generate_voice_profile_description(description).await)?;
    println!("{}", text);
    Ok(())
}

pub async fn concept(config: &StudioConfig, params: &MusicConceptParams) -> Result<()> {
    let service = AssistService::from_config(&config.ai)?;
    match service.generate_music_concept(params).await {
        Ok(Some(concept)) => print_concept(&concept),
        Ok(None) => println!("No concept generated."),
        Err(StudioError::MissingCredential) => println!("{}", MISSING_KEY_MESSAGE),
        Err(e) => return Err(e),
    }
    Ok(())
}

fn print_concept(concept: &MusicConcept) {
    println!("{}", concept.concept_name);
    match &concept.time_signature {
        Some(signature) => println!("BPM: {}  Key: {}  Time: {}", concept.bpm, concept.key, signature),
        None => println!("BPM: {}  Key: {}", concept.bpm, concept.key),
    }
    println!();
    println!("Instrumentation:");
    for item in &concept.instrumentation {
        println!("  - {}", item);
    }
    println!("Structure:");
    for part in &concept.structure {
        println!("  - {}", part);
    }
    println!("Production tips:");
    for tip in &concept.production_tips {
        println!("  - {}", tip);
    }
}

/// Print which computer key plays which note.
pub fn keys(octave: Option<u8>) {
    let mut piano = VirtualKeyboard::new();
    if let Some(target) = octave {
        while piano.octave() < target && piano.octave() < keyboard::MAX_OCTAVE {
            piano.octave_up();
        }
        while piano.octave() > target && piano.octave() > keyboard::MIN_OCTAVE {
            piano.octave_down();
        }
    }

    println!("Octave {}", piano.octave());
    println!("{:<4} {:<5} {:<5} {:>9}", "Key", "Note", "MIDI", "Hz");
    for key in keyboard::NOTE_MAP.iter() {
        if let Some(note) = piano.press(key.trigger) {
            println!(
                "{:<4} {:<5} {:<5} {:>9.2}",
                note.trigger, note.name, note.midi, note.frequency
            );
        }
        piano.release(key.trigger);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_becomes_message() {
        let text = missing_key_inline(Err(StudioError::MissingCredential)).unwrap();
        assert_eq!(text, MISSING_KEY_MESSAGE);
    }

    #[test]
    fn test_other_errors_still_propagate() {
        let err = missing_key_inline(Err(StudioError::AiRequest {
            reason: "timeout".to_string(),
        }))
        .unwrap_err();
        assert!(matches!(err, StudioError::AiRequest { .. }));
    }

    #[tokio::test]
    async fn test_generators_succeed_without_key() {
        let config = StudioConfig::default();
        assert!(config.ai.api_key.is_none());

        lyrics(&config, "city lights").await.unwrap();
        voice(&config, "warm baritone").await.unwrap();
        concept(&config, &MusicConceptParams::default()).await.unwrap();
    }
}
