//! CLI Script Tests
//!
//! Session scripts loaded from disk and the scene command's file output.

use std::fs;
use std::io::Write;
use std::sync::Arc;

use tempfile::{tempdir, NamedTempFile};

use daw_shell::ai::AssistService;
use daw_shell::cli::commands;
use daw_shell::cli::script::ScriptRunner;
use daw_shell::cli::SceneFormat;
use daw_shell::model::TrackId;
use daw_shell::{Studio, StudioConfig, StudioError};

fn runner() -> ScriptRunner {
    let studio = Studio::with_service(StudioConfig::default(), Arc::new(AssistService::unconfigured())).unwrap();
    ScriptRunner::new(studio)
}

fn script_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_script_file_edits_and_mixes() {
    let file = script_file(
        "# build a small arrangement\n\
         rename Night Drive\n\
         bpm 96\n\
         add-track synth Pad\n\
         volume 4 0.5\n\
         pan 4 -0.4\n\
         solo 1\n\
         expect tracks 4\n\
         expect undo 1\n",
    );

    let mut r = runner();
    assert_eq!(r.run_file(file.path()).unwrap(), 8);

    let studio = r.studio();
    assert_eq!(studio.store().name(), "Night Drive");
    assert_eq!(studio.store().bpm(), 96.0);

    let mixer = studio.mixer();
    let pad = mixer.iter().find(|s| s.track_id == TrackId(4)).unwrap();
    assert_eq!(pad.volume_percent, 50);
    assert_eq!(pad.pan_label, "L40");
    assert!(pad.effectively_muted);
    assert!(!mixer[0].effectively_muted);
}

#[test]
fn test_script_pointer_session() {
    let file = script_file(
        "click 100 100\n\
         drag 200 100\n\
         release\n\
         expect selection\n\
         expect undo 1\n\
         click 250 20\n\
         expect time 5\n\
         release\n\
         click 5000 500\n\
         expect no-selection\n",
    );

    let mut r = runner();
    r.run_file(file.path()).unwrap();
    assert_eq!(r.studio().store().tracks()[0].regions[0].start, 3.0);
}

#[test]
fn test_script_save_and_load() {
    let mut r = runner();
    r.run_str("save\ndelete-track 1\nexpect tracks 2\nload\nexpect tracks 3\nundo\nexpect tracks 2")
        .unwrap();
}

#[test]
fn test_load_without_save_fails() {
    let err = runner().run_str("bpm 90\nload").unwrap_err();
    match err {
        StudioError::Script { line, reason } => {
            assert_eq!(line, 2);
            assert!(reason.contains("nothing saved"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_missing_script_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = runner().run_file(&dir.path().join("absent.txt")).unwrap_err();
    assert_eq!(err.error_code(), "IO_ERROR");
}

#[test]
fn test_scene_command_writes_svg() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("timeline.svg");
    let script = script_file("delete-track 2\n");

    commands::render_scene(
        &StudioConfig::default(),
        SceneFormat::Svg,
        Some(4.0),
        Some(100.0),
        Some(script.path()),
        Some(&out),
    )
    .unwrap();

    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Drums 1"));
    assert!(!svg.contains("Bass 1"));
}

#[test]
fn test_scene_command_writes_json() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("timeline.json");

    commands::render_scene(&StudioConfig::default(), SceneFormat::Json, None, None, None, Some(&out)).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let ops = value["commands"].as_array().unwrap();
    assert_eq!(ops[0]["op"], "clear");
    assert_eq!(ops.last().unwrap()["op"], "polygon");
}
