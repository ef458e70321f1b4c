//! Session scripts
//!
//! One command per line; `#` starts a comment. Scripts drive a [`Studio`]
//! exactly as a host would, which makes them handy for reproducing a
//! session and for checking the scene it ends in.
//!
//! ```text
//! add-track synth Pad
//! select 1 0
//! key ctrl+d
//! advance 500
//! expect regions 1 6
//! ```

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, StudioError};
use crate::model::{TrackId, TrackType};
use crate::state::reducer::Action;
use crate::studio::Studio;
use crate::timeline::KeyEvent;

/// A parsed script line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddTrack { track_type: TrackType, name: Option<String> },
    DeleteTrack(TrackId),
    Volume(TrackId, f32),
    Pan(TrackId, f32),
    Mute(TrackId),
    Solo(TrackId),
    Fx(TrackId),
    /// Select by region position within the track.
    Select(TrackId, usize),
    Deselect,
    Click(f64, f64),
    Drag(f64, f64),
    Release,
    Key(KeyEvent),
    Delete,
    Duplicate,
    Undo,
    Redo,
    Bpm(f64),
    Rename(String),
    Play,
    Pause,
    Stop,
    Seek(f64),
    /// Deliver frames covering this many milliseconds.
    Advance(f64),
    Zoom(f64, f64),
    Scroll(f64),
    Save,
    Load,
    Expect(Expectation),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    Tracks(usize),
    Regions(TrackId, usize),
    Time(f64),
    Bpm(f64),
    Playing(bool),
    Selected(bool),
    Undo(usize),
}

/// Parse a whole script, reporting the first bad line.
pub fn parse(source: &str) -> Result<Vec<(usize, Command)>> {
    let mut commands = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let text = raw.split('#').next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }
        let command = parse_line(text).map_err(|reason| StudioError::Script { line, reason })?;
        commands.push((line, command));
    }
    Ok(commands)
}

fn parse_line(text: &str) -> std::result::Result<Command, String> {
    let mut words = text.split_whitespace();
    let verb = words.next().unwrap_or("");
    let args: Vec<&str> = words.collect();

    let command = match verb {
        "add-track" => {
            let track_type = match args.first() {
                Some(t) => parse_track_type(t)?,
                None => TrackType::default(),
            };
            let name = args.get(1..).map(|rest| rest.join(" ")).filter(|n| !n.is_empty());
            Command::AddTrack { track_type, name }
        }
        "delete-track" => Command::DeleteTrack(track_arg(&args, 0)?),
        "volume" => Command::Volume(track_arg(&args, 0)?, number(&args, 1)? as f32),
        "pan" => Command::Pan(track_arg(&args, 0)?, number(&args, 1)? as f32),
        "mute" => Command::Mute(track_arg(&args, 0)?),
        "solo" => Command::Solo(track_arg(&args, 0)?),
        "fx" => Command::Fx(track_arg(&args, 0)?),
        "select" => Command::Select(track_arg(&args, 0)?, count(&args, 1)?),
        "deselect" => Command::Deselect,
        "click" => Command::Click(number(&args, 0)?, number(&args, 1)?),
        "drag" => Command::Drag(number(&args, 0)?, number(&args, 1)?),
        "release" => Command::Release,
        "key" => {
            let chord = args.first().ok_or("key needs a chord, e.g. ctrl+z")?;
            Command::Key(KeyEvent::parse(chord).ok_or_else(|| format!("bad key chord '{}'", chord))?)
        }
        "delete" => Command::Delete,
        "duplicate" => Command::Duplicate,
        "undo" => Command::Undo,
        "redo" => Command::Redo,
        "bpm" => Command::Bpm(number(&args, 0)?),
        "rename" => Command::Rename(args.join(" ")),
        "play" => Command::Play,
        "pause" => Command::Pause,
        "stop" => Command::Stop,
        "seek" => Command::Seek(number(&args, 0)?),
        "advance" => Command::Advance(number(&args, 0)?),
        "zoom" => {
            let anchor = if args.len() > 1 { number(&args, 1)? } else { 0.0 };
            Command::Zoom(number(&args, 0)?, anchor)
        }
        "scroll" => Command::Scroll(number(&args, 0)?),
        "save" => Command::Save,
        "load" => Command::Load,
        "expect" => Command::Expect(parse_expectation(&args)?),
        other => return Err(format!("unknown command '{}'", other)),
    };
    Ok(command)
}

fn parse_expectation(args: &[&str]) -> std::result::Result<Expectation, String> {
    let what = args.first().copied().unwrap_or("");
    let rest = args.get(1..).unwrap_or(&[]);
    Ok(match what {
        "tracks" => Expectation::Tracks(count(rest, 0)?),
        "regions" => Expectation::Regions(track_arg(rest, 0)?, count(rest, 1)?),
        "time" => Expectation::Time(number(rest, 0)?),
        "bpm" => Expectation::Bpm(number(rest, 0)?),
        "playing" => Expectation::Playing(true),
        "paused" => Expectation::Playing(false),
        "selection" => Expectation::Selected(true),
        "no-selection" => Expectation::Selected(false),
        "undo" => Expectation::Undo(count(rest, 0)?),
        other => return Err(format!("unknown expectation '{}'", other)),
    })
}

fn parse_track_type(word: &str) -> std::result::Result<TrackType, String> {
    serde_json::from_value(serde_json::Value::String(word.to_ascii_lowercase()))
        .map_err(|_| format!("unknown track type '{}'", word))
}

fn arg<'a>(args: &[&'a str], index: usize) -> std::result::Result<&'a str, String> {
    args.get(index)
        .copied()
        .ok_or_else(|| format!("missing argument {}", index + 1))
}

fn number(args: &[&str], index: usize) -> std::result::Result<f64, String> {
    let word = arg(args, index)?;
    match word.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(format!("'{}' is not a finite number", word)),
    }
}

fn count(args: &[&str], index: usize) -> std::result::Result<usize, String> {
    let word = arg(args, index)?;
    word.parse().map_err(|_| format!("'{}' is not a count", word))
}

fn track_arg(args: &[&str], index: usize) -> std::result::Result<TrackId, String> {
    let word = arg(args, index)?;
    word.parse()
        .map(TrackId)
        .map_err(|_| format!("'{}' is not a track id", word))
}

/// Runs scripts against a studio, keeping a synthetic frame clock.
#[derive(Debug)]
pub struct ScriptRunner {
    studio: Studio,
    frame_ms: f64,
    frame_step_ms: f64,
}

impl ScriptRunner {
    pub fn new(studio: Studio) -> Self {
        let frame_step_ms = studio.config().transport.frame_interval_ms as f64;
        Self {
            studio,
            frame_ms: 0.0,
            frame_step_ms,
        }
    }

    pub fn studio(&self) -> &Studio {
        &self.studio
    }

    pub fn into_studio(self) -> Studio {
        self.studio
    }

    pub fn run_file(&mut self, path: &Path) -> Result<usize> {
        let source = fs::read_to_string(path)?;
        self.run_str(&source)
    }

    /// Run every line; returns how many commands ran.
    pub fn run_str(&mut self, source: &str) -> Result<usize> {
        let commands = parse(source)?;
        for (line, command) in &commands {
            debug!(line, ?command, "script");
            self.execute(command).map_err(|e| match e {
                StudioError::Script { line: 0, reason } => StudioError::Script { line: *line, reason },
                e @ StudioError::Script { .. } => e,
                other => StudioError::Script {
                    line: *line,
                    reason: other.to_string(),
                },
            })?;
        }
        Ok(commands.len())
    }

    fn execute(&mut self, command: &Command) -> Result<()> {
        let s = &mut self.studio;
        match command {
            Command::AddTrack { track_type, name } => {
                s.dispatch(Action::AddTrack {
                    name: name.clone(),
                    track_type: *track_type,
                })?;
            }
            Command::DeleteTrack(track_id) => {
                s.dispatch(Action::DeleteTrack { track_id: *track_id })?;
            }
            Command::Volume(track_id, volume) => {
                s.dispatch(Action::SetVolume {
                    track_id: *track_id,
                    volume: *volume,
                })?;
            }
            Command::Pan(track_id, pan) => {
                s.dispatch(Action::SetPan {
                    track_id: *track_id,
                    pan: *pan,
                })?;
            }
            Command::Mute(track_id) => {
                s.dispatch(Action::ToggleMute { track_id: *track_id })?;
            }
            Command::Solo(track_id) => {
                s.dispatch(Action::ToggleSolo { track_id: *track_id })?;
            }
            Command::Fx(track_id) => {
                s.dispatch(Action::ToggleFx { track_id: *track_id })?;
            }
            Command::Select(track_id, index) => {
                let region_id = s
                    .store()
                    .track(*track_id)
                    .ok_or(StudioError::TrackNotFound { id: track_id.0 })?
                    .regions
                    .get(*index)
                    .map(|r| r.id.clone())
                    .ok_or_else(|| StudioError::RegionNotFound {
                        id: format!("#{} on track {}", index, track_id),
                    })?;
                s.store_mut().select(*track_id, &region_id)?;
            }
            Command::Deselect => s.store_mut().clear_selection(),
            Command::Click(x, y) => {
                s.pointer_down(*x, *y);
            }
            Command::Drag(x, y) => {
                s.pointer_move(*x, *y);
            }
            Command::Release => {
                s.pointer_up();
            }
            Command::Key(event) => {
                s.key_down(event);
                s.key_up(event);
            }
            Command::Delete => s.store_mut().delete_selected()?,
            Command::Duplicate => {
                s.store_mut().duplicate_selected()?;
            }
            Command::Undo => {
                s.store_mut().undo();
            }
            Command::Redo => {
                s.store_mut().redo();
            }
            Command::Bpm(bpm) => s.set_bpm(*bpm),
            Command::Rename(name) => s.store_mut().rename(name.clone()),
            Command::Play => {
                s.play();
                s.on_frame(self.frame_ms);
            }
            Command::Pause => s.pause(),
            Command::Stop => s.stop(),
            Command::Seek(t) => s.seek(*t),
            Command::Advance(ms) => {
                let end = self.frame_ms + ms.max(0.0);
                while self.frame_ms < end {
                    self.frame_ms = (self.frame_ms + self.frame_step_ms).min(end);
                    s.on_frame(self.frame_ms);
                }
            }
            Command::Zoom(zoom, anchor) => s.viewport_mut().zoom_around(*zoom, *anchor),
            Command::Scroll(x) => {
                let top = s.viewport().scroll_top();
                s.viewport_mut().scroll_to(*x, top);
            }
            Command::Save => s.save()?,
            Command::Load => {
                if !s.load()? {
                    return Err(StudioError::Storage {
                        reason: "nothing saved yet".to_string(),
                    });
                }
            }
            Command::Expect(expectation) => check(s, expectation)?,
        }
        Ok(())
    }
}

fn check(studio: &Studio, expectation: &Expectation) -> Result<()> {
    let store = studio.store();
    let (ok, actual) = match expectation {
        Expectation::Tracks(n) => (store.tracks().len() == *n, store.tracks().len().to_string()),
        Expectation::Regions(track_id, n) => {
            let found = store.track(*track_id).map(|t| t.regions.len());
            (found == Some(*n), format!("{:?}", found))
        }
        Expectation::Time(t) => {
            let now = studio.current_time();
            ((now - t).abs() < 1e-6, format!("{:.3}", now))
        }
        Expectation::Bpm(bpm) => (store.bpm() == *bpm, store.bpm().to_string()),
        Expectation::Playing(playing) => (
            studio.is_playing() == *playing,
            if studio.is_playing() { "playing" } else { "paused" }.to_string(),
        ),
        Expectation::Selected(selected) => (
            store.selection().is_some() == *selected,
            format!("{:?}", store.selection()),
        ),
        Expectation::Undo(n) => {
            let depth = store.history().undo_count();
            (depth == *n, depth.to_string())
        }
    };
    if ok {
        Ok(())
    } else {
        // line is filled in by the runner
        Err(StudioError::Script {
            line: 0,
            reason: format!("expected {:?}, found {}", expectation, actual),
        })
    }
}
