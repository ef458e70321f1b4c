//! Timeline scene description.
//!
//! [`render_scene`] turns project state into an ordered list of
//! [`DrawCommand`]s. It is pure: the same inputs always produce the same
//! scene. Backends replay the commands (see [`Scene::to_svg`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::project::format_duration;
use crate::model::track::{any_solo, is_effectively_muted};
use crate::model::Track;
use crate::state::Selection;
use crate::timeline::hit::{region_rect, Rect};
use crate::timeline::viewport::{lane_top, Viewport, RULER_HEIGHT, TRACK_HEIGHT};
use crate::timeline::waveform;

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: byte(6)?,
            }),
            _ => None,
        }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Opacity in `0.0..=1.0`.
    pub fn opacity(&self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// `#rrggbb`, ignoring alpha.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 0xff {
            write!(f, "{}", self.to_hex())
        } else {
            write!(f, "{}{:02x}", self.to_hex(), self.a)
        }
    }
}

pub const BACKGROUND: Color = Color::rgb(0x0a, 0x0a, 0x0f);
pub const GRID: Color = Color::rgb(0x25, 0x25, 0x40);
pub const BAR_LINE: Color = Color::rgb(0x3a, 0x3a, 0x5c);
pub const LANE: Color = Color::rgb(0x14, 0x14, 0x20);
pub const LANE_ALT: Color = Color::rgb(0x18, 0x18, 0x26);
pub const RULER: Color = Color::rgb(0x0f, 0x0f, 0x18);
pub const RULER_TEXT: Color = Color::rgb(0x88, 0x88, 0xa0);
pub const MUTED: Color = Color::rgb(0x55, 0x55, 0x66);
pub const SELECTED: Color = Color::rgb(0xff, 0xff, 0xff);
pub const PLAYHEAD: Color = Color::rgb(0x00, 0xff, 0x88);
/// Used when a track color fails to parse.
pub const FALLBACK_TRACK: Color = Color::rgb(0x00, 0xe7, 0xff);

/// Region fill alpha (`#rrggbb40`).
const REGION_FILL_ALPHA: u8 = 0x40;
const REGION_RADIUS: f64 = 4.0;
const BEATS_PER_BAR: u32 = 4;
/// Ruler labels are spaced at least this many pixels apart.
const MIN_LABEL_SPACING: f64 = 80.0;
const RULER_STEPS: [f64; 9] = [1.0, 2.0, 5.0, 10.0, 15.0, 30.0, 60.0, 120.0, 300.0];
/// Beat lines closer than this are skipped, leaving only bars.
const MIN_BEAT_SPACING: f64 = 4.0;
const PLAYHEAD_CAP: f64 = 6.0;
const PLAYHEAD_CAP_HEIGHT: f64 = 10.0;

/// One drawing instruction, in content coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        color: Color,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    RoundRect {
        rect: Rect,
        radius: f64,
        fill: Option<Color>,
        stroke: Option<Color>,
        stroke_width: f64,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        color: Color,
        width: f64,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        color: Color,
        width: f64,
    },
    Polygon {
        points: Vec<(f64, f64)>,
        color: Color,
    },
    Text {
        at: (f64, f64),
        text: String,
        color: Color,
        size: f64,
    },
    /// Clip following commands to a rounded rectangle until `PopClip`.
    PushClip {
        rect: Rect,
        radius: f64,
    },
    PopClip,
}

/// A complete timeline frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter()
    }
}

/// Everything the renderer reads.
#[derive(Debug, Clone, Copy)]
pub struct SceneInput<'a> {
    pub tracks: &'a [Track],
    pub current_time: f64,
    pub bpm: f64,
    pub selection: Option<&'a Selection>,
    pub viewport: &'a Viewport,
}

/// Build the scene for one frame.
pub fn render_scene(input: &SceneInput<'_>) -> Scene {
    let viewport = input.viewport;
    let width = viewport.content_width(input.tracks);
    let height = viewport.content_height(input.tracks.len());
    let mut scene = Scene::new(width, height);

    scene.push(DrawCommand::Clear { color: BACKGROUND });
    draw_grid(&mut scene, input.bpm, viewport.zoom());
    draw_lanes(&mut scene, input);
    draw_ruler(&mut scene, viewport.zoom());
    draw_playhead(&mut scene, viewport.time_to_x(input.current_time));
    scene
}

fn draw_grid(scene: &mut Scene, bpm: f64, zoom: f64) {
    if bpm <= 0.0 {
        return;
    }
    let beat_px = 60.0 / bpm * zoom;
    let bar_only = beat_px < MIN_BEAT_SPACING;
    let mut beat = 0u32;
    loop {
        let x = f64::from(beat) * beat_px;
        if x >= scene.width {
            break;
        }
        let is_bar = beat % BEATS_PER_BAR == 0;
        if is_bar || !bar_only {
            let (from, to) = ((x, 0.0), (x, scene.height));
            scene.push(DrawCommand::Line {
                from,
                to,
                color: if is_bar { BAR_LINE } else { GRID },
                width: 1.0,
            });
        }
        beat += 1;
    }
}

fn draw_lanes(scene: &mut Scene, input: &SceneInput<'_>) {
    let soloing = any_solo(input.tracks);
    let zoom = input.viewport.zoom();

    for (index, track) in input.tracks.iter().enumerate() {
        let top = lane_top(index);
        scene.push(DrawCommand::FillRect {
            rect: Rect::new(0.0, top, scene.width, TRACK_HEIGHT),
            color: if index % 2 == 0 { LANE } else { LANE_ALT },
        });
        scene.push(DrawCommand::Line {
            from: (0.0, top + TRACK_HEIGHT),
            to: (scene.width, top + TRACK_HEIGHT),
            color: GRID,
            width: 1.0,
        });

        let muted = is_effectively_muted(track, soloing);
        let base = if muted {
            MUTED
        } else {
            Color::from_hex(&track.color).unwrap_or(FALLBACK_TRACK)
        };

        for region in &track.regions {
            let rect = region_rect(index, region, zoom);
            let selected = input
                .selection
                .map_or(false, |s| s.track_id == track.id && s.region_id == region.id);

            scene.push(DrawCommand::PushClip {
                rect,
                radius: REGION_RADIUS,
            });
            scene.push(DrawCommand::RoundRect {
                rect,
                radius: REGION_RADIUS,
                fill: Some(base.with_alpha(REGION_FILL_ALPHA)),
                stroke: None,
                stroke_width: 0.0,
            });
            let centre = rect.y + rect.h / 2.0;
            let points = waveform::points(region.waveform_seed, rect.w, centre)
                .into_iter()
                .map(|(x, y)| (rect.x + x, y))
                .collect();
            scene.push(DrawCommand::Polyline {
                points,
                color: base,
                width: 1.0,
            });
            scene.push(DrawCommand::Text {
                at: (rect.x + 6.0, rect.y + 14.0),
                text: region.name.clone(),
                color: SELECTED.with_alpha(0xcc),
                size: 11.0,
            });
            scene.push(DrawCommand::PopClip);

            scene.push(DrawCommand::RoundRect {
                rect,
                radius: REGION_RADIUS,
                fill: None,
                stroke: Some(if selected { SELECTED } else { base }),
                stroke_width: if selected { 2.0 } else { 1.0 },
            });
        }
    }
}

/// Smallest step (seconds) that keeps labels readable at `zoom`.
pub fn ruler_step(zoom: f64) -> f64 {
    RULER_STEPS
        .iter()
        .copied()
        .find(|step| step * zoom >= MIN_LABEL_SPACING)
        .unwrap_or(RULER_STEPS[RULER_STEPS.len() - 1])
}

fn draw_ruler(scene: &mut Scene, zoom: f64) {
    scene.push(DrawCommand::FillRect {
        rect: Rect::new(0.0, 0.0, scene.width, RULER_HEIGHT),
        color: RULER,
    });
    scene.push(DrawCommand::Line {
        from: (0.0, RULER_HEIGHT),
        to: (scene.width, RULER_HEIGHT),
        color: GRID,
        width: 1.0,
    });

    let step = ruler_step(zoom);
    let mut n = 0u32;
    loop {
        let seconds = f64::from(n) * step;
        let x = seconds * zoom;
        if x >= scene.width {
            break;
        }
        scene.push(DrawCommand::Line {
            from: (x, RULER_HEIGHT - 12.0),
            to: (x, RULER_HEIGHT),
            color: RULER_TEXT,
            width: 1.0,
        });
        scene.push(DrawCommand::Text {
            at: (x + 4.0, RULER_HEIGHT - 16.0),
            text: format_duration(seconds),
            color: RULER_TEXT,
            size: 10.0,
        });
        n += 1;
    }
}

fn draw_playhead(scene: &mut Scene, x: f64) {
    scene.push(DrawCommand::Line {
        from: (x, 0.0),
        to: (x, scene.height),
        color: PLAYHEAD,
        width: 2.0,
    });
    scene.push(DrawCommand::Polygon {
        points: vec![(x - PLAYHEAD_CAP, 0.0), (x + PLAYHEAD_CAP, 0.0), (x, PLAYHEAD_CAP_HEIGHT)],
        color: PLAYHEAD,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{demo_tracks, TrackId};

    fn scene_for(tracks: &[Track], selection: Option<&Selection>, time: f64) -> Scene {
        let viewport = Viewport::new(1000.0, 400.0);
        render_scene(&SceneInput {
            tracks,
            current_time: time,
            bpm: 120.0,
            selection,
            viewport: &viewport,
        })
    }

    fn region_outlines(scene: &Scene) -> Vec<(Color, f64)> {
        scene
            .iter()
            .filter_map(|c| match c {
                DrawCommand::RoundRect {
                    fill: None,
                    stroke: Some(color),
                    stroke_width,
                    ..
                } => Some((*color, *stroke_width)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_color_hex() {
        let c = Color::from_hex("#ff4466").unwrap();
        assert_eq!(c, Color::rgb(0xff, 0x44, 0x66));
        assert_eq!(c.with_alpha(0x40).to_string(), "#ff446640");
        assert!(Color::from_hex("ff4466").is_none());
        assert!(Color::from_hex("#ff44").is_none());
    }

    #[test]
    fn test_scene_is_deterministic() {
        let tracks = demo_tracks();
        assert_eq!(scene_for(&tracks, None, 3.0), scene_for(&tracks, None, 3.0));
    }

    #[test]
    fn test_playhead_is_last() {
        let scene = scene_for(&demo_tracks(), None, 2.0);
        match scene.commands.last() {
            Some(DrawCommand::Polygon { points, color }) => {
                assert_eq!(*color, PLAYHEAD);
                assert_eq!(points[2], (100.0, 10.0));
            }
            other => panic!("unexpected last command {:?}", other),
        }
    }

    #[test]
    fn test_selected_region_is_highlighted() {
        let tracks = demo_tracks();
        let selection = Selection {
            track_id: TrackId(2),
            region_id: tracks[1].regions[3].id.clone(),
        };
        let outlines = region_outlines(&scene_for(&tracks, Some(&selection), 0.0));
        assert_eq!(outlines.len(), 15);
        assert_eq!(outlines.iter().filter(|(c, _)| *c == SELECTED).count(), 1);
        assert_eq!(outlines[8], (SELECTED, 2.0));
    }

    #[test]
    fn test_solo_greys_out_other_tracks() {
        let mut tracks = demo_tracks();
        tracks[0].solo = true;
        let outlines = region_outlines(&scene_for(&tracks, None, 0.0));
        assert!(outlines[..5].iter().all(|(c, _)| *c != MUTED));
        assert!(outlines[5..].iter().all(|(c, _)| *c == MUTED));
    }

    #[test]
    fn test_grid_spacing_follows_tempo() {
        let scene = scene_for(&[], None, 0.0);
        let xs: Vec<f64> = scene
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Line { from, to, .. } if from.1 == 0.0 && to.1 == scene.height => {
                    Some(from.0)
                }
                _ => None,
            })
            .collect();
        // 120 bpm at 50 px/s: a beat every 25 px
        assert_eq!(xs[1] - xs[0], 25.0);
    }

    #[test]
    fn test_ruler_step() {
        assert_eq!(ruler_step(50.0), 2.0);
        assert_eq!(ruler_step(100.0), 1.0);
        assert_eq!(ruler_step(10.0), 10.0);
    }
}
