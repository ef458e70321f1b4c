//! Pointer and keyboard interaction on the timeline.
//!
//! The state machine never touches the store directly. Each event yields
//! zero or more [`Intent`]s that the studio applies in order.

use serde::{Deserialize, Serialize};

use crate::model::region::dragged_start;
use crate::model::{RegionId, Track, TrackId};
use crate::timeline::hit::{hit_test, Hit};
use crate::timeline::viewport::Viewport;

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Seek(f64),
    Select { track_id: TrackId, region_id: RegionId },
    ClearSelection,
    BeginDrag,
    MoveRegion {
        track_id: TrackId,
        region_id: RegionId,
        start: f64,
    },
    CommitDrag,
    CancelDrag,
    DeleteSelected,
    DuplicateSelected,
    Undo,
    Redo,
    TogglePlay,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Pointer held on the ruler.
    Scrubbing,
    DraggingRegion {
        track_id: TrackId,
        region_id: RegionId,
        original_start: f64,
        /// Pointer x (view coordinates) when the drag began.
        origin_x: f64,
        moved: bool,
    },
}

/// A key press as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyEvent {
    /// `KeyboardEvent.key` style name: "a", "Delete", " ", "Escape".
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub repeat: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Parse a chord such as `ctrl+shift+z`, `cmd+d` or `space`.
    pub fn parse(chord: &str) -> Option<Self> {
        let mut event = KeyEvent::default();
        let mut key = None;
        for part in chord.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => event.ctrl = true,
                "cmd" | "meta" | "super" => event.meta = true,
                "shift" => event.shift = true,
                "alt" | "option" => event.alt = true,
                "space" => key = Some(" ".to_string()),
                "delete" | "del" => key = Some("Delete".to_string()),
                "backspace" => key = Some("Backspace".to_string()),
                "escape" | "esc" => key = Some("Escape".to_string()),
                "" => return None,
                _ => key = Some(part.to_string()),
            }
        }
        event.key = key?;
        Some(event)
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Default)]
pub struct Interaction {
    state: InteractionState,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == InteractionState::Idle
    }

    pub fn pointer_down(&mut self, tracks: &[Track], viewport: &Viewport, x: f64, y: f64) -> Vec<Intent> {
        match hit_test(tracks, viewport, x, y) {
            Hit::Ruler => {
                self.state = InteractionState::Scrubbing;
                vec![Intent::Seek(viewport.x_to_time(viewport.scroll_left() + x))]
            }
            Hit::Region { track_id, region_id } => {
                let original_start = tracks
                    .iter()
                    .find(|t| t.id == track_id)
                    .and_then(|t| t.region(&region_id))
                    .map_or(0.0, |r| r.start);
                self.state = InteractionState::DraggingRegion {
                    track_id,
                    region_id: region_id.clone(),
                    original_start,
                    origin_x: x,
                    moved: false,
                };
                vec![Intent::Select { track_id, region_id }, Intent::BeginDrag]
            }
            Hit::Lane { .. } | Hit::Empty => {
                self.state = InteractionState::Idle;
                vec![Intent::ClearSelection]
            }
        }
    }

    pub fn pointer_move(&mut self, viewport: &Viewport, x: f64, _y: f64) -> Vec<Intent> {
        match &mut self.state {
            InteractionState::Idle => Vec::new(),
            InteractionState::Scrubbing => {
                vec![Intent::Seek(viewport.x_to_time(viewport.scroll_left() + x))]
            }
            InteractionState::DraggingRegion {
                track_id,
                region_id,
                original_start,
                origin_x,
                moved,
            } => {
                let dx = x - *origin_x;
                if dx == 0.0 && !*moved {
                    return Vec::new();
                }
                *moved = true;
                vec![Intent::MoveRegion {
                    track_id: *track_id,
                    region_id: region_id.clone(),
                    start: dragged_start(*original_start, dx, viewport.zoom()),
                }]
            }
        }
    }

    pub fn pointer_up(&mut self) -> Vec<Intent> {
        match std::mem::take(&mut self.state) {
            InteractionState::DraggingRegion { .. } => vec![Intent::CommitDrag],
            _ => Vec::new(),
        }
    }

    /// Abandon whatever gesture is in progress.
    pub fn cancel(&mut self) -> Vec<Intent> {
        match std::mem::take(&mut self.state) {
            InteractionState::DraggingRegion { .. } => vec![Intent::CancelDrag],
            _ => Vec::new(),
        }
    }

    /// Map a shortcut to an intent.
    ///
    /// Edits and history steps end a region drag; the store commits the
    /// move before applying them.
    pub fn key_down(&mut self, event: &KeyEvent, has_selection: bool) -> Option<Intent> {
        let intent = self.shortcut(event, has_selection)?;
        if matches!(
            intent,
            Intent::Undo | Intent::Redo | Intent::DeleteSelected | Intent::DuplicateSelected
        ) {
            self.state = InteractionState::Idle;
        }
        Some(intent)
    }

    fn shortcut(&mut self, event: &KeyEvent, has_selection: bool) -> Option<Intent> {
        let key = event.key.as_str();
        if event.command() && !event.alt {
            return match key.to_ascii_lowercase().as_str() {
                "z" if event.shift => Some(Intent::Redo),
                "z" => Some(Intent::Undo),
                "y" => Some(Intent::Redo),
                "d" if has_selection && !event.repeat => Some(Intent::DuplicateSelected),
                _ => None,
            };
        }
        if event.repeat {
            return None;
        }
        match key {
            "Delete" | "Backspace" if has_selection => Some(Intent::DeleteSelected),
            " " | "Spacebar" => Some(Intent::TogglePlay),
            "Escape" => self.cancel().into_iter().next(),
            _ => None,
        }
    }
}
