//! Timeline viewport: zoom, scroll, auto-follow and the lane layout.
//!
//! Content coordinates start at the top-left of the full canvas; view
//! coordinates are relative to the visible window (`content - scroll`).

use crate::config::TimelineConfig;
use crate::model::project::project_end;
use crate::model::Track;

/// Pixels per second a fresh timeline opens with.
pub const DEFAULT_ZOOM: f64 = 50.0;
pub const MIN_ZOOM: f64 = 10.0;
pub const MAX_ZOOM: f64 = 500.0;

/// Canvas never gets narrower than this.
pub const MIN_CONTENT_WIDTH: f64 = 2000.0;
/// Empty time kept after the furthest region.
pub const END_MARGIN_SECONDS: f64 = 30.0;

/// Height of the ruler band above the first lane.
pub const RULER_HEIGHT: f64 = 50.0;
pub const TRACK_HEIGHT: f64 = 100.0;
/// Vertical gap between a lane edge and its regions.
pub const REGION_INSET: f64 = 10.0;

/// Follow pages when the playhead passes this fraction of the view width...
pub const FOLLOW_TRIGGER: f64 = 0.9;
/// ...and places it this far in from the left edge.
pub const FOLLOW_REANCHOR: f64 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: f64,
    scroll_left: f64,
    scroll_top: f64,
    width: f64,
    height: f64,
    auto_follow: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_config(&TimelineConfig::default())
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            scroll_left: 0.0,
            scroll_top: 0.0,
            width: width.max(1.0),
            height: height.max(1.0),
            auto_follow: true,
        }
    }

    pub fn from_config(config: &TimelineConfig) -> Self {
        let mut viewport = Self::new(config.view_width, config.view_height);
        viewport.set_zoom(config.zoom);
        viewport.auto_follow = config.auto_follow;
        viewport
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn scroll_left(&self) -> f64 {
        self.scroll_left
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn auto_follow(&self) -> bool {
        self.auto_follow
    }

    pub fn set_auto_follow(&mut self, enabled: bool) {
        self.auto_follow = enabled;
    }

    pub fn toggle_auto_follow(&mut self) -> bool {
        self.auto_follow = !self.auto_follow;
        self.auto_follow
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = clamp_zoom(zoom);
    }

    /// Change zoom while keeping the time under `anchor_x` (view coords) fixed.
    pub fn zoom_around(&mut self, zoom: f64, anchor_x: f64) {
        let anchor_time = self.x_to_time(self.scroll_left + anchor_x);
        let previous = self.zoom;
        self.zoom = clamp_zoom(zoom);
        if (self.zoom - previous).abs() > f64::EPSILON {
            self.scroll_left = (anchor_time * self.zoom - anchor_x).max(0.0);
        }
    }

    /// Multiply zoom by `factor` around `anchor_x`.
    pub fn zoom_by(&mut self, factor: f64, anchor_x: f64) {
        self.zoom_around(self.zoom * factor, anchor_x);
    }

    pub fn scroll_to(&mut self, left: f64, top: f64) {
        self.scroll_left = if left.is_nan() { 0.0 } else { left.max(0.0) };
        self.scroll_top = if top.is_nan() { 0.0 } else { top.max(0.0) };
    }

    // ---- coordinate mapping ----

    /// Content x of a time in seconds.
    pub fn time_to_x(&self, seconds: f64) -> f64 {
        seconds * self.zoom
    }

    /// Time at a content x, never negative.
    pub fn x_to_time(&self, x: f64) -> f64 {
        (x / self.zoom).max(0.0)
    }

    /// View point to content point.
    pub fn to_content(&self, x: f64, y: f64) -> (f64, f64) {
        (x + self.scroll_left, y + self.scroll_top)
    }

    pub fn content_width(&self, tracks: &[Track]) -> f64 {
        let needed = (project_end(tracks) + END_MARGIN_SECONDS) * self.zoom;
        self.width.max(MIN_CONTENT_WIDTH).max(needed)
    }

    pub fn content_height(&self, track_count: usize) -> f64 {
        self.height.max((track_count as f64 + 1.0) * TRACK_HEIGHT + 100.0)
    }

    /// Page the view so the playhead stays visible.
    ///
    /// Returns true when the scroll position changed.
    pub fn follow(&mut self, playhead_time: f64, playing: bool) -> bool {
        if !playing || !self.auto_follow {
            return false;
        }
        let playhead_x = self.time_to_x(playhead_time);
        if playhead_x > self.scroll_left + self.width * FOLLOW_TRIGGER {
            self.scroll_left = (playhead_x - self.width * FOLLOW_REANCHOR).max(0.0);
            return true;
        }
        false
    }
}

pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return DEFAULT_ZOOM;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Top of the lane at `index`, in content coordinates.
pub fn lane_top(index: usize) -> f64 {
    RULER_HEIGHT + index as f64 * TRACK_HEIGHT
}

/// Lane index under a content y, if any.
pub fn lane_at(y: f64, track_count: usize) -> Option<usize> {
    if y < RULER_HEIGHT {
        return None;
    }
    let index = ((y - RULER_HEIGHT) / TRACK_HEIGHT).floor() as usize;
    (index < track_count).then_some(index)
}
