//! Geometry shared by the renderer and pointer hit testing.

use serde::Serialize;

use crate::model::{Region, RegionId, Track, TrackId};
use crate::timeline::viewport::{lane_at, lane_top, Viewport, REGION_INSET, RULER_HEIGHT, TRACK_HEIGHT};

/// Axis-aligned rectangle in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }
}

/// Where a region is drawn for the lane at `lane_index`.
pub fn region_rect(lane_index: usize, region: &Region, zoom: f64) -> Rect {
    Rect::new(
        region.start * zoom,
        lane_top(lane_index) + REGION_INSET,
        region.duration * zoom,
        TRACK_HEIGHT - 2.0 * REGION_INSET,
    )
}

/// What lies under a pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum Hit {
    /// The time ruler band.
    Ruler,
    Region { track_id: TrackId, region_id: RegionId },
    /// A lane outside any region.
    Lane { track_id: TrackId },
    /// Below the last lane.
    Empty,
}

/// Hit test a point given in view coordinates.
///
/// The ruler is part of the content, so it scrolls out of view with the
/// lanes. Later regions in a lane are drawn on top and win overlaps.
pub fn hit_test(tracks: &[Track], viewport: &Viewport, view_x: f64, view_y: f64) -> Hit {
    let (x, y) = viewport.to_content(view_x, view_y);
    if y < RULER_HEIGHT {
        return Hit::Ruler;
    }
    let Some(index) = lane_at(y, tracks.len()) else {
        return Hit::Empty;
    };
    let track = &tracks[index];

    track
        .regions
        .iter()
        .rev()
        .find(|r| region_rect(index, r, viewport.zoom()).contains(x, y))
        .map(|r| Hit::Region {
            track_id: track.id,
            region_id: r.id.clone(),
        })
        .unwrap_or(Hit::Lane { track_id: track.id })
}
