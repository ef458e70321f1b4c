//! Regions and the pure operations the timeline performs on them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Region identifiers are opaque strings.
pub type RegionId = String;

/// Suffix appended to the name of a duplicated region.
pub const COPY_SUFFIX: &str = " (Copy)";

/// A time-bounded clip placed on a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: RegionId,
    /// Seconds from the start of the project, never negative.
    pub start: f64,
    /// Length in seconds.
    pub duration: f64,
    pub name: String,
    /// Drives the procedural waveform drawn inside the region.
    pub waveform_seed: u32,
}

impl Region {
    pub fn new(start: f64, duration: f64, name: impl Into<String>, waveform_seed: u32) -> Self {
        Self {
            id: new_region_id(),
            start: clamp_start(start),
            duration: duration.max(0.0),
            name: name.into(),
            waveform_seed,
        }
    }

    pub fn with_id(mut self, id: impl Into<RegionId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn contains_time(&self, time: f64) -> bool {
        time >= self.start && time < self.end()
    }
}

pub fn new_region_id() -> RegionId {
    Uuid::new_v4().to_string()
}

pub fn clamp_start(start: f64) -> f64 {
    if start.is_nan() {
        return 0.0;
    }
    start.max(0.0)
}

/// Start of a region being dragged `delta_px` pixels at `zoom` px/second.
pub fn dragged_start(original_start: f64, delta_px: f64, zoom: f64) -> f64 {
    if zoom <= 0.0 {
        return clamp_start(original_start);
    }
    clamp_start(original_start + delta_px / zoom)
}

/// Copy of `region` placed immediately after its own end.
pub fn duplicate_of(region: &Region) -> Region {
    Region {
        id: new_region_id(),
        start: region.end(),
        duration: region.duration,
        name: format!("{}{}", region.name, COPY_SUFFIX),
        waveform_seed: region.waveform_seed,
    }
}

/// Region list with the duplicate inserted right after the original.
///
/// Returns `None` when `region_id` is not in the list.
pub fn duplicate_in(regions: &[Region], region_id: &str) -> Option<(Vec<Region>, RegionId)> {
    let index = regions.iter().position(|r| r.id == region_id)?;
    let copy = duplicate_of(&regions[index]);
    let copy_id = copy.id.clone();

    let mut result = regions.to_vec();
    result.insert(index + 1, copy);
    Some((result, copy_id))
}

/// Region list without `region_id`, or `None` when it is absent.
pub fn remove_from(regions: &[Region], region_id: &str) -> Option<Vec<Region>> {
    let index = regions.iter().position(|r| r.id == region_id)?;
    let mut result = regions.to_vec();
    result.remove(index);
    Some(result)
}

/// Region list with `region_id` moved to `start` (clamped at zero).
pub fn moved_in(regions: &[Region], region_id: &str, start: f64) -> Option<Vec<Region>> {
    let index = regions.iter().position(|r| r.id == region_id)?;
    let mut result = regions.to_vec();
    result[index].start = clamp_start(start);
    Some(result)
}
