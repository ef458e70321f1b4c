//! Pure reducers over the track list.
//!
//! `reduce` never mutates its input: it returns the next track list (or an
//! error when the action names something that does not exist). Whether the
//! result goes through history is decided by the store using
//! [`Action::is_structural`].

use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};
use crate::model::project::{new_track, next_track_id};
use crate::model::region::{self, Region, RegionId};
use crate::model::track::{clamp_pan, clamp_volume, Track, TrackId, TrackType};

/// Everything that can change the track list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    AddTrack {
        name: Option<String>,
        track_type: TrackType,
    },
    DeleteTrack {
        track_id: TrackId,
    },
    SetVolume {
        track_id: TrackId,
        volume: f32,
    },
    SetPan {
        track_id: TrackId,
        pan: f32,
    },
    ToggleMute {
        track_id: TrackId,
    },
    ToggleSolo {
        track_id: TrackId,
    },
    ToggleFx {
        track_id: TrackId,
    },
    /// Replace a track's whole region set.
    SetRegions {
        track_id: TrackId,
        regions: Vec<Region>,
    },
    /// Reposition one region; used continuously while dragging.
    MoveRegion {
        track_id: TrackId,
        region_id: RegionId,
        start: f64,
    },
    DeleteRegion {
        track_id: TrackId,
        region_id: RegionId,
    },
    DuplicateRegion {
        track_id: TrackId,
        region_id: RegionId,
    },
}

impl Action {
    /// Structural edits are recorded in history; continuous controls are not.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Action::AddTrack { .. }
                | Action::DeleteTrack { .. }
                | Action::SetRegions { .. }
                | Action::DeleteRegion { .. }
                | Action::DuplicateRegion { .. }
        )
    }

    /// Label shown in the history list.
    pub fn label(&self) -> &'static str {
        match self {
            Action::AddTrack { .. } => "Add track",
            Action::DeleteTrack { .. } => "Delete track",
            Action::SetVolume { .. } => "Volume",
            Action::SetPan { .. } => "Pan",
            Action::ToggleMute { .. } => "Mute",
            Action::ToggleSolo { .. } => "Solo",
            Action::ToggleFx { .. } => "FX",
            Action::SetRegions { .. } => "Edit regions",
            Action::MoveRegion { .. } => "Move region",
            Action::DeleteRegion { .. } => "Delete region",
            Action::DuplicateRegion { .. } => "Duplicate region",
        }
    }
}

/// What a reducer produced beyond the new track list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outcome {
    /// Track created by `AddTrack`.
    pub created_track: Option<TrackId>,
    /// Region created by `DuplicateRegion`.
    pub created_region: Option<RegionId>,
}

/// Apply `action` to `tracks`, returning the next list.
pub fn reduce(tracks: &[Track], action: &Action) -> Result<(Vec<Track>, Outcome)> {
    let mut outcome = Outcome::default();

    let next = match action {
        Action::AddTrack { name, track_type } => {
            let id = next_track_id(tracks);
            let track = new_track(tracks, id, name.as_deref(), *track_type);
            outcome.created_track = Some(id);
            let mut next = tracks.to_vec();
            next.push(track);
            next
        }
        Action::DeleteTrack { track_id } => {
            find(tracks, *track_id)?;
            tracks.iter().filter(|t| t.id != *track_id).cloned().collect()
        }
        Action::SetVolume { track_id, volume } => update(tracks, *track_id, |t| {
            t.volume = clamp_volume(*volume);
            Ok(())
        })?,
        Action::SetPan { track_id, pan } => update(tracks, *track_id, |t| {
            t.pan = clamp_pan(*pan);
            Ok(())
        })?,
        Action::ToggleMute { track_id } => update(tracks, *track_id, |t| {
            t.muted = !t.muted;
            Ok(())
        })?,
        Action::ToggleSolo { track_id } => update(tracks, *track_id, |t| {
            t.solo = !t.solo;
            Ok(())
        })?,
        Action::ToggleFx { track_id } => update(tracks, *track_id, |t| {
            t.fx_enabled = !t.fx_enabled;
            Ok(())
        })?,
        Action::SetRegions { track_id, regions } => update(tracks, *track_id, |t| {
            t.regions = regions
                .iter()
                .cloned()
                .map(|mut r| {
                    r.start = region::clamp_start(r.start);
                    r
                })
                .collect();
            Ok(())
        })?,
        Action::MoveRegion {
            track_id,
            region_id,
            start,
        } => update(tracks, *track_id, |t| {
            t.regions = region::moved_in(&t.regions, region_id, *start)
                .ok_or_else(|| region_not_found(region_id))?;
            Ok(())
        })?,
        Action::DeleteRegion {
            track_id,
            region_id,
        } => update(tracks, *track_id, |t| {
            t.regions = region::remove_from(&t.regions, region_id)
                .ok_or_else(|| region_not_found(region_id))?;
            Ok(())
        })?,
        Action::DuplicateRegion {
            track_id,
            region_id,
        } => update(tracks, *track_id, |t| {
            let (regions, copy_id) = region::duplicate_in(&t.regions, region_id)
                .ok_or_else(|| region_not_found(region_id))?;
            t.regions = regions;
            outcome.created_region = Some(copy_id);
            Ok(())
        })?,
    };

    Ok((next, outcome))
}

fn find(tracks: &[Track], track_id: TrackId) -> Result<usize> {
    tracks
        .iter()
        .position(|t| t.id == track_id)
        .ok_or(StudioError::TrackNotFound { id: track_id.0 })
}

fn update<F>(tracks: &[Track], track_id: TrackId, f: F) -> Result<Vec<Track>>
where
    F: FnOnce(&mut Track) -> Result<()>,
{
    let index = find(tracks, track_id)?;
    let mut next = tracks.to_vec();
    f(&mut next[index])?;
    Ok(next)
}

fn region_not_found(region_id: &str) -> StudioError {
    StudioError::RegionNotFound {
        id: region_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::demo_tracks;

    #[test]
    fn test_reduce_does_not_mutate_input() {
        let tracks = demo_tracks();
        let before = tracks.clone();
        let (next, _) = reduce(
            &tracks,
            &Action::SetVolume {
                track_id: TrackId(1),
                volume: 0.1,
            },
        )
        .unwrap();
        assert_eq!(tracks, before);
        assert_eq!(next[0].volume, 0.1);
    }

    #[test]
    fn test_add_track_reports_id() {
        let tracks = demo_tracks();
        let (next, outcome) = reduce(
            &tracks,
            &Action::AddTrack {
                name: None,
                track_type: TrackType::Midi,
            },
        )
        .unwrap();
        assert_eq!(next.len(), 4);
        assert_eq!(outcome.created_track, Some(TrackId(4)));
        assert_eq!(next[3].name, "Track 4");
    }

    #[test]
    fn test_unknown_track_is_an_error() {
        let err = reduce(
            &demo_tracks(),
            &Action::ToggleMute {
                track_id: TrackId(99),
            },
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "TRACK_NOT_FOUND");
    }

    #[test]
    fn test_unknown_region_is_an_error() {
        let err = reduce(
            &demo_tracks(),
            &Action::DeleteRegion {
                track_id: TrackId(1),
                region_id: "nope".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "REGION_NOT_FOUND");
    }

    #[test]
    fn test_set_regions_clamps_starts() {
        let regions = vec![Region {
            id: "r".to_string(),
            start: -4.0,
            duration: 1.0,
            name: "r".to_string(),
            waveform_seed: 0,
        }];
        let (next, _) = reduce(
            &demo_tracks(),
            &Action::SetRegions {
                track_id: TrackId(2),
                regions,
            },
        )
        .unwrap();
        assert_eq!(next[1].regions.len(), 1);
        assert_eq!(next[1].regions[0].start, 0.0);
    }

    #[test]
    fn test_structural_classification() {
        assert!(Action::DeleteTrack { track_id: TrackId(1) }.is_structural());
        assert!(!Action::SetPan {
            track_id: TrackId(1),
            pan: 0.5
        }
        .is_structural());
        assert!(!Action::MoveRegion {
            track_id: TrackId(1),
            region_id: "a".into(),
            start: 1.0
        }
        .is_structural());
    }
}
