//! Project-level values: the demo session, new-track rules and stats.

use serde::{Deserialize, Serialize};

use crate::model::region::Region;
use crate::model::track::{color_for_index, Track, TrackId, TrackType};

pub const DEFAULT_BPM: f64 = 120.0;
pub const MIN_BPM: f64 = 20.0;
pub const MAX_BPM: f64 = 300.0;

pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";

/// Regions seeded onto each demo track.
const DEMO_REGIONS_PER_TRACK: usize = 5;
const DEMO_REGION_SPACING: f64 = 8.0;
const DEMO_REGION_LENGTH: f64 = 6.0;

/// Read-only summary shown under the track list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub track_count: usize,
    pub duration: String,
    pub bpm: f64,
}

impl ProjectStats {
    pub fn from_tracks(tracks: &[Track], bpm: f64) -> Self {
        Self {
            track_count: tracks.len(),
            duration: format_duration(project_end(tracks)),
            bpm,
        }
    }
}

pub fn clamp_bpm(bpm: f64) -> f64 {
    if bpm.is_nan() {
        return DEFAULT_BPM;
    }
    bpm.clamp(MIN_BPM, MAX_BPM)
}

/// End of the furthest region across all tracks, in seconds.
pub fn project_end(tracks: &[Track]) -> f64 {
    tracks.iter().map(Track::end_time).fold(0.0, f64::max)
}

/// `m:ss` rendering used by the stats panel.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// The three-track session a fresh studio opens with.
pub fn demo_tracks() -> Vec<Track> {
    vec![
        demo_track(1, "Drums", TrackType::Drum, "#ff4466", 0.8),
        demo_track(2, "Bass", TrackType::Synth, "#00e7ff", 0.7),
        demo_track(3, "Vocals", TrackType::Vocal, "#b967ff", 0.9),
    ]
}

fn demo_track(id: u64, name: &str, track_type: TrackType, color: &str, volume: f32) -> Track {
    let offset = (id % 5) as f64;
    let regions = (0..DEMO_REGIONS_PER_TRACK)
        .map(|i| {
            Region::new(
                i as f64 * DEMO_REGION_SPACING + offset,
                DEMO_REGION_LENGTH,
                format!("{} {}", name, i + 1),
                (id as u32).wrapping_mul(1000).wrapping_add(i as u32),
            )
        })
        .collect();

    Track::new(TrackId(id), name, track_type, color)
        .with_volume(volume)
        .with_regions(regions)
}

/// Build the track the add-track dialog creates.
///
/// A blank name becomes "Track N" where N is one past the current count.
pub fn new_track(existing: &[Track], id: TrackId, name: Option<&str>, track_type: TrackType) -> Track {
    let name = match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => format!("Track {}", existing.len() + 1),
    };
    Track::new(id, name, track_type, color_for_index(existing.len()))
}

/// One past the largest id in use.
pub fn next_track_id(tracks: &[Track]) -> TrackId {
    TrackId(tracks.iter().map(|t| t.id.0).max().map_or(1, |max| max + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_session_shape() {
        let tracks = demo_tracks();
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].name, "Drums");
        assert_eq!(tracks[1].volume, 0.7);
        assert_eq!(tracks[2].track_type, TrackType::Vocal);
        assert!(tracks.iter().all(|t| t.regions.len() == 5));
        // Drums (id 1): first region starts one second in
        assert_eq!(tracks[0].regions[0].start, 1.0);
        assert_eq!(tracks[0].regions[4].start, 33.0);
    }

    #[test]
    fn test_new_track_defaults() {
        let existing = demo_tracks();
        let track = new_track(&existing, TrackId(9), Some("   "), TrackType::Sampler);
        assert_eq!(track.name, "Track 4");
        assert_eq!(track.color, "#ffaa00");
        assert_eq!(track.volume, 0.8);
        assert!(track.regions.is_empty());

        let named = new_track(&existing, TrackId(10), Some("Lead Guitar"), TrackType::Audio);
        assert_eq!(named.name, "Lead Guitar");
    }

    #[test]
    fn test_stats_duration() {
        let tracks = demo_tracks();
        let stats = ProjectStats::from_tracks(&tracks, 120.0);
        assert_eq!(stats.track_count, 3);
        // Vocals (id 3): last region 32 + 3 .. 41 s
        assert_eq!(stats.duration, "0:41");
        assert_eq!(ProjectStats::from_tracks(&[], 90.0).duration, "0:00");
        assert_eq!(format_duration(225.4), "3:45");
    }

    #[test]
    fn test_next_track_id() {
        assert_eq!(next_track_id(&[]), TrackId(1));
        assert_eq!(next_track_id(&demo_tracks()), TrackId(4));
    }

    #[test]
    fn test_clamp_bpm() {
        assert_eq!(clamp_bpm(5.0), MIN_BPM);
        assert_eq!(clamp_bpm(1000.0), MAX_BPM);
        assert_eq!(clamp_bpm(f64::NAN), DEFAULT_BPM);
    }
}
